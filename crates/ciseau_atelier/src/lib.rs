//! # ciseau_atelier
//!
//! Atelier - The codemod workshop for Ciseau.
//!
//! ## Name Origin
//!
//! An **atelier** is the workshop where the carving happens. `ciseau_atelier`
//! holds the codemod contract, the built-in codemods and the runner that
//! parses a file, hands it to a codemod and splices the resulting edits back
//! into the source.
//!
//! ## Built-in codemods
//!
//! | Name | Rewrite |
//! |------|---------|
//! | `pure-to-composite` | `const X = (props) => <div/>` to `class X extends Component` |
//! | `function-to-arrow` | `function (a) { return a; }` to `(a) => a` |
//! | `props-to-destructuring` | `this.props.foo` to `foo` plus `const { foo } = this.props;` |
//! | `bind-expression` | `this.handle.bind(this)` to `::this.handle` |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ciseau_atelier::{run_codemod, CodemodRegistry, TransformOptions};
//! use oxc_span::SourceType;
//!
//! let registry = CodemodRegistry::builtin();
//! let codemod = registry.get("props-to-destructuring").unwrap();
//! let output = run_codemod(codemod, source, SourceType::jsx(), &TransformOptions::default())?;
//! if output.did_transform() {
//!     std::fs::write(path, &output.code)?;
//! }
//! ```

pub mod codemod;
pub mod codemods;
pub mod error;
pub mod registry;
pub mod runner;

pub use codemod::{Codemod, CodemodContext, CodemodMeta, SelfReference, TransformOptions};
pub use codemods::{
    BindExpression, FunctionToArrow, PropsToDestructuring, PureToComposite, SkipReason,
};
pub use error::CodemodError;
pub use registry::CodemodRegistry;
pub use runner::{
    path_matches, run_codemod, run_pipeline, source_type_for_path, PipelineOutput,
    TransformOutput,
};

// Re-export the pieces callers need to build options and inspect output
pub use ciseau_carton::{PrintOptions, Quote, TextEdit};
pub use oxc_span::SourceType;
