//! Carton - The toolbox for Ciseau.
//!
//! A carton is the case a sculptor carries to the workshop: chisels, rasps and
//! the measuring string. This crate holds the small pieces every other Ciseau
//! crate reaches for.
//!
//! # Modules
//!
//! - **edit**: span-addressed text edits and their single-pass application
//! - **keywords**: reserved words that may never become a bare binding
//! - **options**: print options shared by every codemod
//! - **text**: line and indentation helpers over raw source text
//!
//! # Example
//!
//! ```
//! use ciseau_carton::{apply_edits, TextEdit};
//!
//! let source = "this.props.foo";
//! let out = apply_edits(source, &[TextEdit::replace(0, 14, "foo")]);
//! assert_eq!(out, "foo");
//! ```

pub mod edit;
pub mod keywords;
pub mod options;
pub mod text;

pub use edit::{apply_edits, TextEdit};
pub use keywords::is_reserved_word;
pub use options::{PrintOptions, Quote};

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_set, Set as PhfSet};
