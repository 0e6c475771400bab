//! # ciseau_croquis
//!
//! Croquis - Scope analysis for Ciseau.
//!
//! ## Name Origin
//!
//! A **croquis** (/kʁɔ.ki/) is the quick sketch an artist makes before
//! committing to stone. `ciseau_croquis` sketches the lexical structure of a
//! JavaScript file (which scope declares which name, where each name is read
//! or written, which member chains hang off `this`) so codemods can decide
//! what is safe to carve.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ciseau_croquis::ScopeTable;
//!
//! let table = ScopeTable::build(&program);
//! if let Some(resolution) = table.resolve(scope, "foo") {
//!     for site in resolution.sites {
//!         println!("{:?} declared at {:?}", site.kind, site.span);
//!     }
//! }
//! ```
//!
//! The table is computed once per file and never mutated afterwards; every
//! query is a pure function over it.

pub mod scope;

pub use scope::{
    AccessFlags, BodyDestructure, ChainRoot, DeclarationKind, DeclarationSite, DeclaratorInfo,
    FunctionInfo, MemberAccess, MemberChain, PatternPosition, Reference, Resolution, Scope,
    ScopeId, ScopeKind, ScopeTable, SuperCall,
};
