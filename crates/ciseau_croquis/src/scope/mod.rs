//! Scope analysis for JavaScript modules.
//!
//! Builds, once per file, an immutable side-table describing every lexical
//! scope, the declaration sites of each name, identifier references and
//! simple member-access chains.
//!
//! ## Performance Notes
//!
//! - `CompactString` for identifier names (SSO for short strings)
//! - `SmallVec` for declaration sites and chain paths (almost always 1-2 entries)
//! - Bitflags for access kinds
//!
//! ## Module Structure
//!
//! - [`types`] - Type definitions (ScopeId, ScopeKind, DeclarationSite, MemberChain, etc.)
//! - [`table`] - `Scope` and `ScopeTable` with resolution queries
//! - `builder` - The AST visitor that fills the table

mod builder;
mod table;
mod types;

pub use table::{Resolution, Scope, ScopeTable};
pub use types::{
    AccessFlags, BodyDestructure, ChainRoot, DeclarationKind, DeclarationSite, DeclaratorInfo,
    FunctionInfo, MemberAccess, MemberChain, PatternPosition, Reference, ScopeId, ScopeKind, Span,
    SuperCall,
};
