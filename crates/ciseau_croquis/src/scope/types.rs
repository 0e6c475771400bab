//! Type definitions for scope analysis.
//!
//! - `ScopeId` / `ScopeKind` - identity and kind of a lexical scope
//! - `DeclarationSite` - one place that declares a name
//! - `MemberChain` - a static member path such as `this.props.foo`
//! - `Reference` / `MemberAccess` / `SuperCall` - uses recorded during the walk
//! - `FunctionInfo` - function-like nodes and the shape of their bodies

use ciseau_carton::{bitflags, CompactString, SmallVec};
use oxc_ast::ast::{Expression, StaticMemberExpression};
pub use oxc_span::Span;

/// Unique identifier for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The module (file) scope
    pub const ROOT: Self = Self(0);

    /// Create a new scope ID
    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScopeKind {
    /// File-level scope
    Module = 0,
    /// `function` declarations, expressions and methods
    Function = 1,
    /// Arrow functions (no own `this`)
    Arrow = 2,
    /// Blocks, loops, `switch`, `catch`
    Block = 3,
    /// `static { }` blocks inside classes
    StaticBlock = 4,
    /// Class bodies; field initializers see the instance as `this`
    Class = 5,
}

impl ScopeKind {
    /// Whether `var` declarations hoist to this scope
    #[inline]
    pub const fn is_var_target(self) -> bool {
        matches!(
            self,
            Self::Module | Self::Function | Self::Arrow | Self::StaticBlock
        )
    }

    /// Whether this scope introduces its own `this`
    #[inline]
    pub const fn binds_this(self) -> bool {
        matches!(
            self,
            Self::Module | Self::Function | Self::StaticBlock | Self::Class
        )
    }

    /// Whether this scope belongs to a function-like node
    #[inline]
    pub const fn is_function(self) -> bool {
        matches!(self, Self::Function | Self::Arrow)
    }

    /// Get the display name for this scope kind
    #[inline]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Module => "mod",
            Self::Function => "fn",
            Self::Arrow => "arrow",
            Self::Block => "block",
            Self::StaticBlock => "static",
            Self::Class => "class",
        }
    }
}

/// What kind of construct declared a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
    /// `using` / `await using`
    Using,
    Parameter,
    Function,
    Class,
    CatchParameter,
    Import,
    /// The name of a named function expression, bound inside the function
    FunctionName,
}

impl DeclarationKind {
    /// Declared by a variable declaration statement
    #[inline]
    pub const fn is_variable(self) -> bool {
        matches!(self, Self::Var | Self::Let | Self::Const | Self::Using)
    }
}

/// Where a binding identifier sits inside its declaring pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternPosition {
    /// The pattern is the identifier itself: `let x`, `function f(x)`
    Direct,
    /// A top-level property of an object pattern: `{ key: x }`, `{ x = 1 }`
    Property {
        /// Static source key; `None` for computed keys
        key: Option<CompactString>,
        has_default: bool,
    },
    /// The rest element of a top-level object pattern: `{ ...x }`
    Rest,
    /// Anything deeper: nested patterns, array elements
    Nested,
}

/// A variable declarator that declares a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaratorInfo {
    /// Span of the whole declarator (`{ a } = this.props`)
    pub span: Span,
    /// Initializer, when it is a simple member chain
    pub init: Option<MemberChain>,
}

/// One place that declares a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSite {
    /// Span of the binding identifier
    pub span: Span,
    pub kind: DeclarationKind,
    pub position: PatternPosition,
    /// Present for variable declarations only
    pub declarator: Option<DeclaratorInfo>,
}

impl DeclarationSite {
    /// Whether this site is `{ name } = <source>` with no alias, no default and
    /// no nesting, where `<source>` is exactly `source`.
    pub fn is_unaliased_property_of(&self, name: &str, source: &MemberChain) -> bool {
        if !self.kind.is_variable() {
            return false;
        }
        let PatternPosition::Property {
            key: Some(key),
            has_default: false,
        } = &self.position
        else {
            return false;
        };
        if key.as_str() != name {
            return false;
        }
        self.declarator
            .as_ref()
            .and_then(|declarator| declarator.init.as_ref())
            .is_some_and(|init| init == source)
    }

    /// End offset of the declarator, falling back to the identifier
    #[inline]
    pub fn declared_end(&self) -> u32 {
        self.declarator
            .as_ref()
            .map_or(self.span.end, |declarator| declarator.span.end)
    }
}

/// Root of a member chain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChainRoot {
    /// `this`
    This,
    /// A plain identifier such as `self`
    Identifier(CompactString),
}

/// A static, non-optional member path: `this.props.foo` is
/// `{ root: This, path: ["props", "foo"] }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberChain {
    pub root: ChainRoot,
    pub path: SmallVec<[CompactString; 2]>,
}

impl MemberChain {
    /// Create a chain from a root and a path
    pub fn new(root: ChainRoot, path: &[&str]) -> Self {
        Self {
            root,
            path: path.iter().map(|segment| CompactString::from(*segment)).collect(),
        }
    }

    /// Build a chain from an expression, if it is one.
    ///
    /// Parenthesized, computed and optional accesses are not chains.
    pub fn from_expression(expr: &Expression<'_>) -> Option<Self> {
        match expr {
            Expression::ThisExpression(_) => Some(Self {
                root: ChainRoot::This,
                path: SmallVec::new(),
            }),
            Expression::Identifier(id) => Some(Self {
                root: ChainRoot::Identifier(id.name.as_str().into()),
                path: SmallVec::new(),
            }),
            Expression::StaticMemberExpression(member) => Self::from_static_member(member),
            _ => None,
        }
    }

    /// Build a chain from a static member expression
    pub fn from_static_member(member: &StaticMemberExpression<'_>) -> Option<Self> {
        if member.optional {
            return None;
        }
        let mut chain = Self::from_expression(&member.object)?;
        chain.path.push(member.property.name.as_str().into());
        Some(chain)
    }

    /// Whether the chain is `root` followed by exactly `path`
    pub fn matches(&self, root: &ChainRoot, path: &[&str]) -> bool {
        &self.root == root
            && self.path.len() == path.len()
            && self
                .path
                .iter()
                .zip(path)
                .all(|(segment, expected)| segment.as_str() == *expected)
    }
}

impl std::fmt::Display for MemberChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            ChainRoot::This => f.write_str("this")?,
            ChainRoot::Identifier(name) => f.write_str(name)?,
        }
        for segment in &self.path {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

bitflags! {
    /// How an identifier or member chain is used at a site
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AccessFlags: u8 {
        /// Assignment, update or destructuring-assignment target
        const WRITE = 1 << 0;
        /// Operand of `delete`
        const DELETE = 1 << 1;
    }
}

/// An identifier reference
#[derive(Debug, Clone)]
pub struct Reference {
    pub name: CompactString,
    pub span: Span,
    /// Innermost scope enclosing the reference
    pub scope: ScopeId,
    pub flags: AccessFlags,
}

/// A static member chain occurrence
#[derive(Debug, Clone)]
pub struct MemberAccess {
    pub span: Span,
    pub chain: MemberChain,
    /// Innermost scope enclosing the access
    pub scope: ScopeId,
    pub flags: AccessFlags,
}

/// A `super(...)` call
#[derive(Debug, Clone)]
pub struct SuperCall {
    pub span: Span,
    /// Innermost scope enclosing the call
    pub scope: ScopeId,
}

/// A top-level destructuring declaration in a function body
#[derive(Debug, Clone)]
pub struct BodyDestructure {
    /// The whole declaration statement
    pub statement_span: Span,
    /// The object pattern
    pub pattern_span: Span,
    pub init: Option<MemberChain>,
    /// Source keys in pattern order; `None` for computed keys
    pub keys: Vec<Option<CompactString>>,
    /// End of the last property (before any trailing comma)
    pub last_property_end: Option<u32>,
    pub has_rest: bool,
}

impl BodyDestructure {
    /// Whether the pattern already has a property with this source key
    pub fn has_key(&self, key: &str) -> bool {
        self.keys
            .iter()
            .any(|existing| existing.as_deref() == Some(key))
    }
}

/// A function-like node
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    /// Span of the whole function
    pub span: Span,
    /// The scope the function introduces
    pub scope: ScopeId,
    /// Span of the body (including braces for block bodies)
    pub body_span: Span,
    pub is_arrow: bool,
    /// `() => expr`
    pub expression_body: bool,
    /// Start of the first statement after any directives
    pub first_statement: Option<u32>,
    /// The first top-level `super(...);` statement of the body
    pub super_statement: Option<Span>,
    /// Top-level destructuring declarations of the body, in source order
    pub destructures: Vec<BodyDestructure>,
}

impl FunctionInfo {
    /// Whether `span` lies within the body (not the parameter list)
    #[inline]
    pub fn body_contains(&self, span: Span) -> bool {
        self.body_span.start <= span.start && span.end <= self.body_span.end
    }

    /// Whether the function has a block body that can hold declarations
    #[inline]
    pub fn has_block_body(&self) -> bool {
        !self.expression_body
    }

    /// Whether `span` lies within the body's top-level `super(...);`
    #[inline]
    pub fn in_super_statement(&self, span: Span) -> bool {
        self.super_statement
            .is_some_and(|statement| statement.start <= span.start && span.end <= statement.end)
    }
}
