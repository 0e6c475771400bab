//! Built-in codemods.
//!
//! - [`PureToComposite`] - arrow function components become class components
//! - [`FunctionToArrow`] - `this`-free function expressions become arrows
//! - [`PropsToDestructuring`] - `this.props.x` reads become destructured locals
//! - [`BindExpression`] - `this.x.bind(this)` becomes `::this.x`

mod bind_expression;
mod context_scan;
mod function_to_arrow;
mod props_to_destructuring;
mod pure_to_composite;

use std::fmt;

use oxc_span::Span;

pub use bind_expression::BindExpression;
pub use function_to_arrow::FunctionToArrow;
pub use props_to_destructuring::PropsToDestructuring;
pub use pure_to_composite::PureToComposite;

/// Why a codemod left a site untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The name is a reserved word and cannot be bound
    ReservedWord,
    /// No block-bodied function shares the access's `this`
    NoEnclosingFunction,
    /// The access sits in its function's parameter list
    InParameters,
    /// The member is assigned to somewhere in the function
    WriteTarget,
    /// The member is a `delete` operand somewhere in the function
    DeleteOperand,
    /// The name is declared in the function by something other than a plain
    /// props destructuring
    ShadowedBinding,
    /// The visible binding does not come from a plain props destructuring
    UnsafeBinding,
    /// The visible binding is declared after the access
    DeclaredAfterUse,
    /// The visible binding reads `props` of a different `this`
    DifferentThis,
    /// The visible binding is declared inside a block, branch or loop
    ConditionalBinding,
    /// The visible binding is reassigned
    Reassigned,
    /// The function reads a free variable the injected binding would capture
    CapturesFreeReference,
    /// The existing props destructuring comes after the access
    MergeTargetAfterUse,
    /// The existing props destructuring binds the key under another name
    MergeTargetAliased,
    /// The only props destructuring ends in a rest element
    MergeTargetHasRest,
    /// `props` itself is reassigned in the function
    PropsReassigned,
    /// The access runs before the constructor's `super(...)` call
    BeforeSuperCall,
    /// `super(...)` is called somewhere other than a top-level statement
    ConditionalSuperCall,
    /// The self-reference identifier is declared or assigned in the function
    SelfReferenceShadowed,
    /// The name equals the self-reference identifier
    SelfReferenceCollision,
    /// The function body uses `this`
    UsesThis,
    /// The function body uses `arguments`, `super` or `new.target`
    UsesFunctionContext,
    /// The parameter list is not a single plain identifier
    UnsupportedParameters,
    /// The component parameter is redeclared in the body
    ParameterRedeclared,
    /// The component parameter is captured by a nested non-arrow function
    ParameterInNestedFunction,
    /// The component is named like its base class
    BaseClassCollision,
    /// The declaration binds more than one name
    SharedDeclaration,
    /// The component arrow is `async`
    AsyncComponent,
    /// The function is called with `new`
    Constructor,
}

impl SkipReason {
    /// Short machine-friendly label
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReservedWord => "reserved-word",
            Self::NoEnclosingFunction => "no-enclosing-function",
            Self::InParameters => "in-parameters",
            Self::WriteTarget => "write-target",
            Self::DeleteOperand => "delete-operand",
            Self::ShadowedBinding => "shadowed-binding",
            Self::UnsafeBinding => "unsafe-binding",
            Self::DeclaredAfterUse => "declared-after-use",
            Self::DifferentThis => "different-this",
            Self::ConditionalBinding => "conditional-binding",
            Self::Reassigned => "reassigned",
            Self::CapturesFreeReference => "captures-free-reference",
            Self::MergeTargetAfterUse => "merge-target-after-use",
            Self::MergeTargetAliased => "merge-target-aliased",
            Self::MergeTargetHasRest => "merge-target-has-rest",
            Self::PropsReassigned => "props-reassigned",
            Self::BeforeSuperCall => "before-super-call",
            Self::ConditionalSuperCall => "conditional-super-call",
            Self::SelfReferenceShadowed => "self-reference-shadowed",
            Self::SelfReferenceCollision => "self-reference-collision",
            Self::UsesThis => "uses-this",
            Self::UsesFunctionContext => "uses-function-context",
            Self::UnsupportedParameters => "unsupported-parameters",
            Self::ParameterRedeclared => "parameter-redeclared",
            Self::ParameterInNestedFunction => "parameter-in-nested-function",
            Self::BaseClassCollision => "base-class-collision",
            Self::SharedDeclaration => "shared-declaration",
            Self::AsyncComponent => "async-component",
            Self::Constructor => "constructor",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record a site a codemod refused to rewrite.
pub(crate) fn log_skip(codemod: &'static str, span: Span, reason: SkipReason) {
    tracing::debug!(
        codemod,
        start = span.start,
        end = span.end,
        reason = %reason,
        "unsafe rewrite skipped"
    );
}
