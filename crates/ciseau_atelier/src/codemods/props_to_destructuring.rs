//! Props destructuring.
//!
//! Rewrites `this.props.foo` reads into a bare `foo` and makes sure `foo` is
//! bound by a single `const { foo } = this.props;` at the top of the owning
//! function.
//!
//! Before:
//! ```js
//! function render() {
//!     return <Item name={this.props.name} onClick={this.props.onClick} />;
//! }
//! ```
//!
//! After:
//! ```js
//! function render() {
//!     const { name, onClick } = this.props;
//!     return <Item name={name} onClick={onClick} />;
//! }
//! ```
//!
//! The owner of an access is the nearest function with a block body.
//! Expression-bodied arrows have nowhere to put a declaration, so their
//! accesses belong to the function around them. Every decision is made from
//! the [`ScopeTable`]; anything it cannot prove safe is left as written.

use std::collections::{BTreeMap, BTreeSet};

use ciseau_carton::text::{is_multiline, line_indent, starts_line};
use ciseau_carton::{is_reserved_word, TextEdit};
use ciseau_croquis::{
    AccessFlags, BodyDestructure, ChainRoot, FunctionInfo, MemberAccess, MemberChain,
    Resolution, ScopeId, ScopeTable,
};

use super::{log_skip, SkipReason};
use crate::codemod::{Codemod, CodemodContext, CodemodMeta, TransformOptions};

/// Replace `this.props.<name>` reads with destructured locals
pub struct PropsToDestructuring;

static META: CodemodMeta = CodemodMeta {
    name: "props-to-destructuring",
    description: "Replace `this.props.<name>` reads with a destructured local binding",
    paths: &[],
    module_api_change: true,
};

impl Codemod for PropsToDestructuring {
    fn meta(&self) -> &'static CodemodMeta {
        &META
    }

    fn transform(&self, ctx: &CodemodContext<'_, '_>) -> Vec<TextEdit> {
        let table = ScopeTable::build(ctx.program);
        Planner::new(ctx.source, ctx.options, &table).plan()
    }
}

/// Candidates of one function, grouped by property name
type Candidates<'t> = BTreeMap<&'t str, Vec<&'t MemberAccess>>;

struct Planner<'t, 'ctx> {
    source: &'ctx str,
    options: &'ctx TransformOptions,
    table: &'t ScopeTable,
    /// `this` or the configured self identifier
    root: ChainRoot,
    /// `<self>.props`
    props: MemberChain,
}

impl<'t, 'ctx> Planner<'t, 'ctx> {
    fn new(source: &'ctx str, options: &'ctx TransformOptions, table: &'t ScopeTable) -> Self {
        Self {
            source,
            options,
            table,
            root: options.self_reference.chain_root(),
            props: options.self_reference.props_chain(),
        }
    }

    fn plan(&self) -> Vec<TextEdit> {
        // Keyed by the owner's scope so functions are planned in source order
        let mut owners: BTreeMap<ScopeId, Candidates<'t>> = BTreeMap::new();

        for access in self.table.member_accesses() {
            let Some(name) = self.candidate_name(access) else {
                continue;
            };
            if is_reserved_word(name) {
                log_skip(META.name, access.span, SkipReason::ReservedWord);
                continue;
            }
            match self.owner_of(access) {
                Ok(owner) => owners
                    .entry(owner.scope)
                    .or_default()
                    .entry(name)
                    .or_default()
                    .push(access),
                Err(reason) => log_skip(META.name, access.span, reason),
            }
        }

        let mut edits = Vec::new();
        for (scope, candidates) in owners {
            if let Some(function) = self.table.function(scope) {
                self.plan_function(function, candidates, &mut edits);
            }
        }
        edits
    }

    /// `<name>` when `access` is exactly `<self>.props.<name>`
    fn candidate_name(&self, access: &'t MemberAccess) -> Option<&'t str> {
        let chain = &access.chain;
        if chain.root != self.root || chain.path.len() != 2 || chain.path[0].as_str() != "props" {
            return None;
        }
        Some(chain.path[1].as_str())
    }

    /// The block-bodied function that would hold the declaration for `access`
    fn owner_of(&self, access: &MemberAccess) -> Result<&'t FunctionInfo, SkipReason> {
        for id in self.table.ancestors(access.scope) {
            if let Some(function) = self.table.function(id) {
                if !function.has_block_body() {
                    continue;
                }
                if !function.body_contains(access.span) {
                    return Err(SkipReason::InParameters);
                }
                return Ok(function);
            }
            // Class bodies and static blocks rebind `this` without a body to
            // declare in.
            if self
                .table
                .get(id)
                .is_some_and(|scope| scope.kind.binds_this())
            {
                break;
            }
        }
        Err(SkipReason::NoEnclosingFunction)
    }

    fn plan_function(
        &self,
        function: &'t FunctionInfo,
        candidates: Candidates<'t>,
        edits: &mut Vec<TextEdit>,
    ) {
        if let Some(reason) = self.function_blocker(function) {
            for access in candidates.values().flatten() {
                log_skip(META.name, access.span, reason);
            }
            return;
        }

        let props_destructures: Vec<&BodyDestructure> = function
            .destructures
            .iter()
            .filter(|destructure| destructure.init.as_ref() == Some(&self.props))
            .collect();
        let merge_target = props_destructures
            .iter()
            .copied()
            .find(|destructure| !destructure.has_rest);
        let rest_only = merge_target.is_none() && !props_destructures.is_empty();

        let mut pending: BTreeSet<&'t str> = BTreeSet::new();
        let mut rewritten = 0usize;

        for (name, accesses) in candidates {
            if let Some(reason) = self.name_blocker(function, name) {
                for access in accesses {
                    log_skip(META.name, access.span, reason);
                }
                continue;
            }

            let captures_free = self.reads_free_variable(function, name);
            for access in accesses {
                let verdict = if before_super(function, access) {
                    Err(SkipReason::BeforeSuperCall)
                } else {
                    match self.table.resolve(access.scope, name) {
                        Some(resolution) => {
                            self.check_bound(access, name, resolution).map(|()| false)
                        }
                        None => self
                            .check_injection(
                                function,
                                access,
                                name,
                                merge_target,
                                rest_only,
                                captures_free,
                            )
                            .map(|()| true),
                    }
                };
                match verdict {
                    Ok(needs_binding) => {
                        edits.push(TextEdit::replace(access.span.start, access.span.end, name));
                        rewritten += 1;
                        if needs_binding {
                            pending.insert(name);
                        }
                    }
                    Err(reason) => log_skip(META.name, access.span, reason),
                }
            }
        }

        if !pending.is_empty() {
            let edit = match merge_target {
                Some(target) => Some(self.merge_edit(target, &pending)),
                None => self.declaration_edit(function, &pending),
            };
            edits.extend(edit);
        }

        if rewritten > 0 {
            tracing::debug!(
                function_start = function.span.start,
                rewritten,
                injected = ?pending,
                merged = merge_target.is_some(),
                "planned props destructuring"
            );
        }
    }

    /// Conditions that rule out every candidate in `function`
    fn function_blocker(&self, function: &FunctionInfo) -> Option<SkipReason> {
        let owner = function.scope;
        let props_written = self.table.member_accesses().iter().any(|access| {
            access.chain == self.props
                && !access.flags.is_empty()
                && self.table.is_within(access.scope, owner)
        });
        if props_written {
            return Some(SkipReason::PropsReassigned);
        }

        // Only a top-level `super(...)` gives a fixed point after which `this`
        // is usable.
        let owner_this = self.table.this_scope(owner);
        let stray_super = self.table.super_calls().iter().any(|call| {
            self.table.is_within(call.scope, owner)
                && self.table.this_scope(call.scope) == owner_this
                && !function.in_super_statement(call.span)
        });
        if stray_super {
            return Some(SkipReason::ConditionalSuperCall);
        }

        if let ChainRoot::Identifier(self_name) = &self.root {
            let declared = self
                .table
                .declarations_within(owner, self_name)
                .next()
                .is_some();
            let assigned = self.table.references().iter().any(|reference| {
                reference.name == *self_name
                    && reference.flags.contains(AccessFlags::WRITE)
                    && self.table.is_within(reference.scope, owner)
            });
            if declared || assigned {
                return Some(SkipReason::SelfReferenceShadowed);
            }
        }
        None
    }

    /// Conditions that rule out every candidate of `name` in `function`
    fn name_blocker(&self, function: &FunctionInfo, name: &str) -> Option<SkipReason> {
        let owner = function.scope;

        if let ChainRoot::Identifier(self_name) = &self.root {
            if self_name.as_str() == name {
                return Some(SkipReason::SelfReferenceCollision);
            }
        }

        // A write anywhere would make the snapshot taken by the declaration stale
        for access in self.table.member_accesses() {
            if self.candidate_name(access) != Some(name)
                || !self.table.is_within(access.scope, owner)
            {
                continue;
            }
            if access.flags.contains(AccessFlags::WRITE) {
                return Some(SkipReason::WriteTarget);
            }
            if access.flags.contains(AccessFlags::DELETE) {
                return Some(SkipReason::DeleteOperand);
            }
        }

        let shadowed = self
            .table
            .declarations_within(owner, name)
            .any(|(_, site)| !site.is_unaliased_property_of(name, &self.props));
        shadowed.then_some(SkipReason::ShadowedBinding)
    }

    /// Whether `function` reads a global `name` that a new binding would capture
    fn reads_free_variable(&self, function: &FunctionInfo, name: &str) -> bool {
        self.table.unresolved_references().any(|reference| {
            reference.name.as_str() == name && self.table.is_within(reference.scope, function.scope)
        })
    }

    /// An access whose name is already bound may reuse that binding only when
    /// the binding is an earlier, untouched `{ name } = <self>.props` over the
    /// same `<self>`, declared by a top-level statement of a function body.
    fn check_bound(
        &self,
        access: &MemberAccess,
        name: &str,
        resolution: Resolution<'_>,
    ) -> Result<(), SkipReason> {
        if !resolution
            .sites
            .iter()
            .all(|site| site.is_unaliased_property_of(name, &self.props))
        {
            return Err(SkipReason::UnsafeBinding);
        }
        if resolution
            .sites
            .iter()
            .any(|site| site.declared_end() > access.span.start)
        {
            return Err(SkipReason::DeclaredAfterUse);
        }

        let same_self = match &self.root {
            ChainRoot::This => {
                self.table.this_scope(resolution.scope) == self.table.this_scope(access.scope)
            }
            ChainRoot::Identifier(self_name) => {
                let at_binding = self.table.resolve(resolution.scope, self_name);
                let at_access = self.table.resolve(access.scope, self_name);
                at_binding.map(|r| r.scope) == at_access.map(|r| r.scope)
            }
        };
        if !same_self {
            return Err(SkipReason::DifferentThis);
        }

        // Anything nested in a block, branch or loop may not have run yet
        let unconditional = self
            .table
            .enclosing_function(resolution.scope)
            .is_some_and(|function| {
                resolution.sites.iter().all(|site| {
                    function.destructures.iter().any(|destructure| {
                        destructure.statement_span.start <= site.span.start
                            && site.declared_end() <= destructure.statement_span.end
                    })
                })
            });
        if !unconditional {
            return Err(SkipReason::ConditionalBinding);
        }

        if self.table.is_mutated(resolution.scope, name) {
            return Err(SkipReason::Reassigned);
        }
        Ok(())
    }

    fn check_injection(
        &self,
        function: &FunctionInfo,
        access: &MemberAccess,
        name: &str,
        merge_target: Option<&BodyDestructure>,
        rest_only: bool,
        captures_free: bool,
    ) -> Result<(), SkipReason> {
        if captures_free {
            return Err(SkipReason::CapturesFreeReference);
        }
        match merge_target {
            Some(target) if target.has_key(name) => Err(SkipReason::MergeTargetAliased),
            Some(target) if target.statement_span.end > access.span.start => {
                Err(SkipReason::MergeTargetAfterUse)
            }
            Some(_) => Ok(()),
            None if rest_only => Err(SkipReason::MergeTargetHasRest),
            None if function.first_statement.is_none() => Err(SkipReason::NoEnclosingFunction),
            None => Ok(()),
        }
    }

    /// Append `names` to an existing destructuring pattern.
    fn merge_edit(&self, target: &BodyDestructure, names: &BTreeSet<&str>) -> TextEdit {
        let names: Vec<&str> = names.iter().copied().collect();
        let pattern = target.pattern_span;

        let Some(end) = target.last_property_end else {
            let braced = self.options.print_options.braced(&names);
            return TextEdit::replace(pattern.start, pattern.end, braced);
        };

        let multiline = is_multiline(self.source, pattern.start as usize, pattern.end as usize);
        let separator = if multiline {
            format!(",\n{}", line_indent(self.source, end as usize))
        } else {
            ", ".to_string()
        };
        let mut text: String = names
            .iter()
            .map(|name| format!("{separator}{name}"))
            .collect();

        // An existing trailing comma stays after the inserted names
        let has_trailing_comma = self
            .source
            .get(end as usize..pattern.end as usize)
            .is_some_and(|rest| rest.contains(','));
        if multiline && self.options.print_options.trailing_comma && !has_trailing_comma {
            text.push(',');
        }
        TextEdit::insert(end, text)
    }

    /// Prepend `const { names } = <self>.props;` to the function body, or
    /// place it right after the body's `super(...);`.
    fn declaration_edit(&self, function: &FunctionInfo, names: &BTreeSet<&str>) -> Option<TextEdit> {
        let names: Vec<&str> = names.iter().copied().collect();
        let declaration = format!(
            "const {} = {};",
            self.options.print_options.braced(&names),
            self.props
        );

        if let Some(call) = function.super_statement {
            let separator = if starts_line(self.source, call.start as usize) {
                format!("\n{}", line_indent(self.source, call.start as usize))
            } else {
                " ".to_string()
            };
            return Some(TextEdit::insert(call.end, format!("{separator}{declaration}")));
        }

        let at = function.first_statement?;
        let separator = if starts_line(self.source, at as usize) {
            format!("\n{}", line_indent(self.source, at as usize))
        } else {
            " ".to_string()
        };
        Some(TextEdit::insert(at, format!("{declaration}{separator}")))
    }
}

/// `this` is unusable until the body's `super(...);` has returned
fn before_super(function: &FunctionInfo, access: &MemberAccess) -> bool {
    function
        .super_statement
        .is_some_and(|call| access.span.start < call.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemod::SelfReference;
    use crate::runner::run_codemod;
    use oxc_span::SourceType;

    fn run(source: &str) -> String {
        run_with(source, &TransformOptions::default())
    }

    fn run_with(source: &str, options: &TransformOptions) -> String {
        run_codemod(&PropsToDestructuring, source, SourceType::jsx(), options)
            .unwrap()
            .code
    }

    fn self_options() -> TransformOptions {
        TransformOptions {
            self_reference: SelfReference::Identifier("self".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_inject_sorted() {
        assert_eq!(
            run("function f(){ return this.props.y + this.props.x; }"),
            "function f(){ const { x, y } = this.props; return y + x; }"
        );
    }

    #[test]
    fn test_self_reference() {
        assert_eq!(
            run_with(
                "function f(){ return self.props.x + self.props.y; }",
                &self_options()
            ),
            "function f(){ const { x, y } = self.props; return x + y; }"
        );
        // `this.props` is not a candidate when `self` is configured
        let source = "function f(){ return this.props.x; }";
        assert_eq!(run_with(source, &self_options()), source);
    }

    #[test]
    fn test_existing_binding_reused() {
        assert_eq!(
            run("function f(){ const { x } = this.props; return this.props.x; }"),
            "function f(){ const { x } = this.props; return x; }"
        );
    }

    #[test]
    fn test_expression_arrow_is_transparent() {
        assert_eq!(
            run("function f(){ return items.map((i) => i + this.props.offset); }"),
            "function f(){ const { offset } = this.props; return items.map((i) => i + offset); }"
        );
    }

    #[test]
    fn test_class_field_untouched() {
        let source = "class A { handler = this.props.onClick; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_parameter_default_untouched() {
        let source = "function f(a = this.props.a){ return a; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_write_blocks_every_read() {
        let source = "function f(){ this.props.x = 1; return this.props.x; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_free_variable_capture() {
        let source = "function f(){ return this.props.x + x; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_self_identifier_declared_inside() {
        let source = "function f(){ const self = this; return self.props.x; }";
        assert_eq!(run_with(source, &self_options()), source);
    }

    #[test]
    fn test_declaration_follows_super_call() {
        assert_eq!(
            run("class A extends B { constructor(p){ super(p); this.state = { v: this.props.v }; } }"),
            "class A extends B { constructor(p){ super(p); const { v } = this.props; this.state = { v: v }; } }"
        );
    }

    #[test]
    fn test_access_before_super_untouched() {
        assert_eq!(
            run("class A extends B { constructor(){ super(this.props.x); this.y = this.props.y; } }"),
            "class A extends B { constructor(){ super(this.props.x); const { y } = this.props; this.y = y; } }"
        );
    }

    #[test]
    fn test_conditional_super_blocks_function() {
        let source =
            "class A extends B { constructor(c){ if (c) { super(1); } else { super(2); } this.x = this.props.x; } }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_super_in_nested_class_does_not_block() {
        assert_eq!(
            run("function f(){ class C extends D { constructor(){ if (a) super(); } } return this.props.x; }"),
            "function f(){ const { x } = this.props; class C extends D { constructor(){ if (a) super(); } } return x; }"
        );
    }

    #[test]
    fn test_binding_in_branch_not_reused() {
        let source = "function f(c){ if (c) { var { x } = this.props; } return this.props.x; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_binding_in_switch_case_not_reused() {
        let source =
            "function f(k){ switch (k) { case 1: const { x } = this.props; break; case 2: return this.props.x; } }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_outer_function_binding_reused_from_arrow() {
        assert_eq!(
            run("function f(){ const { x } = this.props; return () => { return this.props.x; }; }"),
            "function f(){ const { x } = this.props; return () => { return x; }; }"
        );
    }

    #[test]
    fn test_merge_target_aliasing_key() {
        let source = "function f(){ const { b: c } = this.props; return c + this.props.b; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_merge_target_with_rest() {
        let source = "function f(){ const { ...rest } = this.props; return rest.a + this.props.x; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_merge_target_after_use() {
        let source = "function f(){ const y = this.props.x; const { a } = this.props; return a + y; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_merge_into_empty_pattern() {
        assert_eq!(
            run("function f(){ const {} = this.props; return this.props.x; }"),
            "function f(){ const { x } = this.props; return x; }"
        );
    }

    #[test]
    fn test_binding_declared_after_use() {
        let source = "function f(){ const y = this.props.x; const { x } = this.props; return x + y; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_binding_of_different_this() {
        let source =
            "function f(){ const { x } = this.props; function g(){ return this.props.x; } return g; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_reassigned_binding() {
        let source = "function f(){ let { x } = this.props; x = 2; return this.props.x; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_delete_blocks_every_read() {
        let source = "function f(){ delete this.props.x; return this.props.x; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_props_reassigned() {
        let source = "function f(){ this.props = {}; return this.props.x; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_nested_pattern_shadows() {
        let source = "function f(){ const { a: { x } } = this.props; return x + this.props.x; }";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_multiline_merge_without_trailing_comma_option() {
        let options = TransformOptions {
            print_options: ciseau_carton::PrintOptions {
                trailing_comma: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let source = "function f() {\n    const {\n        a\n    } = this.props;\n    return a + this.props.b;\n}\n";
        assert_eq!(
            run_with(source, &options),
            "function f() {\n    const {\n        a,\n        b\n    } = this.props;\n    return a + b;\n}\n"
        );
    }
}
