//! Function expressions to arrow functions.
//!
//! Before:
//! ```js
//! var add = function (a, b) {
//!     return a + b;
//! };
//! ```
//!
//! After:
//! ```js
//! var add = (a, b) => a + b;
//! ```
//!
//! A function expression qualifies when it is anonymous, not a generator,
//! not an object method or accessor, not called with `new`, and never
//! mentions `this`, `super`, `arguments` or `new.target`. A body holding a
//! single `return` and no comments collapses to an expression body.

use ciseau_carton::{FxHashSet, PrintOptions, TextEdit};
use oxc_ast::ast::{
    ArrayExpression, ArrowFunctionExpression, AssignmentExpression, AssignmentPattern,
    BindingPatternKind, CallExpression, ConditionalExpression, Expression, Function,
    JSXExpressionContainer, NewExpression, ObjectProperty, ParenthesizedExpression,
    PropertyDefinition, PropertyKind, ReturnStatement, SequenceExpression, Statement,
    TemplateLiteral, VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::{GetSpan, Span};
use oxc_syntax::scope::ScopeFlags;

use super::context_scan::ContextScan;
use super::{log_skip, SkipReason};
use crate::codemod::{Codemod, CodemodContext, CodemodMeta};

/// Convert `this`-free function expressions into arrow functions
pub struct FunctionToArrow;

static META: CodemodMeta = CodemodMeta {
    name: "function-to-arrow",
    description: "Convert function expressions that do not depend on `this` into arrow functions",
    paths: &[],
    module_api_change: true,
};

impl Codemod for FunctionToArrow {
    fn meta(&self) -> &'static CodemodMeta {
        &META
    }

    fn transform(&self, ctx: &CodemodContext<'_, '_>) -> Vec<TextEdit> {
        let mut planner = Planner {
            source: ctx.source,
            print: ctx.print_options(),
            comments: ctx.program.comments.iter().map(|comment| comment.span).collect(),
            bare_slots: FxHashSet::default(),
            constructed: FxHashSet::default(),
            edits: Vec::new(),
        };
        planner.visit_program(ctx.program);
        planner.edits
    }
}

struct Planner<'c> {
    source: &'c str,
    print: &'c PrintOptions,
    comments: Vec<Span>,
    /// Expression positions where a bare arrow parses like the function did
    bare_slots: FxHashSet<Span>,
    /// Function expressions used as a `new` callee
    constructed: FxHashSet<Span>,
    edits: Vec<TextEdit>,
}

impl Planner<'_> {
    #[inline]
    fn bare(&mut self, span: Span) {
        self.bare_slots.insert(span);
    }

    fn consider(&mut self, func: &Function<'_>) {
        if func.id.is_some() || func.generator || func.this_param.is_some() {
            return;
        }
        let Some(body) = &func.body else {
            return;
        };
        if self.constructed.contains(&func.span) {
            log_skip(META.name, func.span, SkipReason::Constructor);
            return;
        }

        let mut scan = ContextScan::default();
        scan.visit_function(func, ScopeFlags::Function);
        if scan.this_anywhere {
            log_skip(META.name, func.span, SkipReason::UsesThis);
            return;
        }
        if scan.context_anywhere {
            log_skip(META.name, func.span, SkipReason::UsesFunctionContext);
            return;
        }

        let params = &func.params;
        let head_end = func
            .type_parameters
            .as_ref()
            .map_or(params.span.start, |type_parameters| type_parameters.span.start);
        let params_end = func
            .return_type
            .as_ref()
            .map_or(params.span.end, |return_type| return_type.span.end);

        if !self.bare_slots.contains(&func.span) {
            self.edits.push(TextEdit::insert(func.span.start, "("));
        }
        let head = if func.r#async { "async " } else { "" };
        self.edits.push(TextEdit::replace(func.span.start, head_end, head));
        if let Some(name) = self.unparenthesized_parameter(func) {
            self.edits
                .push(TextEdit::replace(params.span.start, params.span.end, name));
        }
        self.edits
            .push(TextEdit::replace(params_end, body.span.start, " => "));

        if let Some(argument) = self.compact_body(func) {
            let span = argument.span();
            let text = self
                .source
                .get(span.start as usize..span.end as usize)
                .unwrap_or_default();
            let wrap =
                matches!(argument, Expression::SequenceExpression(_)) || text.starts_with('{');
            let (open, close) = if wrap { ("(", ")") } else { ("", "") };
            self.edits
                .push(TextEdit::replace(body.span.start, span.start, open));
            self.edits
                .push(TextEdit::replace(span.end, body.span.end, close));
        }

        if !self.bare_slots.contains(&func.span) {
            self.edits.push(TextEdit::insert(func.span.end, ")"));
        }
    }

    /// The sole parameter's name when it may drop its parentheses
    fn unparenthesized_parameter<'f>(&self, func: &'f Function<'_>) -> Option<&'f str> {
        if self.print.arrow_parens_always
            || func.type_parameters.is_some()
            || func.return_type.is_some()
            || func.params.rest.is_some()
        {
            return None;
        }
        let [param] = &func.params.items[..] else {
            return None;
        };
        if param.pattern.type_annotation.is_some() || param.pattern.optional {
            return None;
        }
        match &param.pattern.kind {
            BindingPatternKind::BindingIdentifier(id) => Some(id.name.as_str()),
            _ => None,
        }
    }

    /// The returned expression of a body that is exactly `return <expr>;`
    fn compact_body<'f, 'a>(&self, func: &'f Function<'a>) -> Option<&'f Expression<'a>> {
        let body = func.body.as_ref()?;
        if !body.directives.is_empty() {
            return None;
        }
        let [Statement::ReturnStatement(ret)] = &body.statements[..] else {
            return None;
        };
        let has_comment = self
            .comments
            .iter()
            .any(|comment| body.span.start < comment.start && comment.end <= body.span.end);
        if has_comment {
            return None;
        }
        ret.argument.as_ref()
    }
}

impl<'a> Visit<'a> for Planner<'_> {
    fn visit_expression(&mut self, it: &Expression<'a>) {
        if let Expression::FunctionExpression(func) = it {
            self.consider(func);
        }
        walk::walk_expression(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.method || it.kind != PropertyKind::Init {
            self.visit_property_key(&it.key);
            match &it.value {
                Expression::FunctionExpression(func) => {
                    self.visit_function(func, ScopeFlags::Function);
                }
                value => self.visit_expression(value),
            }
            return;
        }
        self.bare(it.value.span());
        walk::walk_object_property(self, it);
    }

    fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
        if let Some(init) = &it.init {
            self.bare(init.span());
        }
        walk::walk_variable_declarator(self, it);
    }

    fn visit_assignment_expression(&mut self, it: &AssignmentExpression<'a>) {
        self.bare(it.right.span());
        walk::walk_assignment_expression(self, it);
    }

    fn visit_assignment_pattern(&mut self, it: &AssignmentPattern<'a>) {
        self.bare(it.right.span());
        walk::walk_assignment_pattern(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        for argument in &it.arguments {
            self.bare(argument.span());
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_new_expression(&mut self, it: &NewExpression<'a>) {
        if let Expression::FunctionExpression(func) = it.callee.without_parentheses() {
            self.constructed.insert(func.span);
        }
        for argument in &it.arguments {
            self.bare(argument.span());
        }
        walk::walk_new_expression(self, it);
    }

    fn visit_array_expression(&mut self, it: &ArrayExpression<'a>) {
        for element in &it.elements {
            self.bare(element.span());
        }
        walk::walk_array_expression(self, it);
    }

    fn visit_return_statement(&mut self, it: &ReturnStatement<'a>) {
        if let Some(argument) = &it.argument {
            self.bare(argument.span());
        }
        walk::walk_return_statement(self, it);
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        if let Some(expression) = it.get_expression() {
            self.bare(expression.span());
        }
        walk::walk_arrow_function_expression(self, it);
    }

    fn visit_parenthesized_expression(&mut self, it: &ParenthesizedExpression<'a>) {
        self.bare(it.expression.span());
        walk::walk_parenthesized_expression(self, it);
    }

    fn visit_conditional_expression(&mut self, it: &ConditionalExpression<'a>) {
        self.bare(it.consequent.span());
        self.bare(it.alternate.span());
        walk::walk_conditional_expression(self, it);
    }

    fn visit_sequence_expression(&mut self, it: &SequenceExpression<'a>) {
        for expression in &it.expressions {
            self.bare(expression.span());
        }
        walk::walk_sequence_expression(self, it);
    }

    fn visit_template_literal(&mut self, it: &TemplateLiteral<'a>) {
        for expression in &it.expressions {
            self.bare(expression.span());
        }
        walk::walk_template_literal(self, it);
    }

    fn visit_jsx_expression_container(&mut self, it: &JSXExpressionContainer<'a>) {
        if let Some(expression) = it.expression.as_expression() {
            self.bare(expression.span());
        }
        walk::walk_jsx_expression_container(self, it);
    }

    fn visit_property_definition(&mut self, it: &PropertyDefinition<'a>) {
        if let Some(value) = &it.value {
            self.bare(value.span());
        }
        walk::walk_property_definition(self, it);
    }
}
