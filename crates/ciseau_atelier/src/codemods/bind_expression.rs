//! `.bind(this)` to the bind operator.
//!
//! Before:
//! ```js
//! <button onClick={this.handleClick.bind(this)} />
//! ```
//!
//! After:
//! ```js
//! <button onClick={::this.handleClick} />
//! ```
//!
//! The output uses the function-bind proposal syntax, which the parser does
//! not accept, so this codemod runs after every codemod that re-reads the
//! file.

use ciseau_carton::TextEdit;
use oxc_ast::ast::{Argument, CallExpression, Expression};
use oxc_ast_visit::{walk, Visit};
use oxc_span::GetSpan;

use crate::codemod::{Codemod, CodemodContext, CodemodMeta};

/// Replace `this.<member>.bind(this)` with `::this.<member>`
pub struct BindExpression;

static META: CodemodMeta = CodemodMeta {
    name: "bind-expression",
    description: "Replace `this.<member>.bind(this)` with the `::this.<member>` bind operator",
    paths: &[],
    module_api_change: false,
};

impl Codemod for BindExpression {
    fn meta(&self) -> &'static CodemodMeta {
        &META
    }

    fn transform(&self, ctx: &CodemodContext<'_, '_>) -> Vec<TextEdit> {
        let mut finder = BindFinder::default();
        finder.visit_program(ctx.program);
        finder.edits
    }
}

#[derive(Default)]
struct BindFinder {
    edits: Vec<TextEdit>,
}

impl<'a> Visit<'a> for BindFinder {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Some(member_end) = bound_member_end(it) {
            // `::` in front, `.bind(this)` dropped; the member keeps its own edits
            self.edits.push(TextEdit::insert(it.span.start, "::"));
            self.edits.push(TextEdit::delete(member_end, it.span.end));
        }
        walk::walk_call_expression(self, it);
    }
}

/// End of `this.<member>` when `call` is exactly `this.<member>.bind(this)`
fn bound_member_end(call: &CallExpression<'_>) -> Option<u32> {
    if call.optional {
        return None;
    }
    let Expression::StaticMemberExpression(callee) = &call.callee else {
        return None;
    };
    if callee.optional || callee.property.name.as_str() != "bind" {
        return None;
    }
    let [Argument::ThisExpression(_)] = &call.arguments[..] else {
        return None;
    };
    let receiver = match &callee.object {
        Expression::StaticMemberExpression(member) if !member.optional => &member.object,
        Expression::ComputedMemberExpression(member) if !member.optional => &member.object,
        Expression::PrivateFieldExpression(member) if !member.optional => &member.object,
        _ => return None,
    };
    matches!(receiver, Expression::ThisExpression(_)).then(|| callee.object.span().end)
}
