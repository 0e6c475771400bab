//! Arrow function components to class components.
//!
//! Before:
//! ```js
//! const HistoryItem = (props) => {
//!   const { item } = props;
//!   return <li>{item}</li>;
//! };
//! ```
//!
//! After:
//! ```js
//! class HistoryItem extends Component {
//!   render() {
//!     const { item } = this.props;
//!     return <li>{item}</li>;
//!   }
//! }
//! ```
//!
//! Only lone top-level (or exported) declarations whose arrow body renders
//! JSX are converted. The body is kept in place and shifted one level in;
//! lines that start inside a string or template literal are left alone.
//! When the base class is not bound in an ES module, it is imported from
//! the configured module.

use ciseau_carton::text::{indent_step, line_indent, line_starts_within};
use ciseau_carton::TextEdit;
use ciseau_croquis::{AccessFlags, ScopeTable};
use oxc_ast::ast::{
    ArrowFunctionExpression, BindingPatternKind, Declaration, Expression,
    ImportDeclarationSpecifier, Statement, VariableDeclaration, VariableDeclarator,
};
use oxc_ast_visit::Visit;
use oxc_span::GetSpan;

use super::context_scan::ContextScan;
use super::{log_skip, SkipReason};
use crate::codemod::{is_identifier, Codemod, CodemodContext, CodemodMeta};

/// Convert arrow function components into class components
pub struct PureToComposite;

static META: CodemodMeta = CodemodMeta {
    name: "pure-to-composite",
    description: "Convert arrow function components into class components with a render method",
    paths: &[],
    module_api_change: true,
};

impl Codemod for PureToComposite {
    fn meta(&self) -> &'static CodemodMeta {
        &META
    }

    fn transform(&self, ctx: &CodemodContext<'_, '_>) -> Vec<TextEdit> {
        let table = ScopeTable::build(ctx.program);
        let mut edits = Vec::new();
        let mut converted = false;

        for statement in &ctx.program.body {
            let Some((declaration, end)) = variable_statement(statement) else {
                continue;
            };
            for declarator in &declaration.declarations {
                let Some(component) = Component::new(declarator, declaration.span.start, end)
                else {
                    continue;
                };
                if declaration.declarations.len() > 1 {
                    log_skip(META.name, declarator.span, SkipReason::SharedDeclaration);
                    continue;
                }
                match plan_component(ctx, &table, &component) {
                    Ok(component_edits) => {
                        edits.extend(component_edits);
                        converted = true;
                    }
                    Err(reason) => log_skip(META.name, component.arrow.span, reason),
                }
            }
        }

        if converted {
            edits.extend(base_class_import(ctx, &table));
        }
        edits
    }
}

/// A declarator that looks like an arrow function component
struct Component<'b, 'a> {
    name: &'b str,
    arrow: &'b ArrowFunctionExpression<'a>,
    /// Start of the `const`/`let`/`var` keyword
    start: u32,
    /// End of the whole statement, `;` included
    end: u32,
    scan: ContextScan,
}

impl<'b, 'a> Component<'b, 'a> {
    fn new(declarator: &'b VariableDeclarator<'a>, start: u32, end: u32) -> Option<Self> {
        let BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind else {
            return None;
        };
        let Some(Expression::ArrowFunctionExpression(arrow)) = &declarator.init else {
            return None;
        };
        let mut scan = ContextScan::default();
        scan.visit_function_body(&arrow.body);
        scan.has_jsx.then(|| Self {
            name: id.name.as_str(),
            arrow,
            start,
            end,
            scan,
        })
    }
}

/// The variable declaration of a top-level statement, with the statement end
fn variable_statement<'b, 'a>(
    statement: &'b Statement<'a>,
) -> Option<(&'b VariableDeclaration<'a>, u32)> {
    match statement {
        Statement::VariableDeclaration(declaration) => {
            Some((&**declaration, declaration.span.end))
        }
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(Declaration::VariableDeclaration(declaration)) => {
                Some((&**declaration, export.span.end))
            }
            _ => None,
        },
        _ => None,
    }
}

fn plan_component(
    ctx: &CodemodContext<'_, '_>,
    table: &ScopeTable,
    component: &Component<'_, '_>,
) -> Result<Vec<TextEdit>, SkipReason> {
    let base = ctx.options.component_base_class.as_str();
    if component.name == base {
        return Err(SkipReason::BaseClassCollision);
    }
    if component.arrow.r#async {
        return Err(SkipReason::AsyncComponent);
    }
    if component.scan.this_at_top {
        return Err(SkipReason::UsesThis);
    }
    if component.scan.context_at_top {
        return Err(SkipReason::UsesFunctionContext);
    }

    let mut edits = match component_parameter(component.arrow)? {
        Some(parameter) => parameter_edits(table, component, parameter)?,
        None => Vec::new(),
    };
    edits.extend(layout_edits(ctx, component, base));
    Ok(edits)
}

/// The props parameter: none, or a single plain identifier
fn component_parameter<'b>(
    arrow: &'b ArrowFunctionExpression<'_>,
) -> Result<Option<&'b str>, SkipReason> {
    let params = &arrow.params;
    if params.rest.is_some() || params.items.len() > 1 {
        return Err(SkipReason::UnsupportedParameters);
    }
    match params.items.first() {
        None => Ok(None),
        Some(param) => match &param.pattern.kind {
            BindingPatternKind::BindingIdentifier(id) => Ok(Some(id.name.as_str())),
            _ => Err(SkipReason::UnsupportedParameters),
        },
    }
}

/// Point every use of the props parameter at `this.props`
fn parameter_edits(
    table: &ScopeTable,
    component: &Component<'_, '_>,
    parameter: &str,
) -> Result<Vec<TextEdit>, SkipReason> {
    let scope = table
        .functions()
        .iter()
        .find(|function| function.span == component.arrow.span)
        .map(|function| function.scope)
        .ok_or(SkipReason::NoEnclosingFunction)?;

    if table.declarations_within(scope, parameter).nth(1).is_some() {
        return Err(SkipReason::ParameterRedeclared);
    }

    let this_scope = table.this_scope(scope);
    let mut edits = Vec::new();
    for reference in table.references() {
        if reference.name.as_str() != parameter || !table.is_within(reference.scope, scope) {
            continue;
        }
        if reference.flags.contains(AccessFlags::WRITE) {
            return Err(SkipReason::Reassigned);
        }
        if table.this_scope(reference.scope) != this_scope {
            return Err(SkipReason::ParameterInNestedFunction);
        }

        let shorthand = component
            .scan
            .shorthand_properties
            .iter()
            .find(|property| {
                property.start <= reference.span.start && reference.span.end <= property.end
            });
        edits.push(match shorthand {
            Some(property) => TextEdit::replace(
                property.start,
                property.end,
                format!("{parameter}: this.props"),
            ),
            None => TextEdit::replace(reference.span.start, reference.span.end, "this.props"),
        });
    }
    Ok(edits)
}

/// Class header, `render()` wrapper, footer and re-indentation
fn layout_edits(
    ctx: &CodemodContext<'_, '_>,
    component: &Component<'_, '_>,
    base: &str,
) -> Vec<TextEdit> {
    let source = ctx.source;
    let arrow = component.arrow;
    let name = component.name;
    let indent = line_indent(source, component.start as usize);

    let expression = arrow.get_expression();
    let (body_start, body_end) = match expression {
        Some(expression) => (expression.span().start, expression.span().end),
        None => (arrow.body.span.start, arrow.body.span.end),
    };

    let lines: Vec<usize> = line_starts_within(source, body_start as usize, body_end as usize)
        .into_iter()
        .filter(|line| !component.scan.is_verbatim(*line))
        .collect();
    let unit = lines
        .iter()
        .find_map(|line| indent_step(indent, line_indent(source, *line)))
        .map(str::to_string)
        .unwrap_or_else(|| ctx.print_options().indent_unit());

    let (header, footer, shift) = if expression.is_some() {
        let shift = unit.repeat(2);
        (
            format!("class {name} extends {base} {{\n{indent}{unit}render() {{\n{indent}{shift}return "),
            format!(";\n{indent}{unit}}}\n{indent}}}"),
            shift,
        )
    } else {
        (
            format!("class {name} extends {base} {{\n{indent}{unit}render() "),
            format!("\n{indent}}}"),
            unit,
        )
    };

    let mut edits = Vec::with_capacity(lines.len() + 2);
    edits.push(TextEdit::replace(component.start, body_start, header));
    edits.extend(
        lines
            .into_iter()
            .map(|line| TextEdit::insert(line as u32, shift.clone())),
    );
    edits.push(TextEdit::replace(body_end, component.end, footer));
    edits
}

/// Import the base class when an ES module does not bind it yet.
///
/// Extends an existing import from the component module where possible.
fn base_class_import(ctx: &CodemodContext<'_, '_>, table: &ScopeTable) -> Option<TextEdit> {
    let base = ctx.options.component_base_class.as_str();
    let module = ctx.options.component_module.as_str();
    if !ctx.source_type.is_module() || !is_identifier(base) {
        return None;
    }
    if table.root().is_some_and(|root| root.has_binding(base)) {
        return None;
    }

    let print = ctx.print_options();
    let mut last_import = None;
    for statement in &ctx.program.body {
        let Statement::ImportDeclaration(import) = statement else {
            continue;
        };
        last_import = Some(import.span.end);
        if import.source.value.as_str() != module || import.import_kind.is_type() {
            continue;
        }
        let Some(specifiers) = &import.specifiers else {
            continue;
        };
        let last_named = specifiers
            .iter()
            .filter_map(|specifier| match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(named) => Some(named.span.end),
                _ => None,
            })
            .last();
        if let Some(end) = last_named {
            return Some(TextEdit::insert(end, format!(", {base}")));
        }
        if let [ImportDeclarationSpecifier::ImportDefaultSpecifier(default_specifier)] =
            &specifiers[..]
        {
            return Some(TextEdit::insert(
                default_specifier.span.end,
                format!(", {}", print.braced(&[base])),
            ));
        }
    }

    let import = format!(
        "import {} from {};",
        print.braced(&[base]),
        print.quoted(module)
    );
    match last_import {
        Some(end) => Some(TextEdit::insert(end, format!("\n{import}"))),
        None => ctx
            .program
            .body
            .first()
            .map(|statement| TextEdit::insert(statement.span().start, format!("{import}\n\n"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemod::TransformOptions;
    use crate::runner::run_codemod;
    use insta::assert_snapshot;
    use oxc_span::SourceType;

    fn run(source: &str) -> String {
        run_codemod(
            &PureToComposite,
            source,
            SourceType::mjs().with_jsx(true),
            &TransformOptions::default(),
        )
        .unwrap()
        .code
    }

    #[test]
    fn test_block_body() {
        let source = "import React from 'react';

const HistoryItem = (props) => {
  const { item } = props;
  return <li>{item}</li>;
};
";
        assert_snapshot!(run(source), @r"
        import React, { Component } from 'react';

        class HistoryItem extends Component {
          render() {
            const { item } = this.props;
            return <li>{item}</li>;
          }
        }
        ");
    }

    #[test]
    fn test_expression_body_exported() {
        assert_snapshot!(run("export const Title = () => <h1>Hello</h1>;\n"), @r"
        import { Component } from 'react';

        export class Title extends Component {
            render() {
                return <h1>Hello</h1>;
            }
        }
        ");
    }

    #[test]
    fn test_multiline_expression_body() {
        let source = "import { Component } from 'react';
const Box = (props) => (
  <div>
    {props.children}
  </div>
);
";
        assert_snapshot!(run(source), @r"
        import { Component } from 'react';
        class Box extends Component {
          render() {
            return (
              <div>
                {this.props.children}
              </div>
            );
          }
        }
        ");
    }

    #[test]
    fn test_extends_named_import() {
        assert_eq!(
            run("import { useState } from 'react';\nconst A = () => <div />;"),
            "import { useState, Component } from 'react';\nclass A extends Component {\n    render() {\n        return <div />;\n    }\n}"
        );
    }

    #[test]
    fn test_nested_arrow_and_shorthand() {
        assert_eq!(
            run("import { Component } from 'react';\nconst A = (props) => <B v={{ props }} f={() => props.x} />;"),
            "import { Component } from 'react';\nclass A extends Component {\n    render() {\n        return <B v={{ props: this.props }} f={() => this.props.x} />;\n    }\n}"
        );
    }

    #[test]
    fn test_template_literal_lines_untouched() {
        let source = "import { Component } from 'react';
const A = () => {
  const text = `a
b`;
  return <p>{text}</p>;
};
";
        assert_snapshot!(run(source), @r"
        import { Component } from 'react';
        class A extends Component {
          render() {
            const text = `a
        b`;
            return <p>{text}</p>;
          }
        }
        ");
    }

    #[test]
    fn test_skips() {
        let untouched = [
            "const add = (a, b) => a + b;",
            "const A = () => <div>{this.x}</div>;",
            "const A = () => <div>{arguments.length}</div>;",
            "const A = (a, b) => <div />;",
            "const A = ({ x }) => <div>{x}</div>;",
            "const A = async () => <div />;",
            "const Component = () => <div />;",
            "const A = () => <div />, B = 1;",
            "const A = (props) => <div onClick={function () { return props.x; }} />;",
            "const A = (props) => { if (x) { const props = 1; } return <div />; };",
            "const A = (props) => { props = {}; return <div />; };",
        ];
        for source in untouched {
            assert_eq!(run(source), source);
        }
    }

    #[test]
    fn test_nested_declaration_untouched() {
        let source = "function outer() { const A = () => <div />; return A; }";
        assert_eq!(run(source), source);
    }
}
