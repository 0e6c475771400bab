//! Function-context scan shared by the structural codemods.
//!
//! Records where a subtree touches `this`, `arguments`, `super` or
//! `new.target`, whether it contains JSX, and which spans must be copied
//! verbatim when re-indenting.

use oxc_ast::ast::{
    Class, Function, IdentifierReference, JSXElement, JSXFragment, MetaProperty, ObjectProperty,
    StringLiteral, Super, TemplateLiteral, ThisExpression,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::Span;
use oxc_syntax::scope::ScopeFlags;

#[derive(Debug, Default)]
pub(crate) struct ContextScan {
    /// Nesting depth of non-arrow functions and class bodies
    depth: u32,
    /// `this` outside any nested function
    pub this_at_top: bool,
    /// `this` at any depth
    pub this_anywhere: bool,
    /// `arguments`, `super` or `new.target` outside any nested function
    pub context_at_top: bool,
    /// `arguments`, `super` or `new.target` at any depth
    pub context_anywhere: bool,
    pub has_jsx: bool,
    /// Spans of shorthand object properties (`{ props }`)
    pub shorthand_properties: Vec<Span>,
    /// String and template literals; line starts inside them are content
    pub verbatim: Vec<Span>,
}

impl ContextScan {
    /// Whether the line starting at `offset` lies inside a literal
    pub(crate) fn is_verbatim(&self, offset: usize) -> bool {
        let offset = offset as u32;
        self.verbatim
            .iter()
            .any(|span| span.start < offset && offset < span.end)
    }

    fn mark_this(&mut self) {
        self.this_anywhere = true;
        if self.depth == 0 {
            self.this_at_top = true;
        }
    }

    fn mark_context(&mut self) {
        self.context_anywhere = true;
        if self.depth == 0 {
            self.context_at_top = true;
        }
    }
}

impl<'a> Visit<'a> for ContextScan {
    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        self.depth += 1;
        walk::walk_function(self, it, flags);
        self.depth -= 1;
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        // `extends` is evaluated in the surrounding context
        if let Some(super_class) = &it.super_class {
            self.visit_expression(super_class);
        }
        self.depth += 1;
        self.visit_class_body(&it.body);
        self.depth -= 1;
    }

    fn visit_this_expression(&mut self, _it: &ThisExpression) {
        self.mark_this();
    }

    fn visit_super(&mut self, _it: &Super) {
        self.mark_context();
    }

    fn visit_meta_property(&mut self, it: &MetaProperty<'a>) {
        if it.meta.name.as_str() == "new" && it.property.name.as_str() == "target" {
            self.mark_context();
        }
    }

    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if it.name.as_str() == "arguments" {
            self.mark_context();
        }
    }

    fn visit_jsx_element(&mut self, it: &JSXElement<'a>) {
        self.has_jsx = true;
        walk::walk_jsx_element(self, it);
    }

    fn visit_jsx_fragment(&mut self, it: &JSXFragment<'a>) {
        self.has_jsx = true;
        walk::walk_jsx_fragment(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.shorthand {
            self.shorthand_properties.push(it.span);
        }
        walk::walk_object_property(self, it);
    }

    fn visit_string_literal(&mut self, it: &StringLiteral<'a>) {
        self.verbatim.push(it.span);
    }

    fn visit_template_literal(&mut self, it: &TemplateLiteral<'a>) {
        self.verbatim.push(it.span);
        walk::walk_template_literal(self, it);
    }
}
