//! AST walker that fills a [`ScopeTable`].
//!
//! Scopes are opened through OXC's `enter_scope` hook, so every node kind
//! the visitor considers scoped gets exactly one [`Scope`]. Declarations are
//! recorded at the point their declaring node is visited.

use std::cell::Cell;

use ciseau_carton::{CompactString, FxHashMap};
use oxc_ast::ast::{
    ArrowFunctionExpression, AssignmentTargetPropertyIdentifier, BindingIdentifier,
    BindingPattern, BindingPatternKind, BindingProperty, CallExpression, CatchParameter, Class,
    Expression, FormalParameters, Function, FunctionType, IdentifierReference, ImportDeclaration,
    ImportDeclarationSpecifier, PropertyKey, SimpleAssignmentTarget, Statement,
    StaticMemberExpression, UnaryExpression, VariableDeclaration, VariableDeclarationKind,
};
use oxc_ast::AstKind;
use oxc_ast_visit::{walk, Visit};
use oxc_span::GetSpan;
use oxc_syntax::operator::UnaryOperator;
use oxc_syntax::scope::{ScopeFlags, ScopeId as SemanticScopeId};

use super::table::{Scope, ScopeTable};
use super::types::{
    AccessFlags, BodyDestructure, DeclarationKind, DeclarationSite, DeclaratorInfo, FunctionInfo,
    MemberAccess, MemberChain, PatternPosition, Reference, ScopeId, ScopeKind, Span, SuperCall,
};

pub(super) struct ScopeBuilder {
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
    references: Vec<Reference>,
    member_accesses: Vec<MemberAccess>,
    super_calls: Vec<SuperCall>,
    functions: Vec<FunctionInfo>,
    function_by_scope: FxHashMap<ScopeId, usize>,
    /// Span of the most recently entered node; the next scope belongs to it
    node_span: Span,
    /// Function info waiting for its scope to open
    pending_function: Option<FunctionInfo>,
    /// Function-expression name, bound inside the function's own scope
    pending_name: Option<(CompactString, Span)>,
    /// Stack depth and span of a class whose body scope is about to open
    pending_class: Option<(usize, Span)>,
    /// Flags for the next identifier or member chain recorded
    pending_flags: AccessFlags,
}

impl ScopeBuilder {
    pub(super) fn new() -> Self {
        Self {
            scopes: Vec::new(),
            stack: Vec::new(),
            references: Vec::new(),
            member_accesses: Vec::new(),
            super_calls: Vec::new(),
            functions: Vec::new(),
            function_by_scope: FxHashMap::default(),
            node_span: Span::default(),
            pending_function: None,
            pending_name: None,
            pending_class: None,
            pending_flags: AccessFlags::empty(),
        }
    }

    pub(super) fn finish(self) -> ScopeTable {
        ScopeTable {
            scopes: self.scopes,
            references: self.references,
            member_accesses: self.member_accesses,
            super_calls: self.super_calls,
            functions: self.functions,
            function_by_scope: self.function_by_scope,
        }
    }

    #[inline]
    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId::ROOT)
    }

    /// Nearest scope `var` declarations hoist to
    fn var_scope(&self) -> ScopeId {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|id| self.scopes[id.index()].kind.is_var_target())
            .unwrap_or(ScopeId::ROOT)
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        id: &BindingIdentifier<'_>,
        kind: DeclarationKind,
        position: PatternPosition,
        declarator: Option<&DeclaratorInfo>,
    ) {
        if let Some(target) = self.scopes.get_mut(scope.index()) {
            target.declare(
                id.name.as_str().into(),
                DeclarationSite {
                    span: id.span,
                    kind,
                    position,
                    declarator: declarator.cloned(),
                },
            );
        }
    }

    /// Declare every name bound by a declaring pattern.
    fn declare_pattern(
        &mut self,
        pattern: &BindingPattern<'_>,
        kind: DeclarationKind,
        scope: ScopeId,
        declarator: Option<&DeclaratorInfo>,
    ) {
        match &pattern.kind {
            BindingPatternKind::BindingIdentifier(id) => {
                self.declare(scope, id, kind, PatternPosition::Direct, declarator);
            }
            BindingPatternKind::ObjectPattern(object) => {
                for property in &object.properties {
                    let key = static_property_key(property);
                    match &property.value.kind {
                        BindingPatternKind::BindingIdentifier(id) => {
                            let position = PatternPosition::Property {
                                key,
                                has_default: false,
                            };
                            self.declare(scope, id, kind, position, declarator);
                        }
                        BindingPatternKind::AssignmentPattern(assign) => {
                            if let BindingPatternKind::BindingIdentifier(id) = &assign.left.kind {
                                let position = PatternPosition::Property {
                                    key,
                                    has_default: true,
                                };
                                self.declare(scope, id, kind, position, declarator);
                            } else {
                                self.declare_nested(&assign.left, kind, scope, declarator);
                            }
                        }
                        _ => self.declare_nested(&property.value, kind, scope, declarator),
                    }
                }
                if let Some(rest) = &object.rest {
                    if let BindingPatternKind::BindingIdentifier(id) = &rest.argument.kind {
                        self.declare(scope, id, kind, PatternPosition::Rest, declarator);
                    } else {
                        self.declare_nested(&rest.argument, kind, scope, declarator);
                    }
                }
            }
            BindingPatternKind::ArrayPattern(_) => {
                self.declare_nested(pattern, kind, scope, declarator);
            }
            // Parameter defaults: `function f(a = 1)`
            BindingPatternKind::AssignmentPattern(assign) => {
                self.declare_pattern(&assign.left, kind, scope, declarator);
            }
        }
    }

    fn declare_nested(
        &mut self,
        pattern: &BindingPattern<'_>,
        kind: DeclarationKind,
        scope: ScopeId,
        declarator: Option<&DeclaratorInfo>,
    ) {
        match &pattern.kind {
            BindingPatternKind::BindingIdentifier(id) => {
                self.declare(scope, id, kind, PatternPosition::Nested, declarator);
            }
            BindingPatternKind::ObjectPattern(object) => {
                for property in &object.properties {
                    self.declare_nested(&property.value, kind, scope, declarator);
                }
                if let Some(rest) = &object.rest {
                    self.declare_nested(&rest.argument, kind, scope, declarator);
                }
            }
            BindingPatternKind::ArrayPattern(array) => {
                for element in array.elements.iter().flatten() {
                    self.declare_nested(element, kind, scope, declarator);
                }
                if let Some(rest) = &array.rest {
                    self.declare_nested(&rest.argument, kind, scope, declarator);
                }
            }
            BindingPatternKind::AssignmentPattern(assign) => {
                self.declare_nested(&assign.left, kind, scope, declarator);
            }
        }
    }

    #[inline]
    fn take_flags(&mut self) -> AccessFlags {
        std::mem::take(&mut self.pending_flags)
    }
}

impl<'a> Visit<'a> for ScopeBuilder {
    fn enter_node(&mut self, kind: AstKind<'a>) {
        self.node_span = kind.span();
    }

    fn enter_scope(&mut self, flags: ScopeFlags, _scope_id: &Cell<Option<SemanticScopeId>>) {
        // Arrow scopes also carry the `Function` flag, so test `Arrow` first.
        let kind = if flags.contains(ScopeFlags::Top) {
            ScopeKind::Module
        } else if flags.contains(ScopeFlags::Arrow) {
            ScopeKind::Arrow
        } else if flags.contains(ScopeFlags::Function) {
            ScopeKind::Function
        } else if flags.contains(ScopeFlags::ClassStaticBlock) {
            ScopeKind::StaticBlock
        } else {
            ScopeKind::Block
        };

        // Decorators are walked before the class scope opens, so only a
        // non-function scope at the class's own depth is its body.
        let class_span = match self.pending_class {
            Some((depth, span)) if kind == ScopeKind::Block && depth == self.stack.len() => {
                self.pending_class = None;
                Some(span)
            }
            _ => None,
        };
        let (kind, span) = match class_span {
            Some(span) => (ScopeKind::Class, span),
            None => (kind, self.node_span),
        };

        let id = ScopeId::new(self.scopes.len() as u32);
        let parent = self.stack.last().copied();
        let mut scope = Scope::new(id, parent, kind, span);

        if kind.is_function() {
            if let Some((name, span)) = self.pending_name.take() {
                scope.declare(
                    name,
                    DeclarationSite {
                        span,
                        kind: DeclarationKind::FunctionName,
                        position: PatternPosition::Direct,
                        declarator: None,
                    },
                );
            }
            if let Some(mut info) = self.pending_function.take() {
                info.scope = id;
                self.function_by_scope.insert(id, self.functions.len());
                self.functions.push(info);
            }
        }

        self.scopes.push(scope);
        self.stack.push(id);
    }

    fn leave_scope(&mut self) {
        self.stack.pop();
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        if let Some(id) = &it.id {
            if matches!(it.r#type, FunctionType::FunctionDeclaration) {
                let current = self.current();
                self.declare(current, id, DeclarationKind::Function, PatternPosition::Direct, None);
                // Sloppy-mode block functions are also visible function-wide
                let var_scope = self.var_scope();
                if var_scope != current {
                    self.declare(
                        var_scope,
                        id,
                        DeclarationKind::Function,
                        PatternPosition::Direct,
                        None,
                    );
                }
            } else {
                self.pending_name = Some((id.name.as_str().into(), id.span));
            }
        }

        self.pending_function = it.body.as_ref().map(|body| FunctionInfo {
            span: it.span,
            scope: ScopeId::ROOT,
            body_span: body.span,
            is_arrow: false,
            expression_body: false,
            first_statement: body.statements.first().map(|stmt| stmt.span().start),
            super_statement: find_super_statement(&body.statements),
            destructures: collect_destructures(&body.statements),
        });

        walk::walk_function(self, it, flags);
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        let (first_statement, super_statement, destructures) = if it.expression {
            (None, None, Vec::new())
        } else {
            (
                it.body.statements.first().map(|stmt| stmt.span().start),
                find_super_statement(&it.body.statements),
                collect_destructures(&it.body.statements),
            )
        };
        self.pending_function = Some(FunctionInfo {
            span: it.span,
            scope: ScopeId::ROOT,
            body_span: it.body.span,
            is_arrow: true,
            expression_body: it.expression,
            first_statement,
            super_statement,
            destructures,
        });

        walk::walk_arrow_function_expression(self, it);
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        // Class-expression names are really scoped to the class body; binding
        // them one level out only makes lookups more conservative.
        if let Some(id) = &it.id {
            let current = self.current();
            self.declare(current, id, DeclarationKind::Class, PatternPosition::Direct, None);
        }
        self.pending_class = Some((self.stack.len(), it.span));
        walk::walk_class(self, it);
    }

    fn visit_formal_parameters(&mut self, it: &FormalParameters<'a>) {
        let scope = self.current();
        for param in &it.items {
            self.declare_pattern(&param.pattern, DeclarationKind::Parameter, scope, None);
        }
        if let Some(rest) = &it.rest {
            self.declare_pattern(&rest.argument, DeclarationKind::Parameter, scope, None);
        }
        walk::walk_formal_parameters(self, it);
    }

    fn visit_catch_parameter(&mut self, it: &CatchParameter<'a>) {
        let scope = self.current();
        self.declare_pattern(&it.pattern, DeclarationKind::CatchParameter, scope, None);
        walk::walk_catch_parameter(self, it);
    }

    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        let scope = self.current();
        if let Some(specifiers) = &it.specifiers {
            for specifier in specifiers {
                let local = match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => &s.local,
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => &s.local,
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => &s.local,
                };
                self.declare(scope, local, DeclarationKind::Import, PatternPosition::Direct, None);
            }
        }
        walk::walk_import_declaration(self, it);
    }

    fn visit_variable_declaration(&mut self, it: &VariableDeclaration<'a>) {
        let kind = declaration_kind(it.kind);
        let scope = if kind == DeclarationKind::Var {
            self.var_scope()
        } else {
            self.current()
        };
        for declarator in &it.declarations {
            let info = DeclaratorInfo {
                span: declarator.span,
                init: declarator.init.as_ref().and_then(MemberChain::from_expression),
            };
            self.declare_pattern(&declarator.id, kind, scope, Some(&info));
        }
        walk::walk_variable_declaration(self, it);
    }

    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        let flags = self.take_flags();
        self.references.push(Reference {
            name: it.name.as_str().into(),
            span: it.span,
            scope: self.current(),
            flags,
        });
    }

    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        let flags = self.take_flags();
        if let Some(chain) = MemberChain::from_static_member(it) {
            self.member_accesses.push(MemberAccess {
                span: it.span,
                chain,
                scope: self.current(),
                flags,
            });
        }
        walk::walk_static_member_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if matches!(it.callee, Expression::Super(_)) {
            self.super_calls.push(SuperCall {
                span: it.span,
                scope: self.current(),
            });
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_simple_assignment_target(&mut self, it: &SimpleAssignmentTarget<'a>) {
        if matches!(
            it,
            SimpleAssignmentTarget::AssignmentTargetIdentifier(_)
                | SimpleAssignmentTarget::StaticMemberExpression(_)
        ) {
            self.pending_flags = AccessFlags::WRITE;
        }
        walk::walk_simple_assignment_target(self, it);
        self.pending_flags = AccessFlags::empty();
    }

    fn visit_assignment_target_property_identifier(
        &mut self,
        it: &AssignmentTargetPropertyIdentifier<'a>,
    ) {
        self.pending_flags = AccessFlags::WRITE;
        self.visit_identifier_reference(&it.binding);
        if let Some(init) = &it.init {
            self.visit_expression(init);
        }
    }

    fn visit_unary_expression(&mut self, it: &UnaryExpression<'a>) {
        if it.operator == UnaryOperator::Delete
            && matches!(
                it.argument.without_parentheses(),
                Expression::StaticMemberExpression(_) | Expression::Identifier(_)
            )
        {
            self.pending_flags = AccessFlags::DELETE;
        }
        walk::walk_unary_expression(self, it);
        self.pending_flags = AccessFlags::empty();
    }
}

fn declaration_kind(kind: VariableDeclarationKind) -> DeclarationKind {
    match kind {
        VariableDeclarationKind::Var => DeclarationKind::Var,
        VariableDeclarationKind::Let => DeclarationKind::Let,
        VariableDeclarationKind::Const => DeclarationKind::Const,
        VariableDeclarationKind::Using | VariableDeclarationKind::AwaitUsing => {
            DeclarationKind::Using
        }
    }
}

/// Source key of a pattern property; `None` when computed from an expression.
fn static_property_key(property: &BindingProperty<'_>) -> Option<CompactString> {
    match &property.key {
        PropertyKey::StaticIdentifier(id) if !property.computed => Some(id.name.as_str().into()),
        PropertyKey::StringLiteral(lit) => Some(lit.value.as_str().into()),
        _ => None,
    }
}

/// The first `super(...);` expression statement among `statements`.
fn find_super_statement(statements: &[Statement<'_>]) -> Option<Span> {
    statements.iter().find_map(|statement| match statement {
        Statement::ExpressionStatement(expression) => match &expression.expression {
            Expression::CallExpression(call) if matches!(call.callee, Expression::Super(_)) => {
                Some(expression.span)
            }
            _ => None,
        },
        _ => None,
    })
}

/// Top-level object-pattern declarations among `statements`.
fn collect_destructures(statements: &[Statement<'_>]) -> Vec<BodyDestructure> {
    let mut destructures = Vec::new();
    for statement in statements {
        let Statement::VariableDeclaration(declaration) = statement else {
            continue;
        };
        for declarator in &declaration.declarations {
            let BindingPatternKind::ObjectPattern(object) = &declarator.id.kind else {
                continue;
            };
            destructures.push(BodyDestructure {
                statement_span: declaration.span,
                pattern_span: object.span,
                init: declarator.init.as_ref().and_then(MemberChain::from_expression),
                keys: object.properties.iter().map(static_property_key).collect(),
                last_property_end: object.properties.last().map(|property| property.span.end),
                has_rest: object.rest.is_some(),
            });
        }
    }
    destructures
}
