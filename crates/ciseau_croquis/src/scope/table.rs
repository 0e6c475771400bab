//! Scope table and resolution queries.
//!
//! - `Scope` - a single lexical scope and the names it declares
//! - `ScopeTable` - every scope of a file plus references, member accesses
//!   and function-like nodes

use ciseau_carton::{CompactString, FxHashMap, SmallVec};
use oxc_ast::ast::Program;
use oxc_ast_visit::Visit;

use super::builder::ScopeBuilder;
use super::types::{
    AccessFlags, DeclarationSite, FunctionInfo, MemberAccess, Reference, ScopeId, ScopeKind, Span,
    SuperCall,
};

/// Declaration sites of one name inside one scope
pub(crate) type Sites = SmallVec<[DeclarationSite; 1]>;

/// A single lexical scope
#[derive(Debug)]
pub struct Scope {
    /// Unique identifier
    pub id: ScopeId,
    /// Lexical parent (`None` for the module scope)
    pub parent: Option<ScopeId>,
    /// Kind of scope
    pub kind: ScopeKind,
    /// Source span of the node that introduced the scope
    pub span: Span,
    /// Declaration sites keyed by name, in source order per name
    bindings: FxHashMap<CompactString, Sites>,
}

impl Scope {
    #[inline]
    pub(crate) fn new(id: ScopeId, parent: Option<ScopeId>, kind: ScopeKind, span: Span) -> Self {
        Self {
            id,
            parent,
            kind,
            span,
            bindings: FxHashMap::default(),
        }
    }

    /// Record a declaration site for `name`
    #[inline]
    pub(crate) fn declare(&mut self, name: CompactString, site: DeclarationSite) {
        self.bindings.entry(name).or_default().push(site);
    }

    /// Declaration sites of `name` in this scope only
    #[inline]
    pub fn declarations(&self, name: &str) -> &[DeclarationSite] {
        self.bindings
            .get(name)
            .map(|sites| sites.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `name` is declared in this scope
    #[inline]
    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Iterate over all bindings in this scope
    #[inline]
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &[DeclarationSite])> {
        self.bindings
            .iter()
            .map(|(name, sites)| (name.as_str(), sites.as_slice()))
    }
}

/// The nearest-enclosing binding of a name
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'t> {
    /// The scope declaring the name
    pub scope: ScopeId,
    /// Every site in that scope declaring the name
    pub sites: &'t [DeclarationSite],
}

impl Resolution<'_> {
    /// Whether the name is declared exactly once
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.sites.len() == 1
    }
}

/// Immutable scope side-table for one file
#[derive(Debug)]
pub struct ScopeTable {
    pub(crate) scopes: Vec<Scope>,
    pub(crate) references: Vec<Reference>,
    pub(crate) member_accesses: Vec<MemberAccess>,
    pub(crate) super_calls: Vec<SuperCall>,
    pub(crate) functions: Vec<FunctionInfo>,
    pub(crate) function_by_scope: FxHashMap<ScopeId, usize>,
}

impl ScopeTable {
    /// Build the table for a parsed program
    pub fn build(program: &Program<'_>) -> Self {
        let mut builder = ScopeBuilder::new();
        builder.visit_program(program);
        let table = builder.finish();
        tracing::trace!(
            scopes = table.scopes.len(),
            references = table.references.len(),
            member_accesses = table.member_accesses.len(),
            functions = table.functions.len(),
            "built scope table"
        );
        table
    }

    /// Get a scope by ID
    #[inline]
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    /// Get the module scope
    #[inline]
    pub fn root(&self) -> Option<&Scope> {
        self.scopes.first()
    }

    /// Iterate over all scopes in creation order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Number of scopes
    #[inline]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether the table has no scopes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Iterate from `scope` outwards to the module scope (inclusive)
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |id| {
            self.get(*id).and_then(|scope| scope.parent)
        })
        .filter(move |id| id.index() < self.scopes.len())
    }

    /// Whether `scope` is `ancestor` or nested inside it
    #[inline]
    pub fn is_within(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        self.ancestors(scope).any(|id| id == ancestor)
    }

    /// Resolve `name` from `scope` to its nearest-enclosing binding
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<Resolution<'_>> {
        self.ancestors(scope).find_map(|id| {
            let sites = self.scopes[id.index()].declarations(name);
            (!sites.is_empty()).then_some(Resolution { scope: id, sites })
        })
    }

    /// Whether `name` is visible from `scope`
    #[inline]
    pub fn is_defined(&self, scope: ScopeId, name: &str) -> bool {
        self.resolve(scope, name).is_some()
    }

    /// The scope that provides `this` for code in `scope`.
    ///
    /// Arrow functions and blocks inherit `this`, so this walks out to the
    /// nearest function, static block, class body or the module.
    pub fn this_scope(&self, scope: ScopeId) -> ScopeId {
        self.ancestors(scope)
            .find(|id| self.scopes[id.index()].kind.binds_this())
            .unwrap_or(ScopeId::ROOT)
    }

    /// Deepest scope whose span contains `offset`
    pub fn scope_at(&self, offset: u32) -> ScopeId {
        let mut current = ScopeId::ROOT;
        for scope in &self.scopes {
            let contains = scope.span.start <= offset && offset < scope.span.end;
            if contains && scope.parent.is_some_and(|parent| self.is_within(parent, current)) {
                current = scope.id;
            }
        }
        current
    }

    /// Every declaration site of `name` in `scope` or any scope nested in it
    pub fn declarations_within<'t>(
        &'t self,
        scope: ScopeId,
        name: &'t str,
    ) -> impl Iterator<Item = (ScopeId, &'t DeclarationSite)> + 't {
        self.scopes
            .iter()
            .filter(move |candidate| self.is_within(candidate.id, scope))
            .flat_map(move |candidate| {
                candidate
                    .declarations(name)
                    .iter()
                    .map(move |site| (candidate.id, site))
            })
    }

    /// Whether the binding of `name` declared in `binding_scope` is ever
    /// assigned to.
    pub fn is_mutated(&self, binding_scope: ScopeId, name: &str) -> bool {
        self.references.iter().any(|reference| {
            reference.flags.contains(AccessFlags::WRITE)
                && reference.name.as_str() == name
                && self
                    .resolve(reference.scope, name)
                    .is_some_and(|resolution| resolution.scope == binding_scope)
        })
    }

    /// Identifier references, in source order
    #[inline]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// References that resolve to no binding in the file
    pub fn unresolved_references(&self) -> impl Iterator<Item = &Reference> {
        self.references
            .iter()
            .filter(|reference| !self.is_defined(reference.scope, &reference.name))
    }

    /// Static member chains, in source order (outer chains first)
    #[inline]
    pub fn member_accesses(&self) -> &[MemberAccess] {
        &self.member_accesses
    }

    /// `super(...)` calls, in source order
    #[inline]
    pub fn super_calls(&self) -> &[SuperCall] {
        &self.super_calls
    }

    /// Function-like nodes, in source order
    #[inline]
    pub fn functions(&self) -> &[FunctionInfo] {
        &self.functions
    }

    /// The function introducing `scope`, if any
    #[inline]
    pub fn function(&self, scope: ScopeId) -> Option<&FunctionInfo> {
        self.function_by_scope
            .get(&scope)
            .map(|index| &self.functions[*index])
    }

    /// Innermost function-like node enclosing `scope` (inclusive)
    pub fn enclosing_function(&self, scope: ScopeId) -> Option<&FunctionInfo> {
        self.ancestors(scope).find_map(|id| self.function(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ChainRoot, DeclarationKind, MemberChain, PatternPosition};
    use insta::assert_snapshot;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn build(source: &str) -> ScopeTable {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::jsx()).parse();
        assert!(ret.errors.is_empty(), "{:?}", ret.errors);
        ScopeTable::build(&ret.program)
    }

    fn offset(source: &str, needle: &str) -> u32 {
        source.find(needle).unwrap() as u32
    }

    #[test]
    fn test_module_scope_is_root() {
        let table = build("const a = 1;");
        let root = table.root().unwrap();
        assert_eq!(root.id, ScopeId::ROOT);
        assert_eq!(root.kind, ScopeKind::Module);
        assert!(root.has_binding("a"));
    }

    #[test]
    fn test_resolve_nearest_binding() {
        let source = "const x = 1; function f() { let x = 2; return x; }";
        let table = build(source);
        let inner = table.scope_at(offset(source, "return x"));

        let resolution = table.resolve(inner, "x").unwrap();
        assert_ne!(resolution.scope, ScopeId::ROOT);
        assert!(resolution.is_unique());
        assert_eq!(resolution.sites[0].kind, DeclarationKind::Let);

        assert_eq!(
            table.resolve(ScopeId::ROOT, "x").unwrap().scope,
            ScopeId::ROOT
        );
        assert!(table.resolve(inner, "missing").is_none());
    }

    #[test]
    fn test_var_hoists_out_of_blocks() {
        let source = "function f() { if (a) { var v = 1; let l = 2; } return v; }";
        let table = build(source);
        let body = table.scope_at(offset(source, "return v"));

        let v = table.resolve(body, "v").unwrap();
        assert_eq!(table.get(v.scope).unwrap().kind, ScopeKind::Function);
        assert!(table.resolve(body, "l").is_none());
    }

    #[test]
    fn test_parameters_and_catch() {
        let source = "function f(a, { b }, ...c) { try {} catch (e) { e; } }";
        let table = build(source);
        let body = table.scope_at(offset(source, "try"));

        assert_eq!(
            table.resolve(body, "a").unwrap().sites[0].kind,
            DeclarationKind::Parameter
        );
        assert_eq!(
            table.resolve(body, "c").unwrap().sites[0].kind,
            DeclarationKind::Parameter
        );
        let b = table.resolve(body, "b").unwrap();
        assert_eq!(
            b.sites[0].position,
            PatternPosition::Property {
                key: Some("b".into()),
                has_default: false
            }
        );

        let handler = table.scope_at(offset(source, "e; }"));
        assert_eq!(
            table.resolve(handler, "e").unwrap().sites[0].kind,
            DeclarationKind::CatchParameter
        );
        assert!(table.resolve(body, "e").is_none());
    }

    #[test]
    fn test_pattern_positions() {
        let source =
            "function f() { const { a, b: c, d = 1, e: { g }, ...rest } = this.props; const [h] = x; }";
        let table = build(source);
        let body = table.scope_at(offset(source, "const {"));
        let position = |name: &str| table.resolve(body, name).unwrap().sites[0].position.clone();

        assert_eq!(
            position("a"),
            PatternPosition::Property {
                key: Some("a".into()),
                has_default: false
            }
        );
        assert_eq!(
            position("c"),
            PatternPosition::Property {
                key: Some("b".into()),
                has_default: false
            }
        );
        assert_eq!(
            position("d"),
            PatternPosition::Property {
                key: Some("d".into()),
                has_default: true
            }
        );
        assert_eq!(position("g"), PatternPosition::Nested);
        assert_eq!(position("rest"), PatternPosition::Rest);
        assert_eq!(position("h"), PatternPosition::Nested);

        let props = MemberChain::new(ChainRoot::This, &["props"]);
        let a = &table.resolve(body, "a").unwrap().sites[0];
        assert!(a.is_unaliased_property_of("a", &props));
        let c = &table.resolve(body, "c").unwrap().sites[0];
        assert!(!c.is_unaliased_property_of("c", &props));
    }

    #[test]
    fn test_function_expression_name_is_local() {
        let source = "const g = function inner() { return inner; };";
        let table = build(source);
        assert!(!table.root().unwrap().has_binding("inner"));

        let body = table.scope_at(offset(source, "return"));
        assert_eq!(
            table.resolve(body, "inner").unwrap().sites[0].kind,
            DeclarationKind::FunctionName
        );
    }

    #[test]
    fn test_imports_and_classes() {
        let table = build("import React, { Component as C } from 'react';\nclass A extends C {}");
        let root = table.root().unwrap();
        assert!(root.has_binding("React"));
        assert!(root.has_binding("C"));
        assert!(!root.has_binding("Component"));
        assert_eq!(root.declarations("A")[0].kind, DeclarationKind::Class);
    }

    #[test]
    fn test_this_scope_skips_arrows() {
        let source = "function f() { const g = () => { return this; }; }";
        let table = build(source);
        let arrow_body = table.scope_at(offset(source, "return this"));
        let this_scope = table.this_scope(arrow_body);
        assert_eq!(table.get(this_scope).unwrap().kind, ScopeKind::Function);
        assert_eq!(table.this_scope(ScopeId::ROOT), ScopeId::ROOT);
    }

    #[test]
    fn test_class_body_binds_this() {
        let source = "const f = () => 1; class A { x = this.props.y; m() { return 1; } }";
        let table = build(source);
        let field = table.scope_at(offset(source, "this.props"));
        let class = table.get(field).unwrap();
        assert_eq!(class.kind, ScopeKind::Class);
        assert_eq!(table.this_scope(field), field);

        let method = table.scope_at(offset(source, "return 1"));
        assert_eq!(table.get(method).unwrap().kind, ScopeKind::Function);
        assert_eq!(table.get(method).unwrap().parent, Some(field));
    }

    #[test]
    fn test_access_flags() {
        let source = "function f() { x = 1; y++; ({ z } = o); this.props.a = 1; delete this.props.b; this.props.c; }";
        let table = build(source);

        let written: Vec<&str> = table
            .references()
            .iter()
            .filter(|reference| reference.flags.contains(AccessFlags::WRITE))
            .map(|reference| reference.name.as_str())
            .collect();
        assert_eq!(written, vec!["x", "y", "z"]);

        let flags_of = |name: &str| {
            table
                .member_accesses()
                .iter()
                .find(|access| access.chain.matches(&ChainRoot::This, &["props", name]))
                .unwrap()
                .flags
        };
        assert_eq!(flags_of("a"), AccessFlags::WRITE);
        assert_eq!(flags_of("b"), AccessFlags::DELETE);
        assert_eq!(flags_of("c"), AccessFlags::empty());
    }

    #[test]
    fn test_is_mutated() {
        let source = "function f() { let a = 1; let b = 2; a = 3; return b; }";
        let table = build(source);
        let body = table.scope_at(offset(source, "return"));
        assert!(table.is_mutated(body, "a"));
        assert!(!table.is_mutated(body, "b"));
    }

    #[test]
    fn test_unresolved_references() {
        let table = build("const a = 1; function f(b) { return a + b + c; }");
        let free: Vec<&str> = table
            .unresolved_references()
            .map(|reference| reference.name.as_str())
            .collect();
        assert_eq!(free, vec!["c"]);
    }

    #[test]
    fn test_function_infos() {
        let source = "function f() { 'use strict'; const { a } = this.props; }\nconst g = () => 1;";
        let table = build(source);
        let functions = table.functions();
        assert_eq!(functions.len(), 2);

        let f = &functions[0];
        assert!(!f.is_arrow);
        assert_eq!(f.first_statement, Some(offset(source, "const {")));
        assert_eq!(f.destructures.len(), 1);
        let destructure = &f.destructures[0];
        assert!(destructure.has_key("a"));
        assert!(!destructure.has_rest);
        assert_eq!(
            destructure.init.as_ref().map(ToString::to_string).as_deref(),
            Some("this.props")
        );
        assert_eq!(
            destructure.last_property_end,
            Some(offset(source, "a }") + 1)
        );

        let g = &functions[1];
        assert!(g.is_arrow);
        assert!(g.expression_body);
        assert!(table.function(g.scope).is_some());
    }

    #[test]
    fn test_super_calls() {
        let source = "class A extends B { constructor(p) { super(p); if (p) { super(); } } m() { return 1; } }";
        let table = build(source);
        let functions = table.functions();
        assert_eq!(functions.len(), 2);

        let constructor = &functions[0];
        let statement = constructor.super_statement.unwrap();
        assert_eq!(statement.start, offset(source, "super(p)"));
        assert_eq!(statement.end, offset(source, " if (p)"));
        assert!(functions[1].super_statement.is_none());

        let calls = table.super_calls();
        assert_eq!(calls.len(), 2);
        assert!(constructor.in_super_statement(calls[0].span));
        assert!(!constructor.in_super_statement(calls[1].span));
        assert_eq!(table.enclosing_function(calls[1].scope).unwrap().scope, constructor.scope);
    }

    #[test]
    fn test_declarations_within() {
        let source = "function f() { { let x = 1; } function g() { var x; } }";
        let table = build(source);
        let f = table.functions()[0].scope;
        assert_eq!(table.declarations_within(f, "x").count(), 2);
        assert_eq!(table.declarations_within(ScopeId::ROOT, "f").count(), 1);
    }

    #[test]
    fn test_scope_tree_snapshot() {
        let table = build("function f(a) { if (a) { let b; } return () => a; }");
        let output = table
            .iter()
            .map(|scope| {
                let mut names: Vec<&str> = scope.bindings().map(|(name, _)| name).collect();
                names.sort_unstable();
                format!(
                    "{} {} parent={:?} [{}]",
                    scope.id.as_u32(),
                    scope.kind.display_name(),
                    scope.parent.map(ScopeId::as_u32),
                    names.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert_snapshot!(output, @r"
        0 mod parent=None [f]
        1 fn parent=Some(0) [a]
        2 block parent=Some(1) [b]
        3 arrow parent=Some(1) []
        ");
    }
}
