//! Codemod registry.

use crate::codemod::Codemod;
use crate::codemods::{BindExpression, FunctionToArrow, PropsToDestructuring, PureToComposite};
use crate::error::CodemodError;

/// Registry holding the available codemods
pub struct CodemodRegistry {
    codemods: Vec<Box<dyn Codemod>>,
}

impl CodemodRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            codemods: Vec::new(),
        }
    }

    /// Register a codemod
    pub fn register(&mut self, codemod: Box<dyn Codemod>) {
        self.codemods.push(codemod);
    }

    /// Create a registry with every built-in codemod.
    ///
    /// Registration order is the default run order: a component has to become
    /// a class before its `props` reads turn into `this.props`, and those have
    /// to exist before they can be destructured.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PureToComposite));
        registry.register(Box::new(FunctionToArrow));
        registry.register(Box::new(PropsToDestructuring));
        registry.register(Box::new(BindExpression));
        registry
    }

    /// Get all registered codemods in registration order
    pub fn codemods(&self) -> &[Box<dyn Codemod>] {
        &self.codemods
    }

    /// Look up a codemod by name
    pub fn get(&self, name: &str) -> Option<&dyn Codemod> {
        self.codemods
            .iter()
            .find(|codemod| codemod.meta().name == name)
            .map(|codemod| &**codemod)
    }

    /// Codemods in run order: those with `module_api_change` first, then the
    /// rest, each group in registration order.
    ///
    /// An empty `names` selects every codemod.
    pub fn ordered(&self, names: &[String]) -> Result<Vec<&dyn Codemod>, CodemodError> {
        if let Some(unknown) = names.iter().find(|name| self.get(name).is_none()) {
            return Err(CodemodError::UnknownCodemod(unknown.clone()));
        }

        let selected = |codemod: &&Box<dyn Codemod>| {
            names.is_empty() || names.iter().any(|name| name == codemod.meta().name)
        };
        let (dependencies, rest): (Vec<_>, Vec<_>) = self
            .codemods
            .iter()
            .filter(selected)
            .partition(|codemod| codemod.meta().module_api_change);

        Ok(dependencies
            .into_iter()
            .chain(rest)
            .map(|codemod| &**codemod)
            .collect())
    }
}

impl Default for CodemodRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
