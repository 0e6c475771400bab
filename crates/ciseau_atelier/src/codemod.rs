//! The codemod contract.
//!
//! A codemod receives the source text, the parsed program and the caller's
//! options, and answers with the text edits it wants applied. It never
//! mutates the tree and never sees another file.

use std::fmt;

use ciseau_carton::{is_reserved_word, FxHashMap, PrintOptions, TextEdit};
use ciseau_croquis::{ChainRoot, MemberChain};
use oxc_ast::ast::Program;
use oxc_span::SourceType;
use serde::{Deserialize, Serialize};

/// Codemod metadata
#[derive(Debug)]
pub struct CodemodMeta {
    /// Codemod name (e.g., "props-to-destructuring")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Path filters restricting where the codemod applies (empty = everywhere).
    ///
    /// Entries are glob patterns, directory prefixes (`"src/legacy/"`) or file
    /// names (`"App.js"`).
    pub paths: &'static [&'static str],
    /// The codemod changes the shape other codemods consume, so it runs
    /// before codemods that do not.
    pub module_api_change: bool,
}

/// Codemod trait
///
/// Implementations are stateless; everything a run needs comes in through
/// the [`CodemodContext`].
pub trait Codemod: Send + Sync {
    /// Get codemod metadata
    fn meta(&self) -> &'static CodemodMeta;

    /// Compute the edits for one file.
    ///
    /// Returning no edits leaves the file byte-identical.
    fn transform(&self, ctx: &CodemodContext<'_, '_>) -> Vec<TextEdit>;
}

/// Everything a codemod gets to look at
pub struct CodemodContext<'a, 'ctx> {
    /// Raw source text
    pub source: &'ctx str,
    /// Parsed program
    pub program: &'ctx Program<'a>,
    /// How the source was parsed
    pub source_type: SourceType,
    /// Caller options
    pub options: &'ctx TransformOptions,
}

impl<'a, 'ctx> CodemodContext<'a, 'ctx> {
    /// Create a new context
    pub fn new(
        source: &'ctx str,
        program: &'ctx Program<'a>,
        source_type: SourceType,
        options: &'ctx TransformOptions,
    ) -> Self {
        Self {
            source,
            program,
            source_type,
            options,
        }
    }

    /// Print options for synthesized code
    #[inline]
    pub fn print_options(&self) -> &'ctx PrintOptions {
        &self.options.print_options
    }
}

/// Options shared by every codemod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOptions {
    /// Printing options for synthesized code
    #[serde(default)]
    pub print_options: PrintOptions,

    /// The expression whose `props` member is destructured (default: `this`)
    #[serde(default)]
    pub self_reference: SelfReference,

    /// Base class for generated class components (default: "Component")
    #[serde(default = "default_component_base_class")]
    pub component_base_class: String,

    /// Module the base class is imported from when missing (default: "react")
    #[serde(default = "default_component_module")]
    pub component_module: String,

    /// Per-codemod path filters, replacing the codemod's own
    #[serde(default)]
    pub paths: FxHashMap<String, Vec<String>>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            print_options: PrintOptions::default(),
            self_reference: SelfReference::default(),
            component_base_class: default_component_base_class(),
            component_module: default_component_module(),
            paths: FxHashMap::default(),
        }
    }
}

fn default_component_base_class() -> String {
    "Component".to_string()
}

fn default_component_module() -> String {
    "react".to_string()
}

impl TransformOptions {
    /// Path filters for a codemod, honouring overrides
    pub fn paths_for(&self, codemod: &dyn Codemod) -> Vec<String> {
        let meta = codemod.meta();
        match self.paths.get(meta.name) {
            Some(paths) => paths.clone(),
            None => meta.paths.iter().map(|path| path.to_string()).collect(),
        }
    }
}

/// What `<self>` means in `<self>.props.<name>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SelfReference {
    /// `this.props`
    #[default]
    This,
    /// `<identifier>.props`, e.g. `self.props`
    Identifier(String),
}

impl SelfReference {
    /// The source text of the reference
    pub fn as_str(&self) -> &str {
        match self {
            Self::This => "this",
            Self::Identifier(name) => name,
        }
    }

    /// The chain root a member access must start with
    pub fn chain_root(&self) -> ChainRoot {
        match self {
            Self::This => ChainRoot::This,
            Self::Identifier(name) => ChainRoot::Identifier(name.as_str().into()),
        }
    }

    /// `<self>.props`
    pub fn props_chain(&self) -> MemberChain {
        MemberChain::new(self.chain_root(), &["props"])
    }
}

impl TryFrom<String> for SelfReference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "this" {
            return Ok(Self::This);
        }
        if !is_identifier(&value) || is_reserved_word(&value) {
            return Err(format!("`{value}` is not a valid self reference"));
        }
        Ok(Self::Identifier(value))
    }
}

impl From<SelfReference> for String {
    fn from(value: SelfReference) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SelfReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `name` is a plain ASCII JavaScript identifier
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
