//! Print options.
//!
//! Codemods splice new text into otherwise untouched source, so these options
//! only govern the snippets a codemod synthesizes. Keys follow the recast
//! option names so existing codemod configs keep working.

use serde::{Deserialize, Serialize};

/// Printing options for synthesized code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
    /// Quote style for synthesized string literals (default: single)
    #[serde(default)]
    pub quote: Quote,

    /// Trailing comma after names merged into a multi-line destructuring
    /// pattern (default: true)
    #[serde(default = "default_true")]
    pub trailing_comma: bool,

    /// Comma-separate members of synthesized object types (default: true).
    /// Accepted for config compatibility; no built-in codemod prints types.
    #[serde(default = "default_true")]
    pub flow_object_commas: bool,

    /// Always parenthesize a sole arrow function parameter (default: true)
    #[serde(default = "default_true")]
    pub arrow_parens_always: bool,

    /// Spaces inside array brackets (default: false).
    /// Accepted for config compatibility; no built-in codemod prints arrays.
    #[serde(default)]
    pub array_bracket_spacing: bool,

    /// Spaces inside object braces and destructuring patterns (default: true)
    #[serde(default = "default_true")]
    pub object_curly_spacing: bool,

    /// Spaces per indentation level when the file gives no hint (default: 4)
    #[serde(default = "default_tab_width")]
    pub tab_width: u8,

    /// Indent with tabs (default: false)
    #[serde(default)]
    pub use_tabs: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            quote: Quote::default(),
            trailing_comma: true,
            flow_object_commas: true,
            arrow_parens_always: true,
            array_bracket_spacing: false,
            object_curly_spacing: true,
            tab_width: default_tab_width(),
            use_tabs: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tab_width() -> u8 {
    4
}

/// Quote style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quote {
    /// `'value'`
    #[default]
    Single,
    /// `"value"`
    Double,
}

impl Quote {
    /// The quote character
    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

impl PrintOptions {
    /// One level of indentation
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width as usize)
        }
    }

    /// Wrap comma-separated `items` in braces, honouring `object_curly_spacing`.
    ///
    /// An empty list always prints as `{}`.
    pub fn braced<S: AsRef<str>>(&self, items: &[S]) -> String {
        if items.is_empty() {
            return "{}".to_string();
        }
        let joined = items
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        if self.object_curly_spacing {
            format!("{{ {joined} }}")
        } else {
            format!("{{{joined}}}")
        }
    }

    /// Quote a string literal value using the configured quote style.
    pub fn quoted(&self, value: &str) -> String {
        let quote = self.quote.as_char();
        let mut out = String::with_capacity(value.len() + 2);
        out.push(quote);
        for ch in value.chars() {
            if ch == quote || ch == '\\' {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push(quote);
        out
    }
}
