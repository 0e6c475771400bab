//! Reserved words.
//!
//! Property names may be any IdentifierName (`this.props.class` is legal),
//! but a binding may not. A name in this set is never turned into a local
//! binding by a codemod.

use phf::phf_set;

/// Keywords, future reserved words, strict-mode restricted names and the
/// literal names `true`, `false`, `null`.
pub static RESERVED_WORDS: phf::Set<&'static str> = phf_set! {
    // Keywords
    "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "export", "extends", "finally", "for", "function",
    "if", "import", "in", "instanceof", "new", "return", "super", "switch",
    "this", "throw", "try", "typeof", "var", "void", "while", "with",
    // Literals
    "true", "false", "null",
    // Future reserved (strict mode and legacy)
    "enum", "implements", "interface", "package", "private", "protected",
    "public", "static", "let", "yield", "await",
    "abstract", "boolean", "byte", "char", "double", "final", "float", "goto",
    "int", "long", "native", "short", "synchronized", "throws", "transient",
    "volatile",
    // Restricted as binding names in strict code
    "arguments", "eval",
};

/// Check whether `name` may not be used as a binding identifier.
#[inline]
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(name)
}
