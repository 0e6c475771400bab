//! Text edits.
//!
//! Codemods never mutate the syntax tree. They describe their rewrite as a
//! list of span-addressed edits, and the runner splices them into the source
//! in one forward pass.

use serde::Serialize;

/// A single text replacement in the source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    /// Start byte offset
    pub start: u32,
    /// End byte offset
    pub end: u32,
    /// Replacement text
    pub new_text: String,
}

impl TextEdit {
    /// Create a new text edit
    #[inline]
    pub fn new(start: u32, end: u32, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            new_text: new_text.into(),
        }
    }

    /// Create an insertion edit
    #[inline]
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self::new(offset, offset, text)
    }

    /// Create a deletion edit
    #[inline]
    pub fn delete(start: u32, end: u32) -> Self {
        Self::new(start, end, "")
    }

    /// Create a replacement edit
    #[inline]
    pub fn replace(start: u32, end: u32, text: impl Into<String>) -> Self {
        Self::new(start, end, text)
    }
}

/// Apply edits to `source`.
///
/// Edits are ordered by `(start, end)`, so an insertion at offset `n` lands
/// before a replacement that starts at `n`. Edits sharing identical bounds
/// keep their input order. An edit that overlaps an already applied one, or
/// that points outside the source or inside a UTF-8 sequence, is dropped.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    if edits.is_empty() {
        return source.to_string();
    }

    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| (edit.start, edit.end));

    let extra: usize = ordered.iter().map(|e| e.new_text.len()).sum();
    let mut output = String::with_capacity(source.len() + extra);
    let mut cursor = 0usize;

    for edit in ordered {
        let start = edit.start as usize;
        let end = edit.end as usize;

        if start < cursor
            || end < start
            || end > source.len()
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
        {
            tracing::warn!(
                start = edit.start,
                end = edit.end,
                "dropping overlapping or out-of-range edit"
            );
            continue;
        }

        output.push_str(&source[cursor..start]);
        output.push_str(&edit.new_text);
        cursor = end;
    }

    output.push_str(&source[cursor..]);
    output
}
