//! Line and indentation helpers over raw source text.

use memchr::{memchr_iter, memrchr};

/// Byte offset of the start of the line containing `offset`.
#[inline]
pub fn line_start(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    memrchr(b'\n', &source.as_bytes()[..offset]).map_or(0, |pos| pos + 1)
}

/// Leading whitespace of the line containing `offset`.
pub fn line_indent(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let rest = &source[start..];
    let len = rest
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    &rest[..len]
}

/// Whether `offset` is only preceded by whitespace on its line.
pub fn starts_line(source: &str, offset: usize) -> bool {
    let start = line_start(source, offset);
    source[start..offset.min(source.len())]
        .bytes()
        .all(|b| b == b' ' || b == b'\t')
}

/// Whether `source[start..end]` spans more than one line.
#[inline]
pub fn is_multiline(source: &str, start: usize, end: usize) -> bool {
    let end = end.min(source.len());
    start < end && memchr::memchr(b'\n', &source.as_bytes()[start..end]).is_some()
}

/// Offsets of every line start strictly inside `start..end`.
///
/// Lines that are empty or whitespace-only are left out, so re-indenting never
/// leaves trailing whitespace behind.
pub fn line_starts_within(source: &str, start: usize, end: usize) -> Vec<usize> {
    let end = end.min(source.len());
    if start >= end {
        return Vec::new();
    }
    let bytes = source.as_bytes();
    memchr_iter(b'\n', &bytes[start..end])
        .map(|pos| start + pos + 1)
        .filter(|&line| {
            line < end
                && bytes[line..end]
                    .iter()
                    .take_while(|b| **b != b'\n')
                    .any(|b| !b.is_ascii_whitespace())
        })
        .collect()
}

/// The indentation step between two lines, if the inner one is deeper.
///
/// Returns the suffix of `inner` beyond `outer`, e.g. `"  "` for
/// `outer = "  "` and `inner = "    "`.
pub fn indent_step<'s>(outer: &str, inner: &'s str) -> Option<&'s str> {
    inner
        .strip_prefix(outer)
        .filter(|step| !step.is_empty())
}
