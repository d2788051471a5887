//! Byte-range edit plans and their application to source text.
//!
//! Every recipe reduces its work to a list of [`TextEdit`]s against the
//! original source. Bytes outside the edited ranges are carried over
//! verbatim, so untouched formatting and comments survive any rewrite.

use crate::error::{MigrateError, Result};
use std::ops::Range;

/// A single replacement of a byte range with new text.
///
/// An insertion is an edit with an empty range; a deletion is an edit with
/// empty replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextEdit {
    /// Replaces the given byte range with new text.
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            text: text.into(),
        }
    }

    /// Inserts text at the given byte offset.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            text: text.into(),
        }
    }

    /// Deletes the given byte range.
    pub fn delete(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            text: String::new(),
        }
    }

    /// Returns true if this edit leaves the source unchanged.
    pub fn is_noop(&self, source: &str) -> bool {
        source.get(self.start..self.end) == Some(self.text.as_str())
    }
}

/// Applies a set of edits to the source, returning the rewritten text.
///
/// Edits are applied in reverse source order so earlier offsets stay valid.
/// No-op edits (replacement equal to the current text) are dropped before
/// application; a recipe whose every edit is a no-op therefore produces
/// output identical to its input. Overlapping edits indicate a planning bug
/// and are rejected rather than applied in some arbitrary order.
pub fn apply_edits(source: &str, edits: Vec<TextEdit>) -> Result<String> {
    let mut edits: Vec<TextEdit> = edits
        .into_iter()
        .filter(|e| !e.is_noop(source))
        .collect();
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    // Stable sort keeps multiple insertions at the same offset in plan order.
    edits.sort_by_key(|e| (e.start, e.end));
    for pair in edits.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(MigrateError::OverlappingEdits { at: pair[1].start });
        }
    }

    let mut result = source.to_string();
    for edit in edits.iter().rev() {
        result.replace_range(edit.start..edit.end, &edit.text);
    }
    Ok(result)
}
