//! Flattens a paragraph into one logical string plus an offset map back to
//! fragment-local coordinates.
//!
//! An index is a pure snapshot of the paragraph it was built from. Any
//! mutation of the paragraph invalidates it; callers rebuild instead of
//! patching, since fragment boundaries move under edits.

use crate::document::{FragmentId, Paragraph};
use std::ops::Range;

/// A contiguous region of logical text expressed in fragment-local
/// coordinates. Offsets are byte offsets within the named fragment;
/// `end_offset` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start_fragment: FragmentId,
    pub start_offset: usize,
    pub end_fragment: FragmentId,
    pub end_offset: usize,
}

#[derive(Debug, Clone, Copy)]
struct IndexedFragment {
    id: FragmentId,
    start: usize,
    end: usize,
}

/// Logical text of one paragraph plus the mapping from logical offsets back
/// to the fragments the bytes came from.
#[derive(Debug)]
pub struct FragmentIndex {
    logical_text: String,
    fragments: Vec<IndexedFragment>,
}

impl FragmentIndex {
    /// Builds the index for a paragraph snapshot. Zero-length fragments are
    /// skipped so they can never anchor a match boundary.
    pub fn build(paragraph: &Paragraph) -> Self {
        let mut logical_text = String::new();
        let mut fragments = Vec::new();

        for fragment in paragraph.fragments() {
            if fragment.text.is_empty() {
                continue;
            }
            let start = logical_text.len();
            logical_text.push_str(&fragment.text);
            fragments.push(IndexedFragment {
                id: fragment.id(),
                start,
                end: logical_text.len(),
            });
        }

        Self {
            logical_text,
            fragments,
        }
    }

    pub fn logical_text(&self) -> &str {
        &self.logical_text
    }

    pub fn is_empty(&self) -> bool {
        self.logical_text.is_empty()
    }

    /// Converts a non-empty logical byte range into fragment-local
    /// coordinates.
    ///
    /// When an endpoint falls exactly on a fragment boundary, the start is
    /// attributed to the following fragment and the end to the preceding one,
    /// so the resulting span touches as few fragments as possible.
    pub fn resolve(&self, range: Range<usize>) -> Option<MatchSpan> {
        if range.start >= range.end || range.end > self.logical_text.len() {
            return None;
        }

        let start_ix = self.fragments.partition_point(|f| f.end <= range.start);
        let end_ix = self
            .fragments
            .partition_point(|f| f.start < range.end)
            .checked_sub(1)?;

        let start = self.fragments.get(start_ix)?;
        let end = self.fragments.get(end_ix)?;

        Some(MatchSpan {
            start_fragment: start.id,
            start_offset: range.start - start.start,
            end_fragment: end.id,
            end_offset: range.end - end.start,
        })
    }
}
