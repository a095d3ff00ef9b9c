//! Contains the logic for mutating fragments and paragraphs in place.
//!
//! Every function validates the full set of coordinates it was handed before
//! touching the paragraph, so a failure leaves the document exactly as it
//! was. After a successful call the caller must treat any previously built
//! [`FragmentIndex`](crate::index::FragmentIndex) for that paragraph as
//! stale.

use crate::document::{Document, FragmentId, Paragraph};
use crate::error::RedlineError;
use crate::index::MatchSpan;

/// Which side of a matched span an inserted fragment lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSide {
    Before,
    After,
}

struct ResolvedSpan {
    start_pos: usize,
    start_offset: usize,
    end_pos: usize,
    end_offset: usize,
}

fn checked_offset(
    paragraph: &Paragraph,
    position: usize,
    id: FragmentId,
    offset: usize,
) -> Result<(), RedlineError> {
    let text = &paragraph.fragments()[position].text;
    if offset > text.len() || !text.is_char_boundary(offset) {
        return Err(RedlineError::InvalidOffset {
            fragment: id,
            offset,
            len: text.len(),
        });
    }
    Ok(())
}

fn resolve_span(paragraph: &Paragraph, span: &MatchSpan) -> Result<ResolvedSpan, RedlineError> {
    let start_pos = paragraph
        .fragment_position(span.start_fragment)
        .ok_or(RedlineError::StaleFragment(span.start_fragment))?;
    let end_pos = paragraph
        .fragment_position(span.end_fragment)
        .ok_or(RedlineError::StaleFragment(span.end_fragment))?;

    if start_pos > end_pos || (start_pos == end_pos && span.start_offset > span.end_offset) {
        return Err(RedlineError::SpanOutOfOrder);
    }

    checked_offset(paragraph, start_pos, span.start_fragment, span.start_offset)?;
    checked_offset(paragraph, end_pos, span.end_fragment, span.end_offset)?;

    Ok(ResolvedSpan {
        start_pos,
        start_offset: span.start_offset,
        end_pos,
        end_offset: span.end_offset,
    })
}

/// Rewrites the fragments covered by `span` so their concatenation becomes
/// `prefix + new_text + suffix`, where prefix and suffix are the portions of
/// the boundary fragments outside the match.
///
/// The replacement text lands in the first fragment of the span and thereby
/// inherits its formatting; the kept suffix stays in the last fragment with
/// its own formatting. Fragments fully consumed by the span are emptied, not
/// removed; see [`compact`].
pub fn replace_span(
    paragraph: &mut Paragraph,
    span: &MatchSpan,
    new_text: &str,
) -> Result<(), RedlineError> {
    let at = resolve_span(paragraph, span)?;
    let fragments = paragraph.fragments_mut();

    if at.start_pos == at.end_pos {
        fragments[at.start_pos]
            .text
            .replace_range(at.start_offset..at.end_offset, new_text);
        return Ok(());
    }

    fragments[at.end_pos].text.replace_range(..at.end_offset, "");
    for fragment in &mut fragments[at.start_pos + 1..at.end_pos] {
        fragment.text.clear();
    }
    fragments[at.start_pos]
        .text
        .replace_range(at.start_offset.., new_text);

    Ok(())
}

/// Removes the matched text, keeping the boundary fragments' prefix and
/// suffix in place.
pub fn delete_span(paragraph: &mut Paragraph, span: &MatchSpan) -> Result<(), RedlineError> {
    replace_span(paragraph, span, "")
}

/// Creates a new fragment next to the span, inheriting the formatting of the
/// fragment it sits beside. The existing fragments are not altered.
pub fn insert_adjacent(
    paragraph: &mut Paragraph,
    span: &MatchSpan,
    side: InsertSide,
    text: &str,
) -> Result<FragmentId, RedlineError> {
    let at = resolve_span(paragraph, span)?;
    let (position, format) = match side {
        InsertSide::Before => (at.start_pos, paragraph.fragments()[at.start_pos].format.clone()),
        InsertSide::After => (at.end_pos + 1, paragraph.fragments()[at.end_pos].format.clone()),
    };
    Ok(paragraph.insert_fragment(position, text, format))
}

/// The explicit tidy-up step: drops fragments an edit has emptied. Returns
/// how many were removed.
pub fn compact(paragraph: &mut Paragraph) -> usize {
    paragraph.retain_non_empty()
}

/// Inserts a new single-fragment paragraph directly after `index`, inheriting
/// the anchor paragraph's leading fragment format.
pub fn insert_paragraph_after(
    document: &mut Document,
    index: usize,
    text: &str,
) -> Result<(), RedlineError> {
    let anchor = document
        .paragraph(index)
        .ok_or(RedlineError::ParagraphOutOfBounds(index))?;
    let format = anchor
        .fragments()
        .first()
        .map(|fragment| fragment.format.clone())
        .unwrap_or_default();

    let paragraph = Paragraph::from_parts([(text, format)]);
    document.paragraphs_mut().insert(index + 1, paragraph);
    Ok(())
}

/// Removes and returns the paragraph at `index`.
pub fn remove_paragraph(document: &mut Document, index: usize) -> Result<Paragraph, RedlineError> {
    if index >= document.len() {
        return Err(RedlineError::ParagraphOutOfBounds(index));
    }
    Ok(document.paragraphs_mut().remove(index))
}
