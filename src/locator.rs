//! Contains the logic for finding a target text within a paragraph's
//! logical string.
//!
//! Matching never happens against fragments directly: the caller builds a
//! [`FragmentIndex`](crate::index::FragmentIndex) and the locator resolves
//! logical hits back through it, so a match can straddle any number of
//! fragment boundaries.

use crate::error::RedlineError;
use crate::index::{FragmentIndex, MatchSpan};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// How target text is compared against the logical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Byte-for-byte comparison.
    Exact,
    /// Leading and trailing whitespace of the target is ignored.
    Trim,
    /// Runs of whitespace on both sides collapse to a single space before
    /// comparing; hits map back to original offsets.
    NormalizeWhitespace,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPolicy::Exact => "exact",
            MatchPolicy::Trim => "trim",
            MatchPolicy::NormalizeWhitespace => "normalize_whitespace",
        };
        f.write_str(name)
    }
}

/// A set of criteria controlling one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// `None` selects the default chain: exact first, then
    /// normalize_whitespace. The fallback order is contractual; silently
    /// normalizing first would change which occurrence wins.
    pub policy: Option<MatchPolicy>,
    pub match_case: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            policy: None,
            match_case: true,
        }
    }
}

/// A resolved match: where it is, which policy found it, and whether other
/// occurrences existed (first occurrence wins, but callers must be able to
/// audit the pick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub span: MatchSpan,
    pub policy: MatchPolicy,
    pub multiple_matches: bool,
}

/// Finds the first occurrence of `target` in the indexed paragraph.
///
/// Returns [`RedlineError::TargetNotFound`] when no policy in the effective
/// chain produces a hit; the caller is expected to continue with the next
/// paragraph.
pub fn locate(
    index: &FragmentIndex,
    target: &str,
    options: &MatchOptions,
) -> Result<Located, RedlineError> {
    for policy in policy_chain(options) {
        let hits = occurrences(index.logical_text(), target, policy, options.match_case);
        if let Some(first) = hits.first() {
            // A range produced from the index's own text always resolves.
            let span = index
                .resolve(first.clone())
                .ok_or(RedlineError::TargetNotFound)?;
            return Ok(Located {
                span,
                policy,
                multiple_matches: hits.len() > 1,
            });
        }
        log::debug!("no {policy} match for {target:?}");
    }
    Err(RedlineError::TargetNotFound)
}

/// Finds every occurrence of `target`, in scan order, under the first policy
/// of the effective chain that produces any hit.
pub fn locate_all(index: &FragmentIndex, target: &str, options: &MatchOptions) -> Vec<MatchSpan> {
    for policy in policy_chain(options) {
        let hits = occurrences(index.logical_text(), target, policy, options.match_case);
        if !hits.is_empty() {
            return hits
                .into_iter()
                .filter_map(|range| index.resolve(range))
                .collect();
        }
    }
    Vec::new()
}

fn policy_chain(options: &MatchOptions) -> Vec<MatchPolicy> {
    match options.policy {
        Some(policy) => vec![policy],
        None => vec![MatchPolicy::Exact, MatchPolicy::NormalizeWhitespace],
    }
}

/// Non-overlapping occurrences of the target in the logical text, as byte
/// ranges of the original text.
fn occurrences(
    logical_text: &str,
    target: &str,
    policy: MatchPolicy,
    match_case: bool,
) -> Vec<Range<usize>> {
    let needle = match policy {
        MatchPolicy::Exact => target.to_string(),
        MatchPolicy::Trim => target.trim().to_string(),
        MatchPolicy::NormalizeWhitespace => {
            target.split_whitespace().collect::<Vec<_>>().join(" ")
        }
    };
    let needle = if match_case {
        needle
    } else {
        needle.to_lowercase()
    };
    if needle.is_empty() {
        return Vec::new();
    }

    let collapse = matches!(policy, MatchPolicy::NormalizeWhitespace);
    if match_case && !collapse {
        return logical_text
            .match_indices(needle.as_str())
            .map(|(at, hit)| at..at + hit.len())
            .collect();
    }

    let view = NormalizedText::build(logical_text, collapse, !match_case);
    view.text
        .match_indices(needle.as_str())
        .map(|(at, hit)| view.source_range(at..at + hit.len()))
        .collect()
}

/// A transformed copy of the logical text that remembers, per transformed
/// byte, which source byte range it came from.
struct NormalizedText {
    text: String,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl NormalizedText {
    fn build(source: &str, collapse_whitespace: bool, fold_case: bool) -> Self {
        let mut text = String::new();
        let mut starts = Vec::new();
        let mut ends = Vec::new();

        let mut chars = source.char_indices().peekable();
        while let Some((at, ch)) = chars.next() {
            let mut char_end = at + ch.len_utf8();

            if collapse_whitespace && ch.is_whitespace() {
                while let Some(&(next_at, next_ch)) = chars.peek() {
                    if !next_ch.is_whitespace() {
                        break;
                    }
                    char_end = next_at + next_ch.len_utf8();
                    chars.next();
                }
                text.push(' ');
                starts.push(at);
                ends.push(char_end);
                continue;
            }

            let push_from = text.len();
            if fold_case {
                for folded in ch.to_lowercase() {
                    text.push(folded);
                }
            } else {
                text.push(ch);
            }
            for _ in push_from..text.len() {
                starts.push(at);
                ends.push(char_end);
            }
        }

        Self { text, starts, ends }
    }

    fn source_range(&self, view_range: Range<usize>) -> Range<usize> {
        self.starts[view_range.start]..self.ends[view_range.end - 1]
    }
}
