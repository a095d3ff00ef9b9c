//! Drives one apply pass: each instruction is taken through
//! index -> match -> edit -> result, in list order, against the single
//! mutable document.
//!
//! Failures are local to one instruction. The pass never aborts early: a
//! caller auditing many instructions needs the complete per-change report,
//! not a stop-on-first-error pipeline.

use crate::document::Document;
use crate::error::RedlineError;
use crate::index::FragmentIndex;
use crate::locator::{self, MatchOptions};
use crate::report::{ChangeDetails, ChangeResult};
use crate::splicer::{self, InsertSide};
use crate::transaction::{ChangeInstruction, Operation};

/// Applies every instruction in order and returns one result per
/// instruction, in the same order.
pub fn apply_changes(
    document: &mut Document,
    instructions: &[ChangeInstruction],
) -> Vec<ChangeResult> {
    instructions
        .iter()
        .map(|instruction| {
            log::debug!(
                "{}: {} targeting {:?}",
                instruction.change_id,
                instruction.operation,
                instruction.target_text
            );
            let result = apply_change(document, instruction);
            if !result.is_success() {
                log::warn!(
                    "{}: {} failed: {}",
                    instruction.change_id,
                    instruction.operation,
                    result
                        .details
                        .message
                        .as_deref()
                        .unwrap_or("unknown failure")
                );
            }
            result
        })
        .collect()
}

/// Runs one instruction to completion, turning any failure into a structured
/// result.
pub fn apply_change(document: &mut Document, instruction: &ChangeInstruction) -> ChangeResult {
    match run_instruction(document, instruction) {
        Ok(details) => ChangeResult::success(instruction, details),
        Err(error) => ChangeResult::failure(instruction, &error),
    }
}

#[derive(Clone, Copy)]
enum SpanEdit<'a> {
    Replace(&'a str),
    Delete,
    Insert(InsertSide, &'a str),
}

fn run_instruction(
    document: &mut Document,
    instruction: &ChangeInstruction,
) -> Result<ChangeDetails, RedlineError> {
    let options = MatchOptions {
        policy: instruction.match_policy,
        match_case: instruction.match_case,
    };

    if instruction.replace_all
        && !matches!(instruction.operation, Operation::Replace | Operation::Delete)
    {
        return Err(RedlineError::ReplaceAllUnsupported(instruction.operation));
    }

    match instruction.operation {
        Operation::Replace => {
            let text = require_new_text(instruction)?;
            if instruction.replace_all {
                edit_everywhere(document, instruction, &options, Some(text))
            } else {
                edit_first_match(document, instruction, &options, SpanEdit::Replace(text))
            }
        }
        Operation::Delete => {
            if instruction.replace_all {
                edit_everywhere(document, instruction, &options, None)
            } else {
                edit_first_match(document, instruction, &options, SpanEdit::Delete)
            }
        }
        Operation::InsertBefore => {
            let text = require_new_text(instruction)?;
            edit_first_match(
                document,
                instruction,
                &options,
                SpanEdit::Insert(InsertSide::Before, text),
            )
        }
        Operation::InsertAfter => {
            let text = require_new_text(instruction)?;
            edit_first_match(
                document,
                instruction,
                &options,
                SpanEdit::Insert(InsertSide::After, text),
            )
        }
        Operation::InsertParagraph => {
            let text = require_new_text(instruction)?;
            let (anchor, multiple_matches) = find_anchor(document, instruction, &options)?;
            splicer::insert_paragraph_after(document, anchor, text)?;
            Ok(ChangeDetails {
                paragraph_index: Some(anchor + 1),
                multiple_matches,
                ..ChangeDetails::default()
            })
        }
        Operation::DeleteParagraph => {
            let (anchor, multiple_matches) = find_anchor(document, instruction, &options)?;
            splicer::remove_paragraph(document, anchor)?;
            Ok(ChangeDetails {
                paragraph_index: Some(anchor),
                multiple_matches,
                ..ChangeDetails::default()
            })
        }
    }
}

fn require_new_text(instruction: &ChangeInstruction) -> Result<&str, RedlineError> {
    instruction
        .payload
        .new_text
        .as_deref()
        .ok_or(RedlineError::MissingNewText(instruction.operation))
}

/// Scans paragraphs in document order and applies the edit to the first one
/// containing the target. The paragraph's index is rebuilt from scratch on
/// every visit; nothing from a previous instruction's pass is reused.
fn edit_first_match(
    document: &mut Document,
    instruction: &ChangeInstruction,
    options: &MatchOptions,
    edit: SpanEdit<'_>,
) -> Result<ChangeDetails, RedlineError> {
    for paragraph_index in 0..document.len() {
        let index = FragmentIndex::build(&document.paragraphs()[paragraph_index]);
        let located = match locator::locate(&index, &instruction.target_text, options) {
            Ok(located) => located,
            Err(RedlineError::TargetNotFound) => continue,
            Err(other) => return Err(other),
        };

        if located.multiple_matches {
            log::warn!(
                "{}: target matched more than once in paragraph {}; \
                 the first occurrence by scan order was edited",
                instruction.change_id,
                paragraph_index
            );
        }

        let paragraph = &mut document.paragraphs_mut()[paragraph_index];
        match edit {
            SpanEdit::Replace(text) => splicer::replace_span(paragraph, &located.span, text)?,
            SpanEdit::Delete => splicer::delete_span(paragraph, &located.span)?,
            SpanEdit::Insert(side, text) => {
                splicer::insert_adjacent(paragraph, &located.span, side, text)?;
            }
        }
        splicer::compact(paragraph);

        return Ok(ChangeDetails {
            paragraph_index: Some(paragraph_index),
            multiple_matches: located.multiple_matches,
            ..ChangeDetails::default()
        });
    }

    Err(RedlineError::TargetNotFound)
}

/// Rewrites every occurrence in every paragraph. Within one paragraph the
/// spans are applied back to front, so the remaining coordinates stay valid
/// without rebuilding the index between edits.
fn edit_everywhere(
    document: &mut Document,
    instruction: &ChangeInstruction,
    options: &MatchOptions,
    replacement: Option<&str>,
) -> Result<ChangeDetails, RedlineError> {
    let mut replacements = 0;
    let mut affected_paragraphs = Vec::new();

    for paragraph_index in 0..document.len() {
        let index = FragmentIndex::build(&document.paragraphs()[paragraph_index]);
        let spans = locator::locate_all(&index, &instruction.target_text, options);
        if spans.is_empty() {
            continue;
        }

        let paragraph = &mut document.paragraphs_mut()[paragraph_index];
        for span in spans.iter().rev() {
            match replacement {
                Some(text) => splicer::replace_span(paragraph, span, text)?,
                None => splicer::delete_span(paragraph, span)?,
            }
        }
        splicer::compact(paragraph);

        replacements += spans.len();
        affected_paragraphs.push(paragraph_index);
    }

    if replacements == 0 {
        return Err(RedlineError::TargetNotFound);
    }

    Ok(ChangeDetails {
        replacements: Some(replacements),
        affected_paragraphs,
        ..ChangeDetails::default()
    })
}

/// Finds the first paragraph containing the target, for paragraph-level
/// operations.
fn find_anchor(
    document: &Document,
    instruction: &ChangeInstruction,
    options: &MatchOptions,
) -> Result<(usize, bool), RedlineError> {
    for (paragraph_index, paragraph) in document.paragraphs().iter().enumerate() {
        let index = FragmentIndex::build(paragraph);
        match locator::locate(&index, &instruction.target_text, options) {
            Ok(located) => return Ok((paragraph_index, located.multiple_matches)),
            Err(RedlineError::TargetNotFound) => continue,
            Err(other) => return Err(other),
        }
    }
    Err(RedlineError::TargetNotFound)
}
