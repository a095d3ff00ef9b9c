//! Aggregates per-instruction outcomes into the run summary handed to the
//! report consumer.

use crate::error::RedlineError;
use crate::transaction::{ChangeInstruction, Operation};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    Success,
    Failure,
}

/// Why an instruction failed. `NOT_FOUND` is recoverable by the caller;
/// `STRUCTURAL_ERROR` indicates an invariant violation and is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    StructuralError,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Paragraph the edit landed in, for single-span edits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_index: Option<usize>,
    /// The target occurred more than once; the first occurrence was used.
    pub multiple_matches: bool,
    /// Occurrences rewritten by a `replace_all` instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacements: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_paragraphs: Vec<usize>,
}

/// The immutable outcome of one instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeResult {
    pub change_id: String,
    pub operation: Operation,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub status: ChangeStatus,
    pub details: ChangeDetails,
}

impl ChangeResult {
    pub fn success(instruction: &ChangeInstruction, details: ChangeDetails) -> Self {
        Self {
            change_id: instruction.change_id.clone(),
            operation: instruction.operation,
            description: instruction.description.clone(),
            status: ChangeStatus::Success,
            details,
        }
    }

    pub fn failure(instruction: &ChangeInstruction, error: &RedlineError) -> Self {
        let kind = match error {
            RedlineError::TargetNotFound => ErrorKind::NotFound,
            _ => ErrorKind::StructuralError,
        };
        Self {
            change_id: instruction.change_id.clone(),
            operation: instruction.operation,
            description: instruction.description.clone(),
            status: ChangeStatus::Failure,
            details: ChangeDetails {
                error: Some(kind),
                message: Some(error.to_string()),
                ..ChangeDetails::default()
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ChangeStatus::Success
    }
}

/// Overall pass status. The applicator resolves every instruction to either
/// SUCCESS or FAILURE, so a finished pass is always COMPLETED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub status: RunStatus,
    pub total_changes: usize,
    pub successful: usize,
    pub failed: usize,
    pub changes: Vec<ChangeResult>,
}

/// Folds the ordered results into the summary. Pure aggregation: the results
/// keep their input order and every change_id appears exactly once.
pub fn finalize(changes: Vec<ChangeResult>) -> Summary {
    let successful = changes.iter().filter(|c| c.is_success()).count();
    Summary {
        status: RunStatus::Completed,
        total_changes: changes.len(),
        successful,
        failed: changes.len() - successful,
        changes,
    }
}
