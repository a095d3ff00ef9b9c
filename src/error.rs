//! Defines custom error types for the change engine.

use crate::document::FragmentId;
use crate::transaction::Operation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedlineError {
    #[error("Target text was not found in any paragraph of the document")]
    TargetNotFound,

    #[error("Fragment {0} is no longer present in the paragraph; rebuild the index before retrying")]
    StaleFragment(FragmentId),

    #[error("Offset {offset} is not a valid boundary in fragment {fragment} ({len} bytes)")]
    InvalidOffset {
        fragment: FragmentId,
        offset: usize,
        len: usize,
    },

    #[error("Span start lies after its end")]
    SpanOutOfOrder,

    #[error("The {0} operation requires payload.new_text")]
    MissingNewText(Operation),

    #[error("replace_all is not supported for the {0} operation")]
    ReplaceAllUnsupported(Operation),

    #[error("Paragraph index {0} is out of bounds")]
    ParagraphOutOfBounds(usize),

    #[error("Cannot read both the source document and the changes from stdin.")]
    AmbiguousStdinSource,

    #[error("Reading the document from stdin requires --output, since stdout carries the report.")]
    MissingOutputSink,
}
