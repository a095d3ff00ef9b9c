//! Core library for redline, an engine that applies structured change
//! instructions to rich-text documents whose paragraphs are split into
//! formatting-carrying fragments.
//!
//! The hard part is that a target text rarely aligns with fragment
//! boundaries. The engine flattens each paragraph into a logical string with
//! an offset map back to its fragments, locates the target under a matching
//! policy, rewrites the spanned fragments in place, and reports an auditable
//! per-change outcome.
//!
//! ```rust
//! use redline::document::{Document, Paragraph};
//! use redline::transaction::{ChangeInstruction, Operation, Payload};
//!
//! let mut document = Document::new(vec![Paragraph::from_texts([
//!     "Chapter ", "1. DEFIN", "ITIONS",
//! ])]);
//!
//! let instruction = ChangeInstruction {
//!     change_id: "CHG-001".to_string(),
//!     operation: Operation::Replace,
//!     target_text: "1. DEFINITIONS".to_string(),
//!     payload: Payload {
//!         new_text: Some("1. TERMS".to_string()),
//!     },
//!     ..ChangeInstruction::default()
//! };
//!
//! let summary = redline::apply_to_document(&mut document, &[instruction]);
//! assert_eq!(summary.successful, 1);
//! assert_eq!(document.to_plain_text(), "Chapter 1. TERMS");
//! ```

pub mod applicator;
pub mod cli;
pub mod document;
pub mod error;
pub mod index;
pub mod locator;
pub mod report;
pub mod splicer;
pub mod transaction;

use crate::cli::{ApplyArgs, Cli, Command, FindArgs, InspectArgs};
use crate::document::Document;
use crate::error::RedlineError;
use crate::index::FragmentIndex;
use crate::locator::MatchOptions;
use crate::report::Summary;
use crate::transaction::ChangeInstruction;
use anyhow::{anyhow, Context};
use clap::Parser;
use similar::TextDiff;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

enum OutputMode {
    Write,
    DryRun,
    Diff,
}

/// Applies the instructions in order and folds the per-change results into
/// the run summary.
pub fn apply_to_document(document: &mut Document, instructions: &[ChangeInstruction]) -> Summary {
    report::finalize(applicator::apply_changes(document, instructions))
}

/// The main entry point for the application logic.
pub fn run() -> anyhow::Result<()> {
    // Configured through the RUST_LOG environment variable.
    env_logger::init();

    let Cli {
        file,
        output,
        command,
    } = Cli::parse();

    // Reject ambiguous stdin usage before any I/O.
    if let Command::Apply(args) = &command {
        let changes_from_stdin = args
            .changes_file
            .as_deref()
            .is_some_and(|p| p.to_string_lossy() == "-");
        if file.is_none() && changes_from_stdin {
            return Err(RedlineError::AmbiguousStdinSource.into());
        }
    }

    let input_content = if let Some(file_path) = &file {
        fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read input file: {}", file_path.display()))?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let mut document =
        Document::from_json(&input_content).context("Failed to parse input document as JSON")?;

    match command {
        Command::Find(args) => process_find(&document, args),
        Command::Inspect(args) => process_inspect(&document, args),
        Command::Apply(args) => process_apply(&mut document, &file, &output, args),
    }
}

fn process_apply(
    document: &mut Document,
    file: &Option<PathBuf>,
    output: &Option<PathBuf>,
    args: ApplyArgs,
) -> anyhow::Result<()> {
    let ApplyArgs {
        changes_file,
        changes,
        report: report_path,
        dry_run,
        diff,
    } = args;

    let changes_data = match (changes_file, changes) {
        (Some(path), None) => {
            if path.to_string_lossy() == "-" {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read changes file: {}", path.display()))?
            }
        }
        (None, Some(inline)) => inline,
        (Some(_), Some(_)) => unreachable!("clap's conflicts_with should prevent this"),
        (None, None) => {
            return Err(anyhow!(
                "Either --changes-file or --changes must be provided."
            ));
        }
    };

    // serde_yaml accepts JSON as a YAML subset, so one parse covers both.
    let instructions: Vec<ChangeInstruction> = serde_yaml::from_str(&changes_data)
        .context("Failed to parse changes data as JSON or YAML")?;

    let before = document.to_plain_text();
    let summary = apply_to_document(document, &instructions);

    let summary_json = serde_json::to_string_pretty(&summary)?;
    if let Some(path) = &report_path {
        fs::write(path, format!("{summary_json}\n"))
            .with_context(|| format!("Failed to write report file: {}", path.display()))?;
    }

    let mode = if diff {
        OutputMode::Diff
    } else if dry_run {
        OutputMode::DryRun
    } else {
        OutputMode::Write
    };

    match mode {
        OutputMode::Diff => {
            let diff_output = TextDiff::from_lines(&before, &document.to_plain_text())
                .unified_diff()
                .header("original", "modified")
                .to_string();
            io::stdout().write_all(diff_output.as_bytes())?;
            Ok(())
        }
        OutputMode::DryRun => {
            println!("{summary_json}");
            Ok(())
        }
        OutputMode::Write => {
            let document_json = document.to_json()?;
            write_document(&document_json, file, output)?;
            println!("{summary_json}");
            Ok(())
        }
    }
}

fn write_document(
    content: &str,
    file: &Option<PathBuf>,
    output: &Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }

    if let Some(output_path) = output {
        fs::write(output_path, content).with_context(|| {
            format!("Failed to write to output file: {}", output_path.display())
        })?;
    } else if let Some(file_path) = file {
        // In-place modification: write to a temporary file in the same
        // directory, then atomically replace the original.
        let parent_dir = file_path.parent().ok_or_else(|| {
            anyhow!(
                "Could not determine parent directory of {}",
                file_path.display()
            )
        })?;

        let mut temp_file = tempfile::Builder::new()
            .prefix(".redline-")
            .suffix(".tmp")
            .tempfile_in(parent_dir)
            .with_context(|| {
                format!(
                    "Failed to create temporary file in {}",
                    parent_dir.display()
                )
            })?;

        temp_file
            .write_all(content.as_bytes())
            .context("Failed to write to temporary file")?;

        temp_file
            .persist(file_path)
            .with_context(|| format!("Failed to replace original file {}", file_path.display()))?;
    } else {
        return Err(RedlineError::MissingOutputSink.into());
    }

    Ok(())
}

fn process_find(document: &Document, args: FindArgs) -> anyhow::Result<()> {
    let FindArgs {
        target,
        policy,
        ignore_case,
    } = args;

    let options = MatchOptions {
        policy: policy.map(Into::into),
        match_case: !ignore_case,
    };

    let mut stdout = io::stdout().lock();
    let mut hits = 0usize;
    for (paragraph_index, paragraph) in document.paragraphs().iter().enumerate() {
        let index = FragmentIndex::build(paragraph);
        match locator::locate(&index, &target, &options) {
            Ok(located) => {
                hits += 1;
                let span = located.span;
                writeln!(
                    stdout,
                    "paragraph {paragraph_index}: fragment {}+{} .. fragment {}+{} (policy: {}{})",
                    span.start_fragment,
                    span.start_offset,
                    span.end_fragment,
                    span.end_offset,
                    located.policy,
                    if located.multiple_matches {
                        ", multiple matches"
                    } else {
                        ""
                    }
                )?;
            }
            Err(RedlineError::TargetNotFound) => continue,
            Err(other) => return Err(other.into()),
        }
    }

    if hits == 0 {
        writeln!(stdout, "Target text was not found in any paragraph")?;
    }
    stdout.flush()?;
    Ok(())
}

fn process_inspect(document: &Document, args: InspectArgs) -> anyhow::Result<()> {
    if let Some(only) = args.paragraph {
        if only >= document.len() {
            return Err(RedlineError::ParagraphOutOfBounds(only).into());
        }
    }

    let mut stdout = io::stdout().lock();
    for (paragraph_index, paragraph) in document.paragraphs().iter().enumerate() {
        if let Some(only) = args.paragraph {
            if paragraph_index != only {
                continue;
            }
        }

        let text = paragraph.logical_text();
        writeln!(
            stdout,
            "paragraph {paragraph_index}: {} fragment(s), {} byte(s)",
            paragraph.fragments().len(),
            text.len()
        )?;
        writeln!(stdout, "  text: {}", preview(&text))?;
        for (position, fragment) in paragraph.fragments().iter().enumerate() {
            writeln!(
                stdout,
                "  [{position}] {} ({} bytes): {}",
                fragment.id(),
                fragment.text.len(),
                preview(&fragment.text)
            )?;
        }
    }
    stdout.flush()?;
    Ok(())
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 60;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_CHARS).collect();
        format!("{cut}...")
    }
}
