//! Defines the command-line interface for the application.

use crate::locator::MatchPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "redline",
    version,
    about = "Apply structured change instructions to run-fragmented rich-text documents."
)]
pub struct Cli {
    /// The document to operate on (JSON). [default: reads from stdin]
    #[arg(short, long, global = true, value_name = "DOC_PATH")]
    pub file: Option<PathBuf>,

    /// Write the modified document to a new file instead of modifying the original.
    #[arg(short, long, global = true, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply an ordered list of change instructions to the document.
    Apply(ApplyArgs),
    /// Locate target text without modifying the document.
    Find(FindArgs),
    /// Print paragraphs with their fragment boundaries.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// A file containing the change instructions (JSON or YAML). Use '-' to
    /// read from stdin.
    #[arg(long, value_name = "CHANGES_PATH", conflicts_with = "changes")]
    pub changes_file: Option<PathBuf>,

    /// Inline change instructions (JSON or YAML).
    #[arg(
        long,
        value_name = "CHANGES",
        conflicts_with = "changes_file",
        allow_hyphen_values = true
    )]
    pub changes: Option<String>,

    /// Also write the summary report to this path.
    #[arg(long, value_name = "REPORT_PATH")]
    pub report: Option<PathBuf>,

    /// Apply in memory and print the report, but write nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Print a unified diff of the document's plain text instead of writing.
    #[arg(long, conflicts_with = "dry_run")]
    pub diff: bool,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    /// The text to locate.
    #[arg(short, long, value_name = "TEXT")]
    pub target: String,

    /// Matching policy. [default: exact, then normalize-whitespace]
    #[arg(long, value_enum, value_name = "POLICY")]
    pub policy: Option<MatchPolicyArg>,

    /// Compare case-insensitively.
    #[arg(long)]
    pub ignore_case: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Restrict the listing to one paragraph (0-indexed).
    #[arg(long, value_name = "N")]
    pub paragraph: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchPolicyArg {
    Exact,
    Trim,
    NormalizeWhitespace,
}

impl From<MatchPolicyArg> for MatchPolicy {
    fn from(arg: MatchPolicyArg) -> Self {
        match arg {
            MatchPolicyArg::Exact => MatchPolicy::Exact,
            MatchPolicyArg::Trim => MatchPolicy::Trim,
            MatchPolicyArg::NormalizeWhitespace => MatchPolicy::NormalizeWhitespace,
        }
    }
}
