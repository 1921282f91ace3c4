//! Command-line interface for Switchfix.
//!
//! This module handles argument parsing and output formatting only.
//! NO patching logic is performed here.

use crate::batch::{BatchCounts, BatchOutcome, FileReport, ScanReport};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Switchfix: retrofit missing fallback clauses into enum switch statements.
///
/// With no subcommand, runs the batch over the embedded target list.
#[derive(Parser, Debug)]
#[command(name = "switchfix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`).
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available Switchfix commands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Patch every target file that lacks a fallback clause.
    Run(RunArgs),

    /// List matching switch constructs and their completeness without writing.
    Scan {
        /// JSON configuration file overriding the embedded defaults.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Directory relative target paths resolve against (default: current directory).
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Print a JSON payload instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Undo a previous run by restoring from a backup manifest.
    Undo {
        /// Path to the backup manifest file.
        #[arg(short, long)]
        manifest: PathBuf,

        /// Directory the backed-up paths are relative to (default: current directory).
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
}

/// Options for the `run` command.
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// JSON configuration file overriding the embedded defaults.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory relative target paths resolve against (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Report what would change without writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Abort the whole run on the first read or write failure.
    #[arg(long)]
    pub fail_fast: bool,

    /// Back up files before rewriting them.
    #[arg(long, conflicts_with = "dry_run")]
    pub create_backup: bool,

    /// Optional operation ID for the backup (auto-generated UUID if not provided).
    #[arg(long, requires = "create_backup")]
    pub operation_id: Option<String>,

    /// Print a JSON payload instead of text.
    #[arg(long)]
    pub json: bool,
}

impl Commands {
    /// Whether output should be JSON.
    pub fn json(&self) -> bool {
        match self {
            Commands::Run(args) => args.json,
            Commands::Scan { json, .. } => *json,
            Commands::Undo { .. } => false,
        }
    }
}

/// Parse command-line arguments.
///
/// This function is the entry point for CLI argument parsing.
/// It returns the parsed Cli struct or exits on error.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Console line for one file's outcome.
///
/// Paths are printed as listed in the target list, not as resolved.
pub fn file_line(report: &FileReport, dry_run: bool) -> String {
    let path = report.target.display();
    match report.outcome {
        BatchOutcome::Updated if dry_run => format!("Would update {}", path),
        BatchOutcome::Updated => format!("Updated {}", path),
        BatchOutcome::Unchanged => format!("No changes for {}", path),
        BatchOutcome::NotFound => format!("Skipping {} (not found)", path),
        BatchOutcome::Failed => format!(
            "Failed {}: {}",
            path,
            report.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Aggregate count line printed before `Done!`.
pub fn summary_line(counts: &BatchCounts) -> String {
    format!(
        "{} updated, {} unchanged, {} not found, {} failed",
        counts.updated, counts.unchanged, counts.not_found, counts.failed
    )
}

/// Text lines describing a scan result.
pub fn scan_lines(report: &ScanReport) -> Vec<String> {
    let path = report.target.display();
    if !report.exists {
        return vec![format!("Skipping {} (not found)", path)];
    }
    if report.regions.is_empty() {
        return vec![format!("{}: no matching switch", path)];
    }

    let mut lines = vec![format!("{}: {} matching switch(es)", path, report.regions.len())];
    for scanned in &report.regions {
        lines.push(format!(
            "  lines {}-{}: {}",
            scanned.line_start,
            scanned.line_end,
            if scanned.region.is_complete {
                "complete"
            } else {
                "missing fallback"
            }
        ));
    }
    lines
}

/// JSON success payload for CLI responses.
#[derive(Serialize)]
pub struct CliSuccessPayload {
    /// Status indicator ("ok").
    pub status: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CliSuccessPayload {
    /// Construct a payload with structured data.
    pub fn with_data(message: String, data: Value) -> Self {
        Self {
            status: "ok",
            message,
            data: Some(data),
        }
    }
}

/// JSON error payload for CLI responses.
#[derive(Serialize)]
pub struct CliErrorPayload {
    /// Status indicator ("error").
    pub status: &'static str,
    /// Structured error details.
    pub error: ErrorDetails,
}

/// Details for a CLI error payload.
#[derive(Serialize)]
pub struct ErrorDetails {
    /// Error kind identifier (FileNotFound, WriteFailure, etc.).
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional file context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl CliErrorPayload {
    /// Build payload from a SwitchfixError instance.
    pub fn from_error(error: &crate::SwitchfixError) -> Self {
        CliErrorPayload {
            status: "error",
            error: ErrorDetails {
                kind: error.kind(),
                message: error.to_string(),
                file: error
                    .file_path()
                    .map(|path| path.to_string_lossy().to_string()),
            },
        }
    }
}
