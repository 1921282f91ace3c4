//! Switchfix: idempotent retrofitting of fallback clauses into switch statements.
//!
//! This library locates `switch` constructs over a leveling enumeration,
//! decides whether each one already handles a newly added variant, and
//! inserts a placeholder clause before the closing brace when it does not.
//! Re-running over already patched files changes nothing.

#![warn(missing_docs)]
// env_logger is used by src/main.rs (binary), not this library
#![expect(unused_crate_dependencies)]

pub mod batch;
pub mod classify;
pub mod clause;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod locate;
pub mod patch;

/// Re-export common error types for convenience.
pub use error::{Result, SwitchfixError};

/// Re-export configuration and the batch entry point for convenience.
pub use batch::{run_batch, BatchOptions, BatchOutcome, BatchReport};
pub use config::PatchConfig;

/// Switchfix version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
