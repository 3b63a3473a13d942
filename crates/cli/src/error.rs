//! Error types for CLI commands
//!
//! Structured error types using thiserror for the failures commands can
//! hit, with a catch-all `Other` variant for errors surfaced via anyhow.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// No configuration file in the repository
    #[error(
        "No configuration file found in {}\n\
         Expected one of: .sekisho.yaml, .sekisho.yml\n\
         Run 'sekisho sample-config > .sekisho.yaml' to create one",
        .0.display()
    )]
    ConfigNotFound(PathBuf),

    /// One or more hooks failed
    #[error("{failed} out of {total} hooks failed")]
    HooksFailed {
        /// Number of hooks that failed
        failed: usize,
        /// Number of hooks that ran
        total: usize,
    },

    /// No configured hook matches the requested id or alias
    #[error("No hook matches '{selector}' at stage '{stage}'")]
    NoSuchHook {
        /// The id or alias asked for
        selector: String,
        /// The stage hooks were filtered to
        stage: String,
    },

    /// The index has unmerged paths; running hooks would be misleading
    #[error("Unmerged files; resolve the conflicts before running hooks")]
    UnmergedFiles,

    /// Engine or configuration error
    #[error(transparent)]
    Core(#[from] sekisho_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
