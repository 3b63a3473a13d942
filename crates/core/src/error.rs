//! Base error types for sekisho
//!
//! This module provides the foundation error types that all crates can use.

use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hook repository manifest error
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Hook definition error
    #[error("Hook error: {0}")]
    Hook(String),

    /// Hook execution error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Hook repository store error
    #[error("Store error: {0}")]
    Store(String),

    /// Git operation error
    #[error("Git error: {0}")]
    Git(String),

    /// Invalid regular expression in a `files`/`exclude` field
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern that failed to compile
        pattern: String,
        /// The underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
