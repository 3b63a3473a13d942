//! Configuration management for sekisho
//!
//! This crate handles:
//! - Configuration file loading and validation
//! - Hook repository manifest loading and validation
//! - File classification tags
//! - Regex and tag based file filtering
//! - Logging initialization

pub mod config;
pub mod logging;
pub mod manifest;
pub mod matcher;
pub mod tags;

// Re-export error types from core
pub use sekisho_core::{Error, Result, Stage};

// Re-export main types
pub use config::{CONFIG_FILES, Config, HookSpec, Language, RepoEntry, RepoSource};
pub use manifest::{MANIFEST_FILES, Manifest, ManifestHook};
pub use matcher::FileFilter;
