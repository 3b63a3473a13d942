//! Hook resolution and execution engine for sekisho
//!
//! This crate turns a validated configuration into runnable hooks and runs
//! them:
//! - `store`: clone cache for remote hook repositories, pinned by revision
//! - `git`: staged/all file discovery and hooks directory lookup
//! - `loader`: config entries × repository manifests → resolved hooks
//! - `executor`: filtering, command construction, parallel execution
//! - `meta`: built-in hooks that inspect the configuration itself
//! - `install`: generated runner scripts in `.git/hooks`

pub mod executor;
pub mod git;
pub mod install;
pub mod loader;
pub mod meta;
pub mod store;

// Re-export error types from core
pub use sekisho_core::{Error, Result};

pub use executor::{HookOutcome, HookResult, HookRunner};
pub use git::GitRepo;
pub use loader::{HookLoader, ResolvedHook};
pub use store::Store;
