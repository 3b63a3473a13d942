//! Command trait for sekisho CLI
//!
//! Commands that operate inside a repository implement this trait and
//! receive a [`RuntimeContext`] with the loaded configuration and the
//! discovered repository. Commands that run outside a repository
//! (`sample-config`, `clean`, the validators) are plain functions in
//! their modules instead.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for commands that need a repository and configuration
///
/// The `execute` method receives a `RuntimeContext` containing shared
/// state. Commands can specify their return type via the `Output`
/// associated type; most return `()`.
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command fails to execute.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
