//! Sekisho CLI library
//!
//! This library contains all the CLI logic for sekisho, making it
//! reusable for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;

/// Sekisho - a git hook manager
#[derive(Parser)]
#[command(name = "sekisho")]
#[command(about = "Manage git hooks with sekisho (関所)")]
#[command(version)]
#[command(long_about = "Manage git hooks with sekisho (関所)

A fast git hook manager written in Rust.

Hooks are declared in .sekisho.yaml: remote hook repositories pinned to
a revision, local commands, or built-in meta checks. Sekisho installs a
small runner script into .git/hooks and runs the configured hooks
against the files each commit touches.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "SEKISHO_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, env = "SEKISHO_VERBOSE")]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "SEKISHO_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the sekisho CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Run hooks against staged files (or --all-files, or --files)
    Run(cmd::run::RunCommand),

    /// Install sekisho's runner scripts into .git/hooks
    Install(cmd::install::InstallCommand),

    /// Remove sekisho's runner scripts from .git/hooks
    Uninstall(cmd::install::UninstallCommand),

    /// List configured hooks after resolution
    List(cmd::list::ListCommand),

    /// Check that configuration files are well-formed
    ValidateConfig(cmd::validate::ValidateConfigCommand),

    /// Check that hook manifest files are well-formed
    ValidateManifest(cmd::validate::ValidateManifestCommand),

    /// Delete all cached hook repository clones
    Clean(cmd::clean::CleanCommand),

    /// Print a starter configuration to stdout
    SampleConfig(cmd::sample::SampleConfigCommand),
}

/// Main entry point for the CLI logic
///
/// # Errors
///
/// Returns an error if logging initialization, configuration loading,
/// or command execution fails.
pub fn run(cli: Cli) -> Result<()> {
    sekisho_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    // Commands that work without a repository or configuration
    match &cli.command {
        Commands::SampleConfig(sample_cmd) => return Ok(sample_cmd.run()?),
        Commands::Clean(clean_cmd) => return Ok(clean_cmd.run()?),
        Commands::ValidateConfig(validate_cmd) => {
            return Ok(validate_cmd.run(cli.config.as_deref())?);
        }
        Commands::ValidateManifest(validate_cmd) => return Ok(validate_cmd.run()?),
        _ => {}
    }

    let context = RuntimeContext::new(cli.config.as_deref())?;
    execute_command(&cli.command, &context)
}

/// Execute a repository-bound command
fn execute_command(command: &Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Run(run_cmd) => run_cmd.execute(context)?,
        Commands::Install(install_cmd) => install_cmd.execute(context)?,
        Commands::Uninstall(uninstall_cmd) => uninstall_cmd.execute(context)?,
        Commands::List(list_cmd) => list_cmd.execute(context)?,
        Commands::SampleConfig(_)
        | Commands::Clean(_)
        | Commands::ValidateConfig(_)
        | Commands::ValidateManifest(_) => {
            unreachable!("standalone commands already handled above")
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_cli_parses_run_with_flags() {
        let cli = Cli::parse_from(["sekisho", "-v", "run", "--all-files"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Run(ref cmd) if cmd.all_files));
    }

    #[test]
    fn test_cli_parses_config_override() {
        let cli = Cli::parse_from(["sekisho", "--config", "/tmp/custom.yaml", "list"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/custom.yaml")));
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["sekisho", "frobnicate"]).is_err());
    }

    #[test]
    fn test_global_flags_read_from_environment() {
        use clap::CommandFactory;

        let command = Cli::command();
        for (id, var) in [
            ("config", "SEKISHO_CONFIG"),
            ("verbose", "SEKISHO_VERBOSE"),
            ("log_file", "SEKISHO_LOG_FILE"),
        ] {
            let arg = command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .unwrap();
            assert_eq!(arg.get_env().and_then(|env| env.to_str()), Some(var));
        }
    }
}
