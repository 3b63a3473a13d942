//! Run configured hooks against the repository

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use clap::Args;
use owo_colors::OwoColorize;
use sekisho_core::Stage;
use sekisho_engine::git::expand_file_args;
use sekisho_engine::{HookLoader, HookOutcome, HookResult, HookRunner, ResolvedHook, Store};
use std::path::PathBuf;

/// Width of the `name....status` line
const STATUS_COLS: usize = 79;

/// Run hooks against staged, tracked, or explicitly named files
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Run only this hook (by id or alias)
    #[arg(value_name = "HOOK")]
    pub hook_id: Option<String>,

    /// Run against every tracked file instead of staged files
    #[arg(short, long)]
    pub all_files: bool,

    /// Run against specific files or directories
    #[arg(long, value_name = "PATH", conflicts_with = "all_files")]
    pub files: Vec<PathBuf>,

    /// Stage to run hooks for
    #[arg(long, value_name = "STAGE", default_value = "pre-commit")]
    pub hook_stage: Stage,
}

impl Command for RunCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        if context.repo.has_unmerged_paths()? {
            return Err(CommandError::UnmergedFiles);
        }

        let all_files = context.repo.all_files()?;
        let candidates = if !self.files.is_empty() {
            expand_file_args(context.root(), &self.files)?
        } else if self.all_files {
            all_files.clone()
        } else {
            context.repo.staged_files()?
        };

        let store = Store::open_default()?;
        let loader = HookLoader::new(&context.config, &store);
        let resolved = loader.resolve_all()?;

        let mut hooks: Vec<ResolvedHook> = resolved
            .into_iter()
            .filter(|hook| hook.runs_at(self.hook_stage, &context.config.default_stages))
            .collect();
        if let Some(selector) = &self.hook_id {
            hooks.retain(|hook| hook.matches_selector(selector));
            if hooks.is_empty() {
                return Err(CommandError::NoSuchHook {
                    selector: selector.clone(),
                    stage: self.hook_stage.to_string(),
                });
            }
        }
        if hooks.is_empty() {
            println!("No hooks configured for stage '{}'", self.hook_stage);
            return Ok(());
        }

        let runner = HookRunner::new(
            context.root(),
            &context.config,
            candidates,
            all_files,
        )?;

        let results = runner.run_all(&hooks)?;
        for (result, hook) in results.iter().zip(&hooks) {
            print_result(result, hook.verbose);
        }

        let failed = results
            .iter()
            .filter(|result| result.outcome.is_failure())
            .count();
        if failed > 0 {
            return Err(CommandError::HooksFailed {
                failed,
                total: results.len(),
            });
        }
        Ok(())
    }
}

/// Print a `name....status` line, plus captured output when it matters
fn print_result(result: &HookResult, verbose: bool) {
    let status = match &result.outcome {
        HookOutcome::Passed => "Passed",
        HookOutcome::Failed { .. } => "Failed",
        HookOutcome::Skipped { .. } => "Skipped",
    };
    let dots = STATUS_COLS
        .saturating_sub(result.name.len() + status.len())
        .max(3);

    match &result.outcome {
        HookOutcome::Passed => {
            println!("{}{}{}", result.name, ".".repeat(dots), status.green());
            if verbose && !result.output.is_empty() {
                print!("{}", result.output);
            }
        }
        HookOutcome::Failed { code } => {
            println!("{}{}{}", result.name, ".".repeat(dots), status.red());
            println!("{}", format!("- hook id: {}", result.hook_id).dimmed());
            println!("{}", format!("- exit code: {code}").dimmed());
            if result.files_modified {
                println!("{}", "- files were modified by this hook".dimmed());
            }
            if !result.output.is_empty() {
                print!("{}", result.output);
            }
        }
        HookOutcome::Skipped { reason } => {
            println!(
                "{}{}{} ({})",
                result.name,
                ".".repeat(dots),
                status.yellow(),
                reason.dimmed()
            );
        }
    }
}
