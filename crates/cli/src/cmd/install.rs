//! Install and uninstall git hook scripts

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use clap::Args;
use owo_colors::OwoColorize;
use sekisho_core::Stage;
use sekisho_engine::{HookLoader, Store, install};

/// Install sekisho's runner scripts into `.git/hooks`
#[derive(Debug, Args)]
pub struct InstallCommand {
    /// Hook stage to install a script for (repeatable; default: pre-commit)
    #[arg(short = 't', long = "hook-type", value_name = "STAGE")]
    pub hook_type: Vec<Stage>,

    /// Also clone all configured hook repositories now
    #[arg(long)]
    pub install_hooks: bool,
}

impl Command for InstallCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let stages: &[Stage] = if self.hook_type.is_empty() {
            Stage::default_install_set()
        } else {
            &self.hook_type
        };

        let written = install::install(&context.repo.hooks_dir(), stages)?;
        for path in &written {
            println!("Installed {}", path.display().green());
        }

        if self.install_hooks {
            let store = Store::open_default()?;
            let hooks = HookLoader::new(&context.config, &store).resolve_all()?;
            println!("Prepared {} hooks", hooks.len());
        }
        Ok(())
    }
}

/// Remove sekisho's runner scripts from `.git/hooks`
#[derive(Debug, Args)]
pub struct UninstallCommand {}

impl Command for UninstallCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let removed = install::uninstall(&context.repo.hooks_dir())?;
        if removed.is_empty() {
            println!("No sekisho hooks installed");
        }
        for path in &removed {
            println!("Removed {}", path.display());
        }
        Ok(())
    }
}
