//! Validate configuration and manifest files
//!
//! Both validators parse and check files without cloning or executing
//! anything, so they are usable from hook repositories' own CI and do
//! not require a git repository.

use crate::error::Result;
use clap::Args;
use owo_colors::OwoColorize;
use sekisho_config::{CONFIG_FILES, Config, Manifest};
use sekisho_core::Error;
use std::path::{Path, PathBuf};

/// Check that configuration files are well-formed
#[derive(Debug, Args)]
pub struct ValidateConfigCommand {
    /// Files to validate (default: the repository's own configuration)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl ValidateConfigCommand {
    /// Validate each file, reporting per-file results
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; later files are not checked.
    pub fn run(&self, config_override: Option<&Path>) -> Result<()> {
        let files = self.targets(config_override)?;
        for path in &files {
            let config = Config::load(path)?;
            config.validate()?;
            println!("{}: {}", path.display(), "valid".green());
        }
        Ok(())
    }

    /// Explicit files, the `--config` override, or the discovered config
    fn targets(&self, config_override: Option<&Path>) -> Result<Vec<PathBuf>> {
        if !self.files.is_empty() {
            return Ok(self.files.clone());
        }
        if let Some(path) = config_override {
            return Ok(vec![path.to_path_buf()]);
        }

        let cwd = std::env::current_dir()?;
        Config::discover(&cwd).map(|path| vec![path]).ok_or_else(|| {
            Error::Config(format!(
                "No {} found in {}",
                CONFIG_FILES[0],
                cwd.display()
            ))
            .into()
        })
    }
}

/// Check that hook manifest files are well-formed
#[derive(Debug, Args)]
pub struct ValidateManifestCommand {
    /// Manifest files to validate (default: the manifest in the current
    /// directory)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl ValidateManifestCommand {
    /// Validate each manifest, reporting per-file results
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; later files are not checked.
    pub fn run(&self) -> Result<()> {
        let files = if self.files.is_empty() {
            let cwd = std::env::current_dir()?;
            let manifest = Manifest::load(&cwd)?;
            manifest.validate()?;
            println!("{}: {}", cwd.display(), "valid".green());
            return Ok(());
        } else {
            self.files.clone()
        };

        for path in &files {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Manifest(format!("Failed to read {}: {}", path.display(), e))
            })?;
            let manifest = Manifest::from_yaml_str(&content)?;
            manifest.validate()?;
            println!("{}: {}", path.display(), "valid".green());
        }
        Ok(())
    }
}
