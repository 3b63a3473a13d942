//! Common utilities and types shared across CLI commands

use crate::error::{CommandError, Result};
use sekisho_config::Config;
use sekisho_engine::GitRepo;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runtime context for CLI commands
///
/// Consolidates what most commands need: the discovered repository, the
/// configuration file path, and the loaded, validated configuration.
/// Config is shared via Arc so commands can hold onto it cheaply.
pub struct RuntimeContext {
    /// Shared, validated configuration
    pub config: Arc<Config>,
    /// Path the configuration was loaded from
    pub config_path: PathBuf,
    /// The discovered git repository
    pub repo: GitRepo,
}

impl RuntimeContext {
    /// Discover the repository from the current directory and load the
    /// configuration
    ///
    /// `config_path` overrides configuration discovery when given.
    ///
    /// # Errors
    ///
    /// Returns an error when no repository is found, no configuration
    /// file exists, or the configuration fails validation.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let repo = GitRepo::discover(&std::env::current_dir()?)?;

        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => Config::discover(repo.root())
                .ok_or_else(|| CommandError::ConfigNotFound(repo.root().to_path_buf()))?,
        };

        tracing::debug!(path = %config_path.display(), "Loading configuration");
        let config = Config::load(&config_path)?;
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
            config_path,
            repo,
        })
    }

    /// The worktree root of the discovered repository
    #[must_use]
    pub fn root(&self) -> &Path {
        self.repo.root()
    }
}
