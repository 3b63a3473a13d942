//! Git lifecycle stages a hook can bind to
//!
//! Stage names follow git's own hook naming (`pre-commit`, `commit-msg`, ...),
//! plus `manual` for hooks that only run when asked for by id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A git lifecycle point that hooks can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Before a commit is finalized (the default stage)
    PreCommit,
    /// Before a merge commit is finalized
    PreMergeCommit,
    /// Before pushing to a remote
    PrePush,
    /// While preparing the default commit message
    PrepareCommitMsg,
    /// After the commit message has been written
    CommitMsg,
    /// After a commit has been created
    PostCommit,
    /// After a checkout
    PostCheckout,
    /// After a merge
    PostMerge,
    /// After history rewriting (rebase, amend)
    PostRewrite,
    /// Only when explicitly requested via `run --hook-stage manual`
    Manual,
}

impl Stage {
    /// All stages, in a stable order
    pub const ALL: &'static [Stage] = &[
        Stage::PreCommit,
        Stage::PreMergeCommit,
        Stage::PrePush,
        Stage::PrepareCommitMsg,
        Stage::CommitMsg,
        Stage::PostCommit,
        Stage::PostCheckout,
        Stage::PostMerge,
        Stage::PostRewrite,
        Stage::Manual,
    ];

    /// Get the kebab-case name git uses for this stage
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PreCommit => "pre-commit",
            Stage::PreMergeCommit => "pre-merge-commit",
            Stage::PrePush => "pre-push",
            Stage::PrepareCommitMsg => "prepare-commit-msg",
            Stage::CommitMsg => "commit-msg",
            Stage::PostCommit => "post-commit",
            Stage::PostCheckout => "post-checkout",
            Stage::PostMerge => "post-merge",
            Stage::PostRewrite => "post-rewrite",
            Stage::Manual => "manual",
        }
    }

    /// Whether a script for this stage can be installed into `.git/hooks`
    ///
    /// `manual` has no corresponding git hook file.
    #[must_use]
    pub fn installable(self) -> bool {
        self != Stage::Manual
    }

    /// Stages that `install` sets up when no `--hook-type` is given
    #[must_use]
    pub fn default_install_set() -> &'static [Stage] {
        &[Stage::PreCommit]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| crate::Error::Config(format!("Unknown stage '{s}'")))
    }
}
