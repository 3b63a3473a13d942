//! Git repository queries
//!
//! Thin facade over git2 for the questions the engine asks: where is the
//! repository, which files are staged, which files exist at all, and where
//! do hook scripts live.

use sekisho_core::{Error, Result};
use std::path::{Path, PathBuf};

/// An opened git repository
pub struct GitRepo {
    repo: git2::Repository,
    root: PathBuf,
}

impl GitRepo {
    /// Discover the repository containing `path` (walks upward like git)
    ///
    /// # Errors
    ///
    /// Returns an error when no repository is found or the repository is
    /// bare (a worktree is required to run hooks against).
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(path)
            .map_err(|e| Error::Git(format!("Not in a git repository: {e}")))?;
        let root = repo
            .workdir()
            .ok_or_else(|| Error::Git("Bare repositories are not supported".to_string()))?
            .to_path_buf();
        Ok(Self { repo, root })
    }

    /// The worktree root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory git runs hook scripts from
    #[must_use]
    pub fn hooks_dir(&self) -> PathBuf {
        self.repo.path().join("hooks")
    }

    /// Whether the index currently has unmerged paths
    pub fn has_unmerged_paths(&self) -> Result<bool> {
        let index = self.repo.index().map_err(git_err)?;
        Ok(index.has_conflicts())
    }

    /// Paths staged for the next commit, relative to the worktree root
    ///
    /// Diffs HEAD against the index; deletions are skipped (there is no
    /// file content left to check), renames report the new path.
    pub fn staged_files(&self) -> Result<Vec<String>> {
        // Unborn branch (no commit yet): everything in the index is staged
        let head_tree = match self.repo.head() {
            Ok(head) => Some(head.peel_to_tree().map_err(git_err)?),
            Err(_) => None,
        };

        let mut opts = git2::DiffOptions::new();
        opts.include_typechange(true);
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
            .map_err(git_err)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            if delta.status() == git2::Delta::Deleted {
                continue;
            }
            if let Some(path) = delta.new_file().path().and_then(Path::to_str) {
                files.push(path.to_string());
            }
        }

        tracing::debug!(count = files.len(), "Collected staged files");
        Ok(files)
    }

    /// Every path in the index, relative to the worktree root
    pub fn all_files(&self) -> Result<Vec<String>> {
        let index = self.repo.index().map_err(git_err)?;
        let files = index
            .iter()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
            .collect();
        Ok(files)
    }
}

pub(crate) fn git_err(e: git2::Error) -> Error {
    Error::Git(e.to_string())
}

/// Expand user-supplied paths into worktree-relative file lists
///
/// Plain files pass through; directories are walked with gitignore rules
/// applied. Paths outside the worktree are an error.
pub fn expand_file_args(root: &Path, paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for path in paths {
        let absolute = if path.is_absolute() {
            path.clone()
        } else {
            std::env::current_dir()?.join(path)
        };
        let relative = absolute.strip_prefix(root).map_err(|_| {
            Error::Message(format!(
                "Path {} is not inside the repository {}",
                path.display(),
                root.display()
            ))
        })?;

        if absolute.is_dir() {
            for entry in ignore::WalkBuilder::new(&absolute).build().flatten() {
                if entry.file_type().is_some_and(|t| t.is_file())
                    && let Ok(rel) = entry.path().strip_prefix(root)
                    && let Some(rel) = rel.to_str()
                {
                    files.push(rel.to_string());
                }
            }
        } else if let Some(rel) = relative.to_str() {
            files.push(rel.to_string());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
