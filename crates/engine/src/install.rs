//! Git hook script installation
//!
//! Installs small shell scripts into `.git/hooks` that delegate to
//! `sekisho run`. A pre-existing hook script that sekisho did not write
//! is preserved as `<stage>.legacy` and chained before sekisho runs;
//! uninstalling restores it.

use sekisho_core::{Error, Result, Stage};
use std::fs;
use std::path::{Path, PathBuf};

/// Marker line identifying scripts sekisho wrote
pub const MARKER: &str = "# generated by sekisho";

/// Install runner scripts for the given stages
///
/// Reinstalling over sekisho's own scripts is idempotent. Returns the
/// paths written.
///
/// # Errors
///
/// Returns an error for a non-installable stage or on filesystem failure.
pub fn install(hooks_dir: &Path, stages: &[Stage]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(hooks_dir)?;

    let mut written = Vec::with_capacity(stages.len());
    for &stage in stages {
        if !stage.installable() {
            return Err(Error::Hook(format!(
                "Stage '{stage}' cannot be installed as a git hook"
            )));
        }

        let path = hooks_dir.join(stage.as_str());
        if path.exists() && !is_ours(&path) {
            let legacy = legacy_path(hooks_dir, stage);
            tracing::info!(
                hook = %stage,
                "Preserving existing hook as {}",
                legacy.display()
            );
            fs::rename(&path, &legacy)?;
        }

        fs::write(&path, hook_script(stage))?;
        make_executable(&path)?;
        tracing::debug!(path = %path.display(), "Installed hook script");
        written.push(path);
    }

    Ok(written)
}

/// Remove sekisho's scripts, restoring any preserved legacy hooks
///
/// Scripts sekisho did not write are left alone. Returns the paths
/// removed.
///
/// # Errors
///
/// Returns an error on filesystem failure.
pub fn uninstall(hooks_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for &stage in Stage::ALL {
        if !stage.installable() {
            continue;
        }
        let path = hooks_dir.join(stage.as_str());
        if !path.exists() || !is_ours(&path) {
            continue;
        }

        fs::remove_file(&path)?;
        removed.push(path.clone());

        let legacy = legacy_path(hooks_dir, stage);
        if legacy.exists() {
            tracing::info!(hook = %stage, "Restoring preserved hook");
            fs::rename(&legacy, &path)?;
        }
    }

    Ok(removed)
}

/// Whether a hook script at `path` was written by sekisho
#[must_use]
pub fn is_ours(path: &Path) -> bool {
    fs::read_to_string(path).is_ok_and(|content| content.contains(MARKER))
}

fn legacy_path(hooks_dir: &Path, stage: Stage) -> PathBuf {
    hooks_dir.join(format!("{}.legacy", stage.as_str()))
}

/// The generated script: chain any preserved legacy hook, then delegate
fn hook_script(stage: Stage) -> String {
    let name = stage.as_str();
    format!(
        r#"#!/usr/bin/env bash
{MARKER}
hook_dir="$(cd "$(dirname "$0")" && pwd)"
legacy="$hook_dir/{name}.legacy"
if [ -x "$legacy" ]; then
    "$legacy" "$@" || exit $?
fi
exec sekisho run --hook-stage {name}
"#
    )
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_install_writes_marked_script() {
        let dir = tempfile::tempdir().unwrap();
        let hooks_dir = dir.path().join("hooks");

        let written = install(&hooks_dir, &[Stage::PreCommit]).unwrap();
        assert_eq!(written, vec![hooks_dir.join("pre-commit")]);

        let content = fs::read_to_string(&written[0]).unwrap();
        assert!(content.contains(MARKER));
        assert!(content.contains("--hook-stage pre-commit"));
        assert!(is_ours(&written[0]));
    }

    #[cfg(unix)]
    #[test]
    fn test_installed_script_is_executable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let hooks_dir = dir.path().join("hooks");

        let written = install(&hooks_dir, &[Stage::PrePush]).unwrap();
        let mode = fs::metadata(&written[0]).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_foreign_hook_preserved_and_restored() {
        let dir = tempfile::tempdir().unwrap();
        let hooks_dir = dir.path().join("hooks");
        fs::create_dir_all(&hooks_dir).unwrap();

        let foreign = "#!/bin/sh\necho my own hook\n";
        fs::write(hooks_dir.join("pre-commit"), foreign).unwrap();

        install(&hooks_dir, &[Stage::PreCommit]).unwrap();
        assert_eq!(
            fs::read_to_string(hooks_dir.join("pre-commit.legacy")).unwrap(),
            foreign
        );
        assert!(is_ours(&hooks_dir.join("pre-commit")));

        uninstall(&hooks_dir).unwrap();
        assert_eq!(
            fs::read_to_string(hooks_dir.join("pre-commit")).unwrap(),
            foreign
        );
        assert!(!hooks_dir.join("pre-commit.legacy").exists());
    }

    #[test]
    fn test_reinstall_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let hooks_dir = dir.path().join("hooks");

        install(&hooks_dir, &[Stage::PreCommit]).unwrap();
        install(&hooks_dir, &[Stage::PreCommit]).unwrap();
        assert!(!hooks_dir.join("pre-commit.legacy").exists());
    }

    #[test]
    fn test_uninstall_leaves_foreign_hooks_alone() {
        let dir = tempfile::tempdir().unwrap();
        let hooks_dir = dir.path().join("hooks");
        fs::create_dir_all(&hooks_dir).unwrap();

        let foreign = "#!/bin/sh\nexit 0\n";
        fs::write(hooks_dir.join("pre-push"), foreign).unwrap();

        let removed = uninstall(&hooks_dir).unwrap();
        assert!(removed.is_empty());
        assert_eq!(
            fs::read_to_string(hooks_dir.join("pre-push")).unwrap(),
            foreign
        );
    }

    #[test]
    fn test_manual_stage_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = install(&dir.path().join("hooks"), &[Stage::Manual]).unwrap_err();
        assert!(err.to_string().contains("cannot be installed"));
    }
}
