//! Built-in meta hooks
//!
//! Meta hooks run natively inside sekisho rather than as subprocesses.
//! They inspect the configuration itself: `identity` echoes what it was
//! given, `check-hooks-apply` flags hooks whose filters admit no file in
//! the repository, and `check-useless-excludes` flags exclude patterns
//! that never exclude anything.

use crate::loader::ResolvedHook;
use sekisho_config::{Config, FileFilter, HookSpec, Language, RepoSource};
use sekisho_core::{Error, Result};
use std::fmt::Write as _;
use std::path::Path;

/// Exclude value meaning "exclude nothing"; never reported as useless
const EMPTY_EXCLUDE: &str = "^$";

/// Resolve a meta hook descriptor to its built-in definition
///
/// # Errors
///
/// Returns an error for an id that is not a built-in meta hook.
pub(crate) fn resolve(spec: &HookSpec) -> Result<ResolvedHook> {
    let (name, always_run, verbose) = match spec.id.as_str() {
        "identity" => ("identity", true, true),
        "check-hooks-apply" => ("check hooks apply", true, false),
        "check-useless-excludes" => ("check useless excludes", true, false),
        other => {
            return Err(Error::Hook(format!("Unknown meta hook '{other}'")));
        }
    };

    Ok(ResolvedHook {
        id: spec.id.clone(),
        name: spec.name.clone().unwrap_or_else(|| name.to_string()),
        alias: spec.alias.clone(),
        entry: spec.id.clone(),
        language: Language::Other("meta".to_string()),
        args: spec.args.clone(),
        files: spec.files.clone().unwrap_or_default(),
        exclude: spec.exclude.clone().unwrap_or_default(),
        types: spec.types.clone(),
        types_or: spec.types_or.clone(),
        exclude_types: spec.exclude_types.clone(),
        additional_dependencies: Vec::new(),
        always_run: spec.always_run.unwrap_or(always_run),
        pass_filenames: spec.pass_filenames.unwrap_or(true),
        require_serial: spec.require_serial.unwrap_or(false),
        verbose: spec.verbose.unwrap_or(verbose),
        stages: spec.stages.clone(),
        src: RepoSource::Meta.to_string(),
        rev: None,
        repo_dir: None,
    })
}

/// Run a meta hook natively, returning `(exit_code, output)`
///
/// `files` is the hook's filtered file list; `all_files` is every tracked
/// file, which the configuration checks reason over.
pub(crate) fn run(
    hook: &ResolvedHook,
    config: &Config,
    root: &Path,
    all_files: &[String],
    files: &[&str],
) -> Result<(i32, String)> {
    match hook.id.as_str() {
        "identity" => Ok(identity(files)),
        "check-hooks-apply" => check_hooks_apply(config, root, all_files),
        "check-useless-excludes" => check_useless_excludes(config, root, all_files),
        other => Err(Error::Hook(format!("Unknown meta hook '{other}'"))),
    }
}

/// Echo the files the hook was given and pass
fn identity(files: &[&str]) -> (i32, String) {
    let mut output = String::new();
    for file in files {
        let _ = writeln!(output, "{file}");
    }
    (0, output)
}

/// Flag configured hooks whose filters admit no tracked file
///
/// `always_run` hooks are exempt since they run regardless of files.
fn check_hooks_apply(config: &Config, root: &Path, all_files: &[String]) -> Result<(i32, String)> {
    let mut output = String::new();
    let mut code = 0;

    for (entry, spec) in config.all_hooks() {
        if entry.repo == RepoSource::Meta || spec.always_run == Some(true) {
            continue;
        }

        let filter = FileFilter::new(
            spec.files.as_deref().unwrap_or(""),
            spec.exclude.as_deref().unwrap_or(""),
            spec.types.clone(),
            spec.types_or.clone(),
            spec.exclude_types.clone(),
        )?;
        if !all_files.iter().any(|path| filter.matches(root, path)) {
            let _ = writeln!(output, "{} does not apply to this repository", spec.id);
            code = 1;
        }
    }

    Ok((code, output))
}

/// Flag exclude patterns that exclude nothing
///
/// An exclude is useless when no tracked file that the rest of the filter
/// admits is matched by it. The default `^$` is never reported.
fn check_useless_excludes(
    config: &Config,
    root: &Path,
    all_files: &[String],
) -> Result<(i32, String)> {
    let mut output = String::new();
    let mut code = 0;

    if !config.exclude.is_empty() && config.exclude != EMPTY_EXCLUDE {
        let global = FileFilter::patterns_only(&config.files, &config.exclude)?;
        if !all_files.iter().any(|path| global.excludes(path)) {
            let _ = writeln!(
                output,
                "The global exclude pattern '{}' matches no files",
                config.exclude
            );
            code = 1;
        }
    }

    for (_, spec) in config.all_hooks() {
        let Some(exclude) = spec.exclude.as_deref() else {
            continue;
        };
        if exclude.is_empty() || exclude == EMPTY_EXCLUDE {
            continue;
        }

        // Would the hook admit the file if the exclude were absent?
        let without_exclude = FileFilter::new(
            spec.files.as_deref().unwrap_or(""),
            "",
            spec.types.clone(),
            spec.types_or.clone(),
            spec.exclude_types.clone(),
        )?;
        let with_exclude = FileFilter::patterns_only("", exclude)?;

        let excludes_something = all_files.iter().any(|path| {
            without_exclude.matches(root, path) && with_exclude.excludes(path)
        });
        if !excludes_something {
            let _ = writeln!(
                output,
                "The exclude pattern '{}' for {} matches no files",
                exclude, spec.id
            );
            code = 1;
        }
    }

    Ok((code, output))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn spec(id: &str) -> HookSpec {
        HookSpec {
            id: id.to_string(),
            ..HookSpec::default()
        }
    }

    #[test]
    fn test_resolve_builtins() {
        for id in ["identity", "check-hooks-apply", "check-useless-excludes"] {
            let hook = resolve(&spec(id)).unwrap();
            assert_eq!(hook.id, id);
            assert!(hook.always_run);
            assert!(hook.is_meta());
        }
        assert!(resolve(&spec("bogus")).is_err());
    }

    #[test]
    fn test_identity_echoes_and_passes() {
        let (code, output) = identity(&["a.py", "b.py"]);
        assert_eq!(code, 0);
        assert_eq!(output, "a.py\nb.py\n");
    }

    #[test]
    fn test_check_hooks_apply_flags_dead_hook() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();

        let config = Config::from_yaml_str(
            r"
repos:
  - repo: local
    hooks:
      - id: rustfmt
        entry: cargo fmt
        language: system
        types: [rust]
      - id: pyfmt
        entry: black
        language: system
        types: [python]
",
        )
        .unwrap();

        let all_files = vec!["main.rs".to_string()];
        let (code, output) = check_hooks_apply(&config, dir.path(), &all_files).unwrap();
        assert_eq!(code, 1);
        assert!(output.contains("pyfmt does not apply"));
        assert!(!output.contains("rustfmt"));
    }

    #[test]
    fn test_check_hooks_apply_skips_always_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_yaml_str(
            r"
repos:
  - repo: local
    hooks:
      - id: audit
        entry: cargo audit
        language: system
        always_run: true
        files: ^nonexistent$
",
        )
        .unwrap();

        let (code, output) = check_hooks_apply(&config, dir.path(), &[]).unwrap();
        assert_eq!(code, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_check_useless_excludes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kept.py"), "\n").unwrap();

        let config = Config::from_yaml_str(
            r"
repos:
  - repo: local
    hooks:
      - id: lint
        entry: lint
        language: system
        files: '\.py$'
        exclude: ^vendor/
",
        )
        .unwrap();

        // No vendor/ files tracked, so the exclude is useless
        let all_files = vec!["kept.py".to_string()];
        let (code, output) = check_useless_excludes(&config, dir.path(), &all_files).unwrap();
        assert_eq!(code, 1);
        assert!(output.contains("^vendor/"));

        // With a vendored python file the exclude earns its keep
        std::fs::create_dir(dir.path().join("vendor")).unwrap();
        std::fs::write(dir.path().join("vendor/gen.py"), "\n").unwrap();
        let all_files = vec!["kept.py".to_string(), "vendor/gen.py".to_string()];
        let (code, _) = check_useless_excludes(&config, dir.path(), &all_files).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_default_exclude_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_yaml_str(
            r"
repos:
  - repo: local
    hooks:
      - id: lint
        entry: lint
        language: system
",
        )
        .unwrap();
        let (code, output) = check_useless_excludes(&config, dir.path(), &[]).unwrap();
        assert_eq!(code, 0);
        assert!(output.is_empty());
    }
}
