//! Hook resolution
//!
//! Turns configuration entries into runnable hooks. A remote entry is
//! resolved against the manifest of its cloned repository, with the
//! configuration's descriptor layered over the manifest definition. Local
//! hooks are built from the descriptor alone; meta hooks come from
//! built-in definitions.

use crate::Store;
use crate::meta;
use sekisho_config::{
    Config, FileFilter, HookSpec, Language, Manifest, ManifestHook, RepoSource, Stage,
};
use sekisho_core::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

/// A fully resolved, runnable hook
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedHook {
    /// Hook id
    pub id: String,
    /// Display name
    pub name: String,
    /// Alternate selection id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Executable entry point
    pub entry: String,
    /// Execution language
    pub language: Language,
    /// Arguments appended before filenames
    pub args: Vec<String>,
    /// Include pattern (empty = all)
    pub files: String,
    /// Exclude pattern (empty = none)
    pub exclude: String,
    /// All-of type tags
    pub types: Vec<String>,
    /// Any-of type tags
    pub types_or: Vec<String>,
    /// None-of type tags
    pub exclude_types: Vec<String>,
    /// Declared extra dependencies (surfaced, not installed)
    pub additional_dependencies: Vec<String>,
    /// Run even with no matching files
    pub always_run: bool,
    /// Pass filenames on the command line
    pub pass_filenames: bool,
    /// Never parallelize invocations
    pub require_serial: bool,
    /// Show output on success too
    pub verbose: bool,
    /// Stage restriction (None = config default_stages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,
    /// Source the hook came from, as written in the config
    pub src: String,
    /// Pinned revision for remote hooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Clone directory for remote hooks
    #[serde(skip)]
    pub repo_dir: Option<PathBuf>,
}

impl ResolvedHook {
    /// Layer a configuration descriptor over a manifest definition
    fn from_manifest(
        base: &ManifestHook,
        spec: &HookSpec,
        src: String,
        rev: Option<String>,
        repo_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone().unwrap_or_else(|| base.name.clone()),
            alias: spec.alias.clone(),
            entry: spec.entry.clone().unwrap_or_else(|| base.entry.clone()),
            language: spec.language.clone().unwrap_or_else(|| base.language.clone()),
            args: if spec.args.is_empty() {
                base.args.clone()
            } else {
                spec.args.clone()
            },
            files: spec.files.clone().unwrap_or_else(|| base.files.clone()),
            exclude: spec.exclude.clone().unwrap_or_else(|| base.exclude.clone()),
            types: if spec.types.is_empty() {
                base.types.clone()
            } else {
                spec.types.clone()
            },
            types_or: if spec.types_or.is_empty() {
                base.types_or.clone()
            } else {
                spec.types_or.clone()
            },
            exclude_types: if spec.exclude_types.is_empty() {
                base.exclude_types.clone()
            } else {
                spec.exclude_types.clone()
            },
            additional_dependencies: if spec.additional_dependencies.is_empty() {
                base.additional_dependencies.clone()
            } else {
                spec.additional_dependencies.clone()
            },
            always_run: spec.always_run.unwrap_or(base.always_run),
            pass_filenames: spec.pass_filenames.unwrap_or(base.pass_filenames),
            require_serial: spec.require_serial.unwrap_or(base.require_serial),
            verbose: spec.verbose.unwrap_or(false),
            stages: spec.stages.clone().or_else(|| base.stages.clone()),
            src,
            rev,
            repo_dir,
        }
    }

    /// Build a hook from a `local` descriptor alone
    ///
    /// Validation guarantees `entry` and `language` are present.
    fn from_local(spec: &HookSpec) -> Result<Self> {
        let entry = spec.entry.clone().ok_or_else(|| {
            Error::Hook(format!("Local hook '{}' is missing 'entry'", spec.id))
        })?;
        let language = spec.language.clone().ok_or_else(|| {
            Error::Hook(format!("Local hook '{}' is missing 'language'", spec.id))
        })?;

        Ok(Self {
            id: spec.id.clone(),
            name: spec.name.clone().unwrap_or_else(|| spec.id.clone()),
            alias: spec.alias.clone(),
            entry,
            language,
            args: spec.args.clone(),
            files: spec.files.clone().unwrap_or_default(),
            exclude: spec.exclude.clone().unwrap_or_default(),
            types: spec.types.clone(),
            types_or: spec.types_or.clone(),
            exclude_types: spec.exclude_types.clone(),
            additional_dependencies: spec.additional_dependencies.clone(),
            always_run: spec.always_run.unwrap_or(false),
            pass_filenames: spec.pass_filenames.unwrap_or(true),
            require_serial: spec.require_serial.unwrap_or(false),
            verbose: spec.verbose.unwrap_or(false),
            stages: spec.stages.clone(),
            src: RepoSource::Local.to_string(),
            rev: None,
            repo_dir: None,
        })
    }

    /// Whether this hook participates in a stage
    #[must_use]
    pub fn runs_at(&self, stage: Stage, default_stages: &[Stage]) -> bool {
        self.stages
            .as_deref()
            .unwrap_or(default_stages)
            .contains(&stage)
    }

    /// Whether a command-line selector names this hook
    #[must_use]
    pub fn matches_selector(&self, selector: &str) -> bool {
        self.id == selector || self.alias.as_deref() == Some(selector)
    }

    /// Compile this hook's file filter
    ///
    /// # Errors
    ///
    /// Returns an error if a `files`/`exclude` pattern does not compile.
    pub fn filter(&self) -> Result<FileFilter> {
        FileFilter::new(
            &self.files,
            &self.exclude,
            self.types.clone(),
            self.types_or.clone(),
            self.exclude_types.clone(),
        )
    }

    /// Whether this hook is one of the built-in meta hooks
    #[must_use]
    pub fn is_meta(&self) -> bool {
        self.src == RepoSource::Meta.to_string()
    }
}

/// Resolves a configuration into runnable hooks
pub struct HookLoader<'a> {
    config: &'a Config,
    store: &'a Store,
}

impl<'a> HookLoader<'a> {
    /// Create a loader over a validated configuration
    #[must_use]
    pub fn new(config: &'a Config, store: &'a Store) -> Self {
        Self { config, store }
    }

    /// Resolve every configured hook, in configuration order
    ///
    /// Remote repositories are cloned into the store on first use. Missing
    /// dependency declarations are surfaced at warn level since sekisho
    /// does not provision environments.
    #[tracing::instrument(skip(self))]
    pub fn resolve_all(&self) -> Result<Vec<ResolvedHook>> {
        let mut resolved = Vec::new();

        for entry in &self.config.repos {
            match &entry.repo {
                RepoSource::Remote(url) => {
                    let rev = entry.rev.as_deref().ok_or_else(|| {
                        Error::Config(format!("Repo '{url}' must pin a revision with 'rev'"))
                    })?;
                    let repo_dir = self.store.get_or_clone(url, rev)?;
                    let manifest = Manifest::load(&repo_dir)?;

                    for spec in &entry.hooks {
                        let base = manifest.find(&spec.id).ok_or_else(|| {
                            Error::Hook(format!(
                                "Hook '{}' not found in {} (available: {})",
                                spec.id,
                                url,
                                manifest.ids().join(", ")
                            ))
                        })?;
                        resolved.push(ResolvedHook::from_manifest(
                            base,
                            spec,
                            url.clone(),
                            Some(rev.to_string()),
                            Some(repo_dir.clone()),
                        ));
                    }
                }
                RepoSource::Local => {
                    for spec in &entry.hooks {
                        resolved.push(ResolvedHook::from_local(spec)?);
                    }
                }
                RepoSource::Meta => {
                    for spec in &entry.hooks {
                        resolved.push(meta::resolve(spec)?);
                    }
                }
            }
        }

        for hook in &resolved {
            if !hook.additional_dependencies.is_empty() {
                tracing::warn!(
                    hook_id = %hook.id,
                    dependencies = ?hook.additional_dependencies,
                    "additional_dependencies are not installed; the hook's \
                     executable must already provide them"
                );
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn manifest_hook() -> ManifestHook {
        serde_yaml::from_str(
            r"
id: flake
name: flake lint
entry: flake-lint
language: system
files: '\.py$'
types: [python]
args: ['--strict']
",
        )
        .unwrap()
    }

    #[test]
    fn test_overrides_layer_over_manifest() {
        let base = manifest_hook();
        let spec: HookSpec = serde_yaml::from_str(
            r"
id: flake
args: ['--relaxed']
exclude: ^migrations/
",
        )
        .unwrap();

        let hook = ResolvedHook::from_manifest(
            &base,
            &spec,
            "https://example.com/hooks".to_string(),
            Some("v1".to_string()),
            None,
        );
        assert_eq!(hook.name, "flake lint");
        assert_eq!(hook.entry, "flake-lint");
        assert_eq!(hook.args, vec!["--relaxed"]);
        assert_eq!(hook.files, r"\.py$");
        assert_eq!(hook.exclude, "^migrations/");
        assert!(hook.pass_filenames);
    }

    #[test]
    fn test_manifest_defaults_survive_empty_spec() {
        let base = manifest_hook();
        let spec = HookSpec {
            id: "flake".to_string(),
            ..HookSpec::default()
        };
        let hook = ResolvedHook::from_manifest(&base, &spec, "src".to_string(), None, None);
        assert_eq!(hook.args, vec!["--strict"]);
        assert_eq!(hook.types, vec!["python"]);
    }

    #[test]
    fn test_local_hook_resolution() {
        let spec: HookSpec = serde_yaml::from_str(
            r"
id: fmt
entry: cargo fmt --
language: system
types: [rust]
pass_filenames: false
",
        )
        .unwrap();
        let hook = ResolvedHook::from_local(&spec).unwrap();
        assert_eq!(hook.name, "fmt");
        assert_eq!(hook.src, "local");
        assert!(!hook.pass_filenames);
    }

    #[test]
    fn test_runs_at_uses_default_stages() {
        let spec: HookSpec =
            serde_yaml::from_str("id: fmt\nentry: x\nlanguage: system").unwrap();
        let mut hook = ResolvedHook::from_local(&spec).unwrap();

        let defaults = vec![Stage::PreCommit];
        assert!(hook.runs_at(Stage::PreCommit, &defaults));
        assert!(!hook.runs_at(Stage::PrePush, &defaults));

        hook.stages = Some(vec![Stage::PrePush]);
        assert!(!hook.runs_at(Stage::PreCommit, &defaults));
        assert!(hook.runs_at(Stage::PrePush, &defaults));
    }

    #[test]
    fn test_selector_matches_id_or_alias() {
        let spec: HookSpec =
            serde_yaml::from_str("id: fmt\nalias: format\nentry: x\nlanguage: system").unwrap();
        let hook = ResolvedHook::from_local(&spec).unwrap();
        assert!(hook.matches_selector("fmt"));
        assert!(hook.matches_selector("format"));
        assert!(!hook.matches_selector("lint"));
    }

    #[test]
    fn test_resolve_all_reports_unknown_hook_id() {
        let remote_dir = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();

        // Reuse the store test fixture shape: one repo with hook id "noop"
        let repo = git2::Repository::init(remote_dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "t").unwrap();
        config.set_str("user.email", "t@example.com").unwrap();
        std::fs::write(
            remote_dir.path().join(".sekisho-hooks.yaml"),
            "- id: noop\n  name: noop\n  entry: 'true'\n  language: system\n",
        )
        .unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_path(std::path::Path::new(".sekisho-hooks.yaml"))
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = repo.signature().unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();

        let url = remote_dir.path().to_str().unwrap();
        let yaml = format!(
            "repos:\n  - repo: {url}\n    rev: HEAD\n    hooks:\n      - id: missing-hook\n"
        );
        let config = Config::from_yaml_str(&yaml).unwrap();
        let store = Store::open(&store_dir.path().join("store")).unwrap();

        let err = HookLoader::new(&config, &store).resolve_all().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing-hook"));
        assert!(message.contains("noop"));
    }
}
