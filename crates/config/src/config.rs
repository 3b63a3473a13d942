//! Configuration file schema
//!
//! The configuration is a flat, ordered list of repository entries. Each
//! entry names a hook source (a remote URL pinned to a revision, `local`,
//! or `meta`) and one or more hook descriptors that select and override
//! hooks defined by that source.

use crate::tags;
use sekisho_core::{Error, Result, Stage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration file names searched at the repository root, in order
pub const CONFIG_FILES: &[&str] = &[".sekisho.yaml", ".sekisho.yml"];

/// Hook ids the built-in `meta` repository provides
pub const META_HOOK_IDS: &[&str] = &["identity", "check-hooks-apply", "check-useless-excludes"];

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Hook repositories, in execution order
    pub repos: Vec<RepoEntry>,

    /// Stages hooks run at when a hook declares none
    #[serde(default = "default_stages")]
    pub default_stages: Vec<Stage>,

    /// Global include pattern applied before per-hook filters (empty = all)
    #[serde(default)]
    pub files: String,

    /// Global exclude pattern applied before per-hook filters
    #[serde(default = "default_exclude")]
    pub exclude: String,

    /// Stop after the first failing hook
    #[serde(default)]
    pub fail_fast: bool,

    /// Accepted for compatibility with configs written for other runners;
    /// logged and otherwise ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos: Vec::new(),
            default_stages: default_stages(),
            files: String::new(),
            exclude: default_exclude(),
            fail_fast: false,
            minimum_version: None,
        }
    }
}

impl Config {
    /// Parse a configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or does not match the schema.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&content)?;

        if let Some(version) = &config.minimum_version {
            tracing::debug!(minimum_version = %version, "Ignoring minimum_version pin");
        }

        Ok(config)
    }

    /// Find the configuration file at a repository root
    ///
    /// Checks [`CONFIG_FILES`] in order and returns the first that exists.
    #[must_use]
    pub fn discover(repo_root: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| repo_root.join(name))
            .find(|path| path.is_file())
    }

    /// Validate the configuration
    ///
    /// Checks the one property the schema promises: every entry is
    /// well-formed, every pattern compiles, and every pin is where the
    /// entry kind requires it. Nothing is cloned or executed.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self) -> Result<()> {
        compile_pattern(&self.files)?;
        compile_pattern(&self.exclude)?;

        if self.repos.is_empty() {
            return Err(Error::Config("Configuration defines no repos".to_string()));
        }

        for entry in &self.repos {
            entry.validate()?;
        }

        Ok(())
    }

    /// Iterate all hook descriptors across entries, in execution order
    pub fn all_hooks(&self) -> impl Iterator<Item = (&RepoEntry, &HookSpec)> {
        self.repos
            .iter()
            .flat_map(|entry| entry.hooks.iter().map(move |hook| (entry, hook)))
    }
}

/// Where an entry's hooks are defined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    /// A remote git repository carrying a hook manifest
    Remote(String),
    /// Hooks defined entirely inline in the configuration
    Local,
    /// Hooks built into sekisho that inspect the configuration itself
    Meta,
}

impl RepoSource {
    /// String form as written in the configuration file
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RepoSource::Remote(url) => url,
            RepoSource::Local => "local",
            RepoSource::Meta => "meta",
        }
    }
}

impl fmt::Display for RepoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RepoSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RepoSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "local" => RepoSource::Local,
            "meta" => RepoSource::Meta,
            _ => RepoSource::Remote(raw),
        })
    }
}

/// One configuration entry: a hook source plus selected hooks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoEntry {
    /// The hook source (`local`, `meta`, or a remote URL)
    pub repo: RepoSource,

    /// Pinned revision; required for remote repos, forbidden otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    /// Hooks selected from this source
    pub hooks: Vec<HookSpec>,
}

impl RepoEntry {
    /// Validate the entry and all of its hook descriptors
    ///
    /// # Errors
    ///
    /// Returns an error for a missing or misplaced `rev`, an empty hook
    /// list, or an invalid hook descriptor.
    pub fn validate(&self) -> Result<()> {
        match (&self.repo, &self.rev) {
            (RepoSource::Remote(url), None) => {
                return Err(Error::Config(format!(
                    "Repo '{url}' must pin a revision with 'rev'"
                )));
            }
            (RepoSource::Remote(url), Some(rev)) if rev.trim().is_empty() => {
                return Err(Error::Config(format!("Repo '{url}' has an empty 'rev'")));
            }
            (RepoSource::Local | RepoSource::Meta, Some(_)) => {
                return Err(Error::Config(format!(
                    "Repo '{}' cannot have a 'rev'",
                    self.repo
                )));
            }
            _ => {}
        }

        if self.hooks.is_empty() {
            return Err(Error::Config(format!(
                "Repo '{}' defines no hooks",
                self.repo
            )));
        }

        for hook in &self.hooks {
            hook.validate(&self.repo)?;
        }

        Ok(())
    }
}

/// A hook descriptor: selects a hook by id and optionally overrides the
/// fields its source manifest declares
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookSpec {
    /// Hook id (required; matches an id in the source's manifest)
    pub id: String,

    /// Display name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Alternate id this hook can be selected by from the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Executable entry point (required for `local` hooks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Execution language (required for `local` hooks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    /// Interpreter version request; recorded, not enforced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,

    /// Extra arguments appended before the filenames
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Include pattern override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,

    /// Exclude pattern override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// File type tags a file must all carry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,

    /// File type tags of which a file must carry at least one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types_or: Vec<String>,

    /// File type tags a file must not carry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_types: Vec<String>,

    /// Extra packages the hook's upstream expects in its environment;
    /// parsed and surfaced, not installed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_dependencies: Vec<String>,

    /// Run even when no files match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_run: Option<bool>,

    /// Pass matched filenames on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_filenames: Option<bool>,

    /// Never parallelize this hook's invocations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_serial: Option<bool>,

    /// Show output even on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Stages this hook runs at (default: the config's `default_stages`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,
}

impl HookSpec {
    /// Validate this descriptor in the context of its source
    ///
    /// # Errors
    ///
    /// Returns an error for an empty id, an unknown meta hook id, a local
    /// hook without `entry`/`language`, or a pattern that does not compile.
    pub fn validate(&self, source: &RepoSource) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Config(format!(
                "Repo '{source}' has a hook with an empty id"
            )));
        }

        match source {
            RepoSource::Local => {
                if self.entry.is_none() {
                    return Err(Error::Config(format!(
                        "Local hook '{}' must define 'entry'",
                        self.id
                    )));
                }
                if self.language.is_none() {
                    return Err(Error::Config(format!(
                        "Local hook '{}' must define 'language'",
                        self.id
                    )));
                }
            }
            RepoSource::Meta => {
                if !META_HOOK_IDS.contains(&self.id.as_str()) {
                    return Err(Error::Config(format!(
                        "Unknown meta hook '{}' (available: {})",
                        self.id,
                        META_HOOK_IDS.join(", ")
                    )));
                }
            }
            RepoSource::Remote(_) => {}
        }

        if let Some(files) = &self.files {
            compile_pattern(files)?;
        }
        if let Some(exclude) = &self.exclude {
            compile_pattern(exclude)?;
        }

        for tag in self
            .types
            .iter()
            .chain(&self.types_or)
            .chain(&self.exclude_types)
        {
            if !tags::is_known_tag(tag) {
                tracing::warn!(
                    hook_id = %self.id,
                    tag = %tag,
                    "Hook filters on a tag sekisho never assigns (typo?)"
                );
            }
        }

        Ok(())
    }
}

/// How a hook's entry point is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Language {
    /// Run the entry as an executable resolved from PATH
    System,
    /// Run a script shipped in the hook repository via its shebang
    Script,
    /// Always fail, printing the entry (filename blocklist idiom)
    Fail,
    /// Grep files for the entry regex; any match fails
    Pygrep,
    /// A language runtime sekisho does not provision; executed like
    /// `system` after a PATH probe
    Other(String),
}

impl Language {
    /// String form as written in configuration and manifests
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Language::System => "system",
            Language::Script => "script",
            Language::Fail => "fail",
            Language::Pygrep => "pygrep",
            Language::Other(name) => name,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "system" => Language::System,
            "script" => Language::Script,
            "fail" => Language::Fail,
            "pygrep" => Language::Pygrep,
            other => Language::Other(other.to_string()),
        })
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(Language::Other(raw)))
    }
}

/// Compile a `files`/`exclude` pattern, mapping failures to [`Error::Pattern`]
///
/// An empty pattern is valid and matches nothing (include) or everything
/// (exclude) depending on where it is used; callers decide.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Option<regex::Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    regex::Regex::new(pattern)
        .map(Some)
        .map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Default stages when neither the hook nor the config restricts them
pub(crate) fn default_stages() -> Vec<Stage> {
    Stage::ALL
        .iter()
        .copied()
        .filter(|stage| stage.installable())
        .collect()
}

/// Default global exclude: matches nothing
pub(crate) fn default_exclude() -> String {
    "^$".to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    const SAMPLE: &str = r"
repos:
  - repo: https://github.com/example/hooks
    rev: v1.2.0
    hooks:
      - id: trailing-whitespace
      - id: check-merge-conflict
        args: [--assume-in-merge]
  - repo: local
    hooks:
      - id: fmt
        name: cargo fmt
        entry: cargo fmt --
        language: system
        types: [rust]
";

    #[test]
    fn test_parse_sample() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.repos.len(), 2);
        assert_eq!(
            config.repos[0].repo,
            RepoSource::Remote("https://github.com/example/hooks".to_string())
        );
        assert_eq!(config.repos[0].rev.as_deref(), Some("v1.2.0"));
        assert_eq!(config.repos[0].hooks.len(), 2);
        assert_eq!(config.repos[1].repo, RepoSource::Local);
        assert_eq!(config.repos[1].hooks[0].language, Some(Language::System));
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("repos: []").unwrap();
        assert_eq!(config.files, "");
        assert_eq!(config.exclude, "^$");
        assert!(!config.fail_fast);
        assert!(!config.default_stages.contains(&Stage::Manual));
    }

    #[test]
    fn test_empty_repos_rejected() {
        let config = Config::from_yaml_str("repos: []").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no repos"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Config::from_yaml_str("repos: []\nrepo_list: []").unwrap_err();
        assert!(err.to_string().contains("repo_list"));
    }

    #[test]
    fn test_remote_requires_rev() {
        let yaml = r"
repos:
  - repo: https://github.com/example/hooks
    hooks:
      - id: some-hook
";
        let config = Config::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must pin a revision"));
    }

    #[test]
    fn test_local_forbids_rev() {
        let yaml = r"
repos:
  - repo: local
    rev: v1.0.0
    hooks:
      - id: fmt
        entry: cargo fmt
        language: system
";
        let config = Config::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot have a 'rev'"));
    }

    #[test]
    fn test_local_requires_entry_and_language() {
        let yaml = r"
repos:
  - repo: local
    hooks:
      - id: fmt
";
        let config = Config::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must define 'entry'"));
    }

    #[test]
    fn test_meta_hook_id_checked() {
        let yaml = r"
repos:
  - repo: meta
    hooks:
      - id: no-such-meta
";
        let config = Config::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Unknown meta hook"));
    }

    #[test]
    fn test_meta_hooks_accepted() {
        let yaml = r"
repos:
  - repo: meta
    hooks:
      - id: identity
      - id: check-hooks-apply
      - id: check-useless-excludes
";
        let config = Config::from_yaml_str(yaml).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_bad_regex_rejected() {
        let yaml = r"
repos:
  - repo: local
    hooks:
      - id: fmt
        entry: cargo fmt
        language: system
        exclude: '(['
";
        let config = Config::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
        assert!(err.to_string().contains("(["));
    }

    #[test]
    fn test_empty_hook_id_rejected() {
        let yaml = r"
repos:
  - repo: local
    hooks:
      - id: ''
        entry: echo
        language: system
";
        let config = Config::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("empty id"));
    }

    #[test]
    fn test_language_pass_through() {
        let lang: Language = "python".parse().unwrap();
        assert_eq!(lang, Language::Other("python".to_string()));
        assert_eq!(lang.as_str(), "python");
    }

    #[test]
    fn test_repo_source_serde_round_trip() {
        for (text, source) in [
            ("local", RepoSource::Local),
            ("meta", RepoSource::Meta),
            (
                "https://github.com/psf/black",
                RepoSource::Remote("https://github.com/psf/black".to_string()),
            ),
        ] {
            let parsed: RepoSource = serde_yaml::from_str(text).unwrap();
            assert_eq!(parsed, source);
            assert_eq!(serde_yaml::to_string(&source).unwrap().trim(), text);
        }
    }

    #[test]
    fn test_hook_spec_full_fields() {
        let yaml = r"
id: flake8
args: ['--max-line-length=88']
exclude: ^tests/fixtures/
additional_dependencies: [flake8-bugbear]
require_serial: true
stages: [pre-commit, pre-push]
";
        let spec: HookSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.args, vec!["--max-line-length=88"]);
        assert_eq!(spec.additional_dependencies, vec!["flake8-bugbear"]);
        assert_eq!(spec.require_serial, Some(true));
        spec.validate(&RepoSource::Remote("x".to_string())).unwrap();
        assert_eq!(
            spec.stages.unwrap(),
            vec![Stage::PreCommit, Stage::PrePush]
        );
    }

    #[test]
    fn test_discover_prefers_yaml_over_yml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".sekisho.yml"), "repos: []").unwrap();
        assert!(
            Config::discover(dir.path())
                .unwrap()
                .ends_with(".sekisho.yml")
        );

        std::fs::write(dir.path().join(".sekisho.yaml"), "repos: []").unwrap();
        assert!(
            Config::discover(dir.path())
                .unwrap()
                .ends_with(".sekisho.yaml")
        );
    }
}
