//! Hook repository manifest schema
//!
//! A hook repository advertises the hooks it ships in a manifest file at
//! its root. Configuration entries select hooks from the manifest by id
//! and may override most fields.

use crate::config::{Language, compile_pattern};
use sekisho_core::{Error, Result, Stage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Manifest file names searched at a hook repository root, in order
pub const MANIFEST_FILES: &[&str] = &[".sekisho-hooks.yaml", ".sekisho-hooks.yml"];

/// A hook repository manifest: the hooks the repository provides
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Hook definitions, in manifest order
    pub hooks: Vec<ManifestHook>,
}

impl Manifest {
    /// Parse a manifest from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or does not match the schema.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let hooks: Vec<ManifestHook> =
            serde_yaml::from_str(content).map_err(|e| Error::Manifest(e.to_string()))?;
        Ok(Self { hooks })
    }

    /// Load the manifest from a hook repository directory
    ///
    /// # Errors
    ///
    /// Returns an error if no manifest file exists or parsing fails.
    pub fn load(repo_dir: &Path) -> Result<Self> {
        let path = MANIFEST_FILES
            .iter()
            .map(|name| repo_dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                Error::Manifest(format!(
                    "No {} found in {}",
                    MANIFEST_FILES[0],
                    repo_dir.display()
                ))
            })?;

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Manifest(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Validate every hook definition
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self) -> Result<()> {
        if self.hooks.is_empty() {
            return Err(Error::Manifest("Manifest defines no hooks".to_string()));
        }
        for hook in &self.hooks {
            hook.validate()?;
        }
        Ok(())
    }

    /// Find a hook definition by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ManifestHook> {
        self.hooks.iter().find(|hook| hook.id == id)
    }

    /// All hook ids the manifest defines, in order
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.id.as_str()).collect()
    }
}

/// One hook definition in a repository manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestHook {
    /// Hook id configuration entries select by
    pub id: String,

    /// Human-readable name shown in run output
    pub name: String,

    /// Executable entry point
    pub entry: String,

    /// Execution language
    pub language: Language,

    /// One-line description of what the hook checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Include pattern (empty = all files)
    #[serde(default)]
    pub files: String,

    /// Exclude pattern (empty = nothing excluded)
    #[serde(default)]
    pub exclude: String,

    /// File type tags a file must all carry
    #[serde(default)]
    pub types: Vec<String>,

    /// File type tags of which a file must carry at least one
    #[serde(default)]
    pub types_or: Vec<String>,

    /// File type tags a file must not carry
    #[serde(default)]
    pub exclude_types: Vec<String>,

    /// Default arguments, overridable from the configuration
    #[serde(default)]
    pub args: Vec<String>,

    /// Run even when no files match
    #[serde(default)]
    pub always_run: bool,

    /// Pass matched filenames on the command line
    #[serde(default = "default_true")]
    pub pass_filenames: bool,

    /// Never parallelize this hook's invocations
    #[serde(default)]
    pub require_serial: bool,

    /// Stages this hook runs at (default: the config's `default_stages`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,

    /// Extra packages the hook's upstream expects in its environment
    #[serde(default)]
    pub additional_dependencies: Vec<String>,

    /// Interpreter version request; recorded, not enforced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,
}

impl ManifestHook {
    /// Validate this hook definition
    ///
    /// # Errors
    ///
    /// Returns an error for an empty id/name/entry or a pattern that does
    /// not compile.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Manifest("Hook with an empty id".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Manifest(format!("Hook '{}' has an empty name", self.id)));
        }
        if self.entry.trim().is_empty() {
            return Err(Error::Manifest(format!(
                "Hook '{}' has an empty entry",
                self.id
            )));
        }

        compile_pattern(&self.files)?;
        compile_pattern(&self.exclude)?;

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    const SAMPLE: &str = r"
- id: trailing-whitespace
  name: trim trailing whitespace
  entry: trailing-whitespace-fixer
  language: system
  types: [text]
- id: forbid-tabs
  name: forbid tabs
  entry: '\t'
  language: pygrep
  types: [text]
";

    #[test]
    fn test_parse_and_find() {
        let manifest = Manifest::from_yaml_str(SAMPLE).unwrap();
        manifest.validate().unwrap();
        assert_eq!(manifest.ids(), vec!["trailing-whitespace", "forbid-tabs"]);

        let hook = manifest.find("forbid-tabs").unwrap();
        assert_eq!(hook.language, Language::Pygrep);
        assert!(hook.pass_filenames);
        assert!(!hook.always_run);
        assert!(manifest.find("missing").is_none());
    }

    #[test]
    fn test_empty_manifest_rejected() {
        let manifest = Manifest::from_yaml_str("[]").unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("no hooks"));
    }

    #[test]
    fn test_missing_required_field() {
        // name is required
        let err = Manifest::from_yaml_str("- id: x\n  entry: y\n  language: system").unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_empty_entry_rejected() {
        let yaml = "- id: x\n  name: x\n  entry: ' '\n  language: system";
        let manifest = Manifest::from_yaml_str(yaml).unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("empty entry"));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let yaml = "- id: x\n  name: x\n  entry: y\n  language: system\n  files: '(['";
        let manifest = Manifest::from_yaml_str(yaml).unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".sekisho-hooks.yaml"), SAMPLE).unwrap();
        let manifest = Manifest::load(dir.path()).unwrap();
        assert_eq!(manifest.hooks.len(), 2);
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(".sekisho-hooks.yaml"));
    }
}
