//! File filter combining include/exclude patterns with type tags
//!
//! Each hook carries an optional include regex, an optional exclude regex,
//! and three tag lists. A file passes when, in order: the include regex
//! matches (or is absent), the exclude regex does not match, the file
//! carries all `types` tags, at least one `types_or` tag, and none of the
//! `exclude_types` tags. Patterns are searched against the path relative
//! to the repository root, not anchored.

use crate::config::compile_pattern;
use crate::tags;
use sekisho_core::Result;
use std::collections::HashSet;
use std::path::Path;

/// Compiled per-hook file filter
#[derive(Debug)]
pub struct FileFilter {
    files: Option<regex::Regex>,
    exclude: Option<regex::Regex>,
    types: Vec<String>,
    types_or: Vec<String>,
    exclude_types: Vec<String>,
}

impl FileFilter {
    /// Compile a filter from pattern strings and tag lists
    ///
    /// Empty pattern strings mean "no constraint".
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn new(
        files: &str,
        exclude: &str,
        types: Vec<String>,
        types_or: Vec<String>,
        exclude_types: Vec<String>,
    ) -> Result<Self> {
        Ok(Self {
            files: compile_pattern(files)?,
            exclude: compile_pattern(exclude)?,
            types,
            types_or,
            exclude_types,
        })
    }

    /// A filter with pattern constraints only (the global config filter)
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn patterns_only(files: &str, exclude: &str) -> Result<Self> {
        Self::new(files, exclude, Vec::new(), Vec::new(), Vec::new())
    }

    /// Whether this filter's patterns match a path (tags not considered)
    #[must_use]
    pub fn matches_patterns(&self, path: &str) -> bool {
        if let Some(files) = &self.files
            && !files.is_match(path)
        {
            return false;
        }
        if let Some(exclude) = &self.exclude
            && exclude.is_match(path)
        {
            return false;
        }
        true
    }

    /// Whether a classified file passes the tag constraints
    #[must_use]
    pub fn matches_tags(&self, file_tags: &HashSet<&'static str>) -> bool {
        if !self.types.iter().all(|t| file_tags.contains(t.as_str())) {
            return false;
        }
        if !self.types_or.is_empty()
            && !self.types_or.iter().any(|t| file_tags.contains(t.as_str()))
        {
            return false;
        }
        if self
            .exclude_types
            .iter()
            .any(|t| file_tags.contains(t.as_str()))
        {
            return false;
        }
        true
    }

    /// Whether a repository-relative path passes the whole filter
    ///
    /// Classifies the file only when tag constraints exist.
    #[must_use]
    pub fn matches(&self, root: &Path, path: &str) -> bool {
        if !self.matches_patterns(path) {
            return false;
        }
        if self.types.is_empty() && self.types_or.is_empty() && self.exclude_types.is_empty() {
            return true;
        }
        self.matches_tags(&tags::tags_from_path(root, Path::new(path)))
    }

    /// Filter a file list down to the paths this filter admits
    #[must_use]
    pub fn filter<'a>(&self, root: &Path, files: &'a [String]) -> Vec<&'a str> {
        files
            .iter()
            .map(String::as_str)
            .filter(|path| self.matches(root, path))
            .collect()
    }

    /// Whether the exclude pattern exists and matches the given path
    ///
    /// Used by the `check-useless-excludes` meta hook, which needs to ask
    /// about the exclude in isolation.
    #[must_use]
    pub fn excludes(&self, path: &str) -> bool {
        self.exclude.as_ref().is_some_and(|e| e.is_match(path))
    }
}
