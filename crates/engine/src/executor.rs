//! Hook execution
//!
//! Filters the candidate file list per hook, builds command lines, and
//! runs them. Filenames are chunked to keep command lines under a fixed
//! budget; chunks run in parallel unless the hook requires serial
//! execution. A hook that modifies files it was given is reported as
//! failed even when it exits zero, so a rerun sees the fixed tree.

use crate::loader::ResolvedHook;
use crate::meta;
use indexmap::IndexMap;
use rayon::prelude::*;
use sekisho_config::{Config, FileFilter, Language};
use sekisho_core::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::{Duration, Instant};

/// Combined length budget for filenames in one invocation
const ARG_CHUNK_BYTES: usize = 32 * 1024;

/// Environment variable set for every hook subprocess
const HOOK_ENV: &str = "SEKISHO";

/// How a hook run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Exit code zero and no files modified
    Passed,
    /// Nonzero exit code, or files modified
    Failed {
        /// The process exit code (1 for native failures)
        code: i32,
    },
    /// The hook did not run
    Skipped {
        /// Why it was skipped
        reason: String,
    },
}

impl HookOutcome {
    /// Whether this outcome blocks the commit
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, HookOutcome::Failed { .. })
    }
}

/// The result of running one hook
#[derive(Debug)]
pub struct HookResult {
    /// Hook id
    pub hook_id: String,
    /// Display name
    pub name: String,
    /// How the run ended
    pub outcome: HookOutcome,
    /// Captured stdout and stderr, interleaved
    pub output: String,
    /// Wall-clock duration
    pub duration: Duration,
    /// Whether the hook modified any file it was given
    pub files_modified: bool,
}

/// Runs resolved hooks against a candidate file list
pub struct HookRunner<'a> {
    root: &'a Path,
    config: &'a Config,
    /// Candidate files after the global include/exclude filter
    files: Vec<String>,
    /// Every tracked file, for hooks that reason over the whole repository
    all_files: Vec<String>,
    env: IndexMap<String, String>,
}

impl<'a> HookRunner<'a> {
    /// Build a runner over candidate files
    ///
    /// The configuration's global `files`/`exclude` patterns are applied
    /// here; per-hook filters are applied per run.
    ///
    /// # Errors
    ///
    /// Returns an error if a global pattern fails to compile.
    pub fn new(
        root: &'a Path,
        config: &'a Config,
        candidates: Vec<String>,
        all_files: Vec<String>,
    ) -> Result<Self> {
        let global = FileFilter::patterns_only(&config.files, &config.exclude)?;
        let files = candidates
            .into_iter()
            .filter(|path| global.matches_patterns(path))
            .collect();

        let mut env: IndexMap<String, String> = std::env::vars().collect();
        env.insert(HOOK_ENV.to_string(), "1".to_string());

        Ok(Self {
            root,
            config,
            files,
            all_files,
            env,
        })
    }

    /// The candidate files after global filtering
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Run hooks in order, honoring `fail_fast`
    ///
    /// # Errors
    ///
    /// Returns an error only for engine-level failures (bad patterns,
    /// unreadable files); hook failures are reported in the results.
    pub fn run_all(&self, hooks: &[ResolvedHook]) -> Result<Vec<HookResult>> {
        let mut results = Vec::with_capacity(hooks.len());
        for hook in hooks {
            let result = self.run_hook(hook)?;
            let failed = result.outcome.is_failure();
            results.push(result);
            if failed && self.config.fail_fast {
                tracing::debug!("Stopping after first failure (fail_fast)");
                break;
            }
        }
        Ok(results)
    }

    /// Run a single hook
    ///
    /// # Errors
    ///
    /// Returns an error if the hook's patterns fail to compile or file
    /// digests cannot be computed.
    #[tracing::instrument(skip(self, hook), fields(hook_id = %hook.id))]
    pub fn run_hook(&self, hook: &ResolvedHook) -> Result<HookResult> {
        let start = Instant::now();
        let filter = hook.filter()?;
        let matched = filter.filter(self.root, &self.files);

        if matched.is_empty() && !hook.always_run {
            return Ok(HookResult {
                hook_id: hook.id.clone(),
                name: hook.name.clone(),
                outcome: HookOutcome::Skipped {
                    reason: "no files to check".to_string(),
                },
                output: String::new(),
                duration: start.elapsed(),
                files_modified: false,
            });
        }

        let files: &[&str] = if hook.pass_filenames { &matched } else { &[] };

        // Digest the matched set, not the passed argv: a hook that takes no
        // filenames can still rewrite the files its filter selected
        let before = digest_files(self.root, &matched)?;
        let (code, output) = self.dispatch(hook, files)?;
        let files_modified = digest_files(self.root, &matched)? != before;

        let outcome = if code == 0 && !files_modified {
            HookOutcome::Passed
        } else if code == 0 {
            // Exit zero but the tree changed: a formatter fixed files.
            // Report failure so the user restages and reruns.
            HookOutcome::Failed { code: 1 }
        } else {
            HookOutcome::Failed { code }
        };

        Ok(HookResult {
            hook_id: hook.id.clone(),
            name: hook.name.clone(),
            outcome,
            output,
            duration: start.elapsed(),
            files_modified,
        })
    }

    /// Execute the hook's entry according to its language
    fn dispatch(&self, hook: &ResolvedHook, files: &[&str]) -> Result<(i32, String)> {
        if hook.is_meta() {
            return meta::run(hook, self.config, self.root, &self.all_files, files);
        }

        match &hook.language {
            Language::Fail => Ok(run_fail(hook, files)),
            Language::Pygrep => run_pygrep(self.root, hook, files),
            Language::Script => {
                let entry = script_entry(hook)?;
                self.run_command(hook, &[entry], files)
            }
            Language::System => {
                let argv = split_entry(hook)?;
                self.run_command(hook, &argv, files)
            }
            Language::Other(name) => {
                let argv = split_entry(hook)?;
                if which::which(&argv[0]).is_err() {
                    tracing::warn!(
                        hook_id = %hook.id,
                        language = %name,
                        program = %argv[0],
                        "Language runtimes are not managed; '{}' must already \
                         be on PATH",
                        argv[0]
                    );
                }
                self.run_command(hook, &argv, files)
            }
        }
    }

    /// Run `argv ++ args ++ <filename chunk>` for each chunk
    ///
    /// Chunks run in parallel unless the hook requires serial execution.
    /// The first nonzero exit code wins; outputs are concatenated in
    /// chunk order either way.
    fn run_command(
        &self,
        hook: &ResolvedHook,
        argv: &[String],
        files: &[&str],
    ) -> Result<(i32, String)> {
        let chunks = chunk_files(files, ARG_CHUNK_BYTES);

        let run_chunk = |chunk: &[&str]| -> (i32, String) {
            let mut full: Vec<&str> = argv.iter().map(String::as_str).collect();
            full.extend(hook.args.iter().map(String::as_str));
            full.extend(chunk);
            self.spawn(hook, &full)
        };

        let outputs: Vec<(i32, String)> = if hook.require_serial || chunks.len() == 1 {
            chunks.iter().map(|chunk| run_chunk(chunk)).collect()
        } else {
            chunks.par_iter().map(|chunk| run_chunk(chunk)).collect()
        };

        let code = outputs
            .iter()
            .map(|(code, _)| *code)
            .find(|&code| code != 0)
            .unwrap_or(0);
        let output = outputs.into_iter().map(|(_, out)| out).collect();
        Ok((code, output))
    }

    /// Spawn one invocation, capturing interleaved stdout and stderr
    fn spawn(&self, hook: &ResolvedHook, full_argv: &[&str]) -> (i32, String) {
        let (program, args) = match full_argv.split_first() {
            Some(split) => split,
            None => return (1, "hook has an empty command line\n".to_string()),
        };

        let mut expr = duct::cmd(*program, args.iter().copied())
            .dir(self.root)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked();

        for (key, value) in &self.env {
            expr = expr.env(key, value);
        }
        // Remote hook repositories may ship helper executables next to
        // their entry point
        if let Some(repo_dir) = &hook.repo_dir {
            expr = expr.env("PATH", prepend_path(repo_dir, self.env.get("PATH")));
        }

        match expr.run() {
            Ok(result) => {
                let code = result.status.code().unwrap_or(1);
                (code, String::from_utf8_lossy(&result.stdout).into_owned())
            }
            Err(e) => (1, format!("failed to run '{program}': {e}\n")),
        }
    }
}

/// Split a hook entry into argv with shell-style quoting
fn split_entry(hook: &ResolvedHook) -> Result<Vec<String>> {
    let argv = shell_words::split(&hook.entry)
        .map_err(|e| Error::Execution(format!("Bad entry for hook '{}': {}", hook.id, e)))?;
    if argv.is_empty() {
        return Err(Error::Execution(format!(
            "Hook '{}' has an empty entry",
            hook.id
        )));
    }
    Ok(argv)
}

/// Resolve a `script` entry against its repository clone
///
/// The script runs directly; the kernel honors its shebang.
fn script_entry(hook: &ResolvedHook) -> Result<String> {
    let repo_dir = hook.repo_dir.as_ref().ok_or_else(|| {
        Error::Execution(format!(
            "Script hook '{}' requires a hook repository",
            hook.id
        ))
    })?;
    let path = repo_dir.join(&hook.entry);
    path.to_str().map(str::to_string).ok_or_else(|| {
        Error::Execution(format!("Non-UTF-8 script path for hook '{}'", hook.id))
    })
}

/// `fail` language: always fail, printing the entry and the offending files
fn run_fail(hook: &ResolvedHook, files: &[&str]) -> (i32, String) {
    let mut output = String::new();
    output.push_str(&hook.entry);
    output.push('\n');
    for file in files {
        output.push_str(file);
        output.push('\n');
    }
    (1, output)
}

/// `pygrep` language: the entry is a regex; any matching line fails
fn run_pygrep(root: &Path, hook: &ResolvedHook, files: &[&str]) -> Result<(i32, String)> {
    let pattern = regex::Regex::new(&hook.entry).map_err(|source| Error::Pattern {
        pattern: hook.entry.clone(),
        source,
    })?;

    let mut output = String::new();
    let mut code = 0;
    for file in files {
        let Ok(content) = std::fs::read_to_string(root.join(file)) else {
            // Binary or unreadable files cannot match a line regex
            continue;
        };
        for (number, line) in content.lines().enumerate() {
            if pattern.is_match(line) {
                output.push_str(&format!("{}:{}:{}\n", file, number + 1, line));
                code = 1;
            }
        }
    }
    Ok((code, output))
}

/// Group filenames into chunks whose combined length stays under `budget`
///
/// A single over-long filename still gets its own chunk. An empty file
/// list yields one empty chunk so the hook runs exactly once.
fn chunk_files<'f>(files: &[&'f str], budget: usize) -> Vec<Vec<&'f str>> {
    if files.is_empty() {
        return vec![Vec::new()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for file in files {
        let len = file.len() + 1;
        if !current.is_empty() && current_len + len > budget {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push(file);
        current_len += len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Digest the contents of each file, in order
///
/// Missing files digest to a marker so deletion counts as modification.
fn digest_files(root: &Path, files: &[&str]) -> Result<Vec<[u8; 32]>> {
    files
        .iter()
        .map(|file| {
            let path = root.join(file);
            match std::fs::read(&path) {
                Ok(content) => Ok(Sha256::digest(&content).into()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Ok(Sha256::digest(b"\0missing").into())
                }
                Err(e) => Err(Error::Execution(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                ))),
            }
        })
        .collect()
}

fn prepend_path(dir: &Path, existing: Option<&String>) -> String {
    match existing {
        Some(path) => format!("{}:{}", dir.display(), path),
        None => dir.display().to_string(),
    }
}
