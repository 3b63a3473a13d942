//! Hook repository store
//!
//! Remote hook repositories are cloned once per `(url, rev)` pair into a
//! cache directory and reused across runs. A small redb database indexes
//! clone directories so lookups never depend on directory naming staying
//! stable.

use crate::git::git_err;
use redb::{Database, ReadableDatabase, TableDefinition};
use sekisho_core::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Maps `url@rev` to the clone's directory name under the store root
const REPOS_TABLE: TableDefinition<'static, &str, &str> = TableDefinition::new("repos");

/// Environment variable overriding the store location
pub const STORE_ENV: &str = "SEKISHO_HOME";

/// Clone cache for remote hook repositories
pub struct Store {
    root: PathBuf,
    db: Database,
}

impl Store {
    /// Open (creating if needed) the store at the default location
    ///
    /// `$SEKISHO_HOME` wins, then `~/.cache/sekisho`.
    pub fn open_default() -> Result<Self> {
        let root = std::env::var_os(STORE_ENV).map_or_else(
            || {
                dirs::cache_dir()
                    .map(|cache| cache.join("sekisho"))
                    .ok_or_else(|| Error::Store("Could not determine cache directory".to_string()))
            },
            |home| Ok(PathBuf::from(home)),
        )?;
        Self::open(&root)
    }

    /// Open (creating if needed) the store at a specific root
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)
            .map_err(|e| Error::Store(format!("Failed to create {}: {}", root.display(), e)))?;

        let db = Database::create(root.join("store.db"))
            .map_err(|e| Error::Store(format!("Failed to open store index: {e}")))?;

        // Create the table up front so reads never race its existence
        let txn = db
            .begin_write()
            .map_err(|e| Error::Store(e.to_string()))?;
        txn.open_table(REPOS_TABLE)
            .map_err(|e| Error::Store(e.to_string()))?;
        txn.commit().map_err(|e| Error::Store(e.to_string()))?;

        Ok(Self {
            root: root.to_path_buf(),
            db,
        })
    }

    /// The store root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up an existing clone for `(url, rev)`
    pub fn get(&self, url: &str, rev: &str) -> Result<Option<PathBuf>> {
        let key = store_key(url, rev);
        let txn = self
            .db
            .begin_read()
            .map_err(|e| Error::Store(e.to_string()))?;
        let table = txn
            .open_table(REPOS_TABLE)
            .map_err(|e| Error::Store(e.to_string()))?;

        let Some(dir_name) = table
            .get(key.as_str())
            .map_err(|e| Error::Store(e.to_string()))?
            .map(|guard| guard.value().to_string())
        else {
            return Ok(None);
        };

        let path = self.root.join(dir_name);
        if path.is_dir() {
            Ok(Some(path))
        } else {
            // Index entry survived a manual deletion; treat as absent
            tracing::debug!(url, rev, "Store index points at a missing clone");
            Ok(None)
        }
    }

    /// Return the clone for `(url, rev)`, cloning it first if needed
    ///
    /// The clone is checked out detached at the pinned revision and never
    /// updated afterwards.
    #[tracing::instrument(skip(self))]
    pub fn get_or_clone(&self, url: &str, rev: &str) -> Result<PathBuf> {
        if let Some(path) = self.get(url, rev)? {
            tracing::debug!(path = %path.display(), "Using cached hook repository");
            return Ok(path);
        }

        let key = store_key(url, rev);
        let dir_name = digest_hex(&key);
        let target = self.root.join(&dir_name);

        tracing::info!(url, rev, "Cloning hook repository");
        if let Err(e) = clone_at_rev(url, rev, &target) {
            // Leave no partial clone behind
            let _ = fs::remove_dir_all(&target);
            return Err(e);
        }

        let txn = self
            .db
            .begin_write()
            .map_err(|e| Error::Store(e.to_string()))?;
        {
            let mut table = txn
                .open_table(REPOS_TABLE)
                .map_err(|e| Error::Store(e.to_string()))?;
            table
                .insert(key.as_str(), dir_name.as_str())
                .map_err(|e| Error::Store(e.to_string()))?;
        }
        txn.commit().map_err(|e| Error::Store(e.to_string()))?;

        Ok(target)
    }

    /// Delete the entire store, clones and index alike
    pub fn clean(self) -> Result<()> {
        let root = self.root;
        drop(self.db);
        fs::remove_dir_all(&root)
            .map_err(|e| Error::Store(format!("Failed to remove {}: {}", root.display(), e)))?;
        Ok(())
    }
}

fn store_key(url: &str, rev: &str) -> String {
    format!("{url}@{rev}")
}

fn digest_hex(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn clone_at_rev(url: &str, rev: &str, target: &Path) -> Result<()> {
    let repo = git2::Repository::clone(url, target)
        .map_err(|e| Error::Store(format!("Failed to clone {url}: {e}")))?;

    let object = repo
        .revparse_single(rev)
        .map_err(|e| Error::Store(format!("Revision '{rev}' not found in {url}: {e}")))?;
    // A tag object must be peeled to the commit it points at
    let commit = object
        .peel(git2::ObjectType::Commit)
        .map_err(git_err)?;

    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(&commit, Some(&mut checkout))
        .map_err(git_err)?;
    repo.set_head_detached(commit.id()).map_err(git_err)?;

    Ok(())
}
