//! Remove the hook repository store

use crate::error::Result;
use clap::Args;
use sekisho_engine::Store;

/// Delete all cached hook repository clones
#[derive(Debug, Args)]
pub struct CleanCommand {}

impl CleanCommand {
    /// Remove the store directory and its index
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or removed.
    pub fn run(&self) -> Result<()> {
        let store = Store::open_default()?;
        let root = store.root().to_path_buf();
        store.clean()?;
        println!("Removed {}", root.display());
        Ok(())
    }
}
