//! Print a starter configuration

use crate::error::Result;
use clap::Args;

/// A minimal configuration to start from
const SAMPLE_CONFIG: &str = r"# See https://github.com/sekisho/sekisho for documentation
repos:
  - repo: meta
    hooks:
      - id: check-hooks-apply
  - repo: local
    hooks:
      - id: fmt
        name: cargo fmt
        entry: cargo fmt --
        language: system
        types: [rust]
        pass_filenames: false
";

/// Print a sample configuration to stdout
#[derive(Debug, Args)]
pub struct SampleConfigCommand {}

impl SampleConfigCommand {
    /// Print the sample
    ///
    /// # Errors
    ///
    /// Infallible in practice; kept for interface consistency.
    pub fn run(&self) -> Result<()> {
        print!("{SAMPLE_CONFIG}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use sekisho_config::Config;

    #[test]
    fn test_sample_config_is_valid() {
        let config = Config::from_yaml_str(SAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
    }
}
