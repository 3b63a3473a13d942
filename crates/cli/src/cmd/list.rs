//! List configured hooks

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use clap::Args;
use owo_colors::OwoColorize;
use sekisho_engine::{HookLoader, Store};

/// List every configured hook after resolution
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format (simple, json)
    #[arg(short, long, default_value = "simple")]
    pub format: String,
}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let store = Store::open_default()?;
        let hooks = HookLoader::new(&context.config, &store).resolve_all()?;

        match self.format.as_str() {
            "json" => {
                println!("{}", serde_json::to_string_pretty(&hooks)?);
            }
            _ => {
                for hook in &hooks {
                    let source = match &hook.rev {
                        Some(rev) => format!("{}@{}", hook.src, rev),
                        None => hook.src.clone(),
                    };
                    let stages = hook
                        .stages
                        .as_deref()
                        .unwrap_or(&context.config.default_stages)
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!(
                        "{}  {}  [{}]  ({})",
                        hook.id.cyan(),
                        hook.name,
                        stages,
                        source.dimmed()
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        cmd: ListCommand,
    }

    #[test]
    fn test_default_format_is_simple() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.cmd.format, "simple");
    }

    #[test]
    fn test_json_format_flag() {
        let cli = TestCli::parse_from(["test", "--format", "json"]);
        assert_eq!(cli.cmd.format, "json");
    }
}
