//! Logging configuration for the sekisho CLI
//!
//! Terminal output and optional file logging using tracing.

use crate::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging
/// * `log_file` - Optional path to write logs to a file
///
/// The `RUST_LOG` environment variable overrides the computed filter.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "sekisho={level},sekisho_config={level},sekisho_engine={level}"
            ))
        })
        .expect("failed to create default env filter");

    // Build different subscribers based on verbose mode and log file
    match (verbose, log_file) {
        (true, Some(log_path)) => {
            let stdout_layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_filter(env_filter);

            let file_layer = file_layer(log_path)?;

            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(file_layer)
                .init();
        }
        (true, None) => {
            let stdout_layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_filter(env_filter);

            tracing_subscriber::registry().with(stdout_layer).init();
        }
        (false, Some(log_path)) => {
            let stdout_layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .without_time() // No timestamps in normal mode
                .compact()
                .with_ansi(true)
                .with_filter(env_filter);

            let file_layer = file_layer(log_path)?;

            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(file_layer)
                .init();
        }
        (false, None) => {
            let stdout_layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .without_time() // No timestamps in normal mode
                .compact()
                .with_ansi(true)
                .with_filter(env_filter);

            tracing_subscriber::registry().with(stdout_layer).init();
        }
    }

    Ok(())
}

/// A pretty debug-level layer appending to `log_path`
fn file_layer<S>(log_path: &Path) -> std::io::Result<impl Layer<S>>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    Ok(fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .with_filter(EnvFilter::try_new("debug").expect("'debug' is a valid filter")))
}
