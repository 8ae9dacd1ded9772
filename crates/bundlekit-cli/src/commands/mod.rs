//! CLI command definitions and dispatch.

pub mod reduce;
pub mod render;

use std::path::Path;

use bundlekit_common::error::BundleError;
use bundlekit_common::warning::Warning;
use bundlekit_compose::Document;
use clap::{Parser, Subcommand};

/// Reduce and render deployment bundles.
#[derive(Parser, Debug)]
#[command(name = "bundlekit", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Log level when `RUST_LOG` is not set.
    #[arg(short = 'l', long, global = true, default_value = "info")]
    pub log_level: String,

    /// Enable debug logging (same as `--log-level debug`).
    #[arg(long, global = true)]
    pub debug: bool,
}

impl Cli {
    /// Filter directive for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> String {
        if self.debug {
            "debug".to_string()
        } else {
            self.log_level.to_ascii_lowercase()
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a subset of services (and their relations) from a bundle.
    Reduce(reduce::ReduceArgs),
    /// Render a deployable bundle: resolve a target, set charm urls and
    /// origins, and layer override files.
    Render(render::RenderArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Reduce(args) => reduce::execute(args),
        Command::Render(args) => render::execute(args),
    }
}

/// Reads and parses an input document.
///
/// # Errors
///
/// Returns [`BundleError::InputNotFound`] if `path` is not a file, or the
/// read/parse error otherwise.
pub fn load_document(path: &Path) -> Result<Document, BundleError> {
    let text = read_input(path)?;
    Document::parse(&text)
}

/// Reads an input file as text.
///
/// # Errors
///
/// Returns [`BundleError::InputNotFound`] if `path` is not a file.
pub fn read_input(path: &Path) -> Result<String, BundleError> {
    if !path.is_file() {
        return Err(BundleError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    tracing::info!(path = %path.display(), "reading input file");
    std::fs::read_to_string(path).map_err(|e| BundleError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Splits a comma-separated service list, dropping blanks.
pub fn split_services(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Logs a summary line for collected warnings.
pub fn report_warnings(warnings: &[Warning]) {
    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "completed with warnings");
    }
}
