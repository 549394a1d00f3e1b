//! Error handling for the packline CLI.
//!
//! Configuration-time errors come from `packline-config` and abort before
//! anything touches the filesystem. Execution-time errors ([`BuildError`])
//! happen while a plan is being carried out. Both funnel into [`CliError`]
//! and are rendered as miette diagnostics at the binary boundary.

use std::path::PathBuf;

use packline_config::ConfigError;
use thiserror::Error;

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Plan-execution errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A file the plan references is missing at execution time.
    #[error("asset not found: {}\n\nHint: the file was referenced by the build but does not exist", .0.display())]
    AssetNotFound(PathBuf),

    /// A processing step failed for one file.
    #[error("transform '{step}' failed for {}: {error}", .file.display())]
    TransformFailure {
        file: PathBuf,
        step: String,
        error: String,
    },

    /// No rule claimed the file and the config says that is fatal.
    #[error("no rule matched {}\n\nHint: add a matching rule or set unmatched = \"warn\"", .0.display())]
    Unmatched(PathBuf),

    #[error("output directory is not writable: {}", .0.display())]
    OutputNotWritable(PathBuf),

    #[error("failed to write asset {}: {error}", .path.display())]
    AssetWriteFailed { path: PathBuf, error: String },
}

/// Convert a `CliError` into a miette report for terminal rendering.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Build(e) => build_error_to_miette(e),
        other => miette::miette!("{}", other),
    }
}

fn build_error_to_miette(err: BuildError) -> miette::Report {
    match err {
        BuildError::TransformFailure { file, step, error } => miette::miette!(
            "Transform '{}' failed for {}: {}",
            step,
            file.display(),
            error
        ),
        other => miette::miette!("{}", other),
    }
}
