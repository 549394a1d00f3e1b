//! Error types for configuration loading and plan resolution.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two rules claim the same files with nothing to disambiguate them.
    #[error("ambiguous rule dispatch: '{first}' and '{second}' both claim the same files\n\nHint: tighten one pattern or add an 'exclude' to one of the rules")]
    ConfigurationConflict { first: String, second: String },

    #[error("no entry points specified\n\nHint: set 'entry' in packline.toml or pass an entry on the command line")]
    MissingEntryPoint,

    #[error("invalid output template '{template}': unsupported placeholder '[{placeholder}]'")]
    InvalidOutputTemplate { template: String, placeholder: String },

    #[error("invalid match pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("entry path not found: {0}")]
    EntryNotFound(PathBuf),

    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("invalid config value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    #[error("invalid override for environment '{environment}': {message}")]
    InvalidEnvOverride {
        environment: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
