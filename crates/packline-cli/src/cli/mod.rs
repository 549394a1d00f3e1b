//! Command-line interface definition for the packline CLI.
//!
//! The complete CLI structure via clap v4 derive macros.
//!
//! # Command Structure
//!
//! - `packline build` - Resolve the configuration and emit assets
//! - `packline dev` - Development server with watch mode and live reload
//! - `packline check` - Validate the configuration without building

mod commands;
pub mod enums;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, DevArgs};
pub use enums::*;

/// Packline - environment-aware build configuration and asset pipeline
#[derive(Parser, Debug)]
#[command(
    name = "packline",
    version,
    about = "Environment-aware build configuration and asset pipeline",
    long_about = "Packline resolves a declarative packline.toml into an immutable build plan\n\
                  for a chosen environment (development or production), then executes it:\n\
                  routing files through processor chains, inlining small assets, and\n\
                  emitting content-addressed output."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows detailed information about rule dispatch, environment
    /// overrides, and emitted assets.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    ///
    /// Useful for CI environments or when piping output elsewhere.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
