use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::EnvArg;

/// Available packline subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the configuration and emit assets
    ///
    /// Loads packline.toml, applies the environment overrides for the chosen
    /// environment, resolves an immutable build plan, and executes it.
    Build(BuildArgs),

    /// Start the development server with watch mode
    ///
    /// Builds in development mode, serves the output directory, watches the
    /// source tree, and pushes live-reload events to connected browsers.
    Dev(DevArgs),

    /// Validate the configuration without building
    ///
    /// Loads and resolves packline.toml for the chosen environment and
    /// reports conflicts, invalid templates, and missing entry points.
    Check(CheckArgs),
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Target environment to build for
    ///
    /// Decides which [env.*] overrides apply and flips the production
    /// defaults (minification on, source maps off).
    #[arg(short, long, value_enum, default_value = "production")]
    pub env: EnvArg,

    /// Path to the configuration file
    ///
    /// Defaults to packline.toml discovered in the working directory.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory override
    ///
    /// Takes precedence over output.path from the configuration.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Remove previous output before building
    #[arg(long)]
    pub clean: bool,

    /// Working directory to run in
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the dev command
#[derive(Args, Debug)]
pub struct DevArgs {
    /// Port to bind the dev server to
    ///
    /// Overrides dev.port from the configuration. Use 0 for an OS-assigned
    /// port.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Host to bind the dev server to
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Open the browser once the server is listening
    #[arg(long)]
    pub open: bool,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory to run in
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Environment to resolve the configuration for
    ///
    /// Both environments share one file; checking each separately catches
    /// override-specific mistakes.
    #[arg(short, long, value_enum, default_value = "production")]
    pub env: EnvArg,

    /// Working directory to run in
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}
