//! Value enums shared by the CLI argument definitions.

use clap::ValueEnum;
use packline_config::Environment;

/// Target environment selector for the `--env` flag.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvArg {
    /// Fast builds, eval source maps, hot reload.
    Development,
    /// Minified output, content hashing, no source maps by default.
    Production,
}

impl From<EnvArg> for Environment {
    fn from(arg: EnvArg) -> Self {
        match arg {
            EnvArg::Development => Environment::Development,
            EnvArg::Production => Environment::Production,
        }
    }
}
