//! Build environment selection.
//!
//! The environment is always passed explicitly to [`resolve`](crate::plan::resolve);
//! nothing in this crate reads or writes a process-wide mode flag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which variant of the configuration to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Watch mode, dev server, cheap inline source maps, no minification.
    #[default]
    Development,
    /// One-shot build, hashed artifacts, minified markup and styles.
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(crate::error::ConfigError::InvalidValue {
                field: "environment".to_string(),
                hint: format!("'{other}' is not an environment; use 'development' or 'production'"),
            }),
        }
    }
}
