//! Pluggable config validation strategies.
//!
//! Schema validation checks the configuration in isolation; filesystem
//! validation additionally checks that referenced paths exist. Resolution
//! runs schema-level checks itself; the CLI runs the filesystem pass before
//! executing a plan.

use std::path::{Path, PathBuf};

use crate::config::PacklineConfig;
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies.
pub trait ConfigValidator {
    fn validate(&self, config: &PacklineConfig) -> Result<()>;
}

/// Schema-only validation, no filesystem access.
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &PacklineConfig) -> Result<()> {
        if config.entry.is_empty() {
            return Err(ConfigError::MissingEntryPoint);
        }

        config.rules.validate()?;

        for rule in config.rules.iter() {
            for step in &rule.steps {
                if step.name.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "rules.steps.name".to_string(),
                        hint: format!(
                            "rule '{}' has a processor step with an empty name",
                            rule.display_name()
                        ),
                    });
                }
            }
        }

        for plugin in &config.plugins {
            if plugin.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "plugins.name".to_string(),
                    hint: "plugin names cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Filesystem validator for CLI use: schema checks plus existence of entry
/// points and the source root.
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &PacklineConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        for entry in &config.entry {
            let path = self.root.join(entry);
            if !path.exists() {
                return Err(ConfigError::EntryNotFound(path));
            }
        }

        let src = self.root.join(&config.src_dir);
        if !src.exists() {
            return Err(ConfigError::InvalidValue {
                field: "src_dir".to_string(),
                hint: format!("source directory does not exist: {}", src.display()),
            });
        }

        Ok(())
    }
}
