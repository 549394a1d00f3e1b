//! File-based config discovery and layered loading.
//!
//! Finds `packline.toml` in a project root and loads it through a figment
//! stack: built-in defaults, then the file, then `PACKLINE_*` environment
//! variables (nested fields split on `__`, e.g. `PACKLINE_DEV__PORT`).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::debug;

use crate::config::PacklineConfig;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};

/// Conventional config file name.
pub const CONFIG_FILE: &str = "packline.toml";

/// File-based configuration discovery.
///
/// # Example
///
/// ```no_run
/// use packline_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find the config file in the root directory.
    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(CONFIG_FILE);
        path.exists().then_some(path)
    }

    /// Load the discovered config with defaults and environment-variable
    /// layering applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` when no config file exists.
    pub fn load(&self) -> Result<PacklineConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        debug!(path = %path.display(), "loading config");
        Self::extract(Figment::new()
            .merge(Serialized::defaults(PacklineConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PACKLINE_").split("__")))
    }

    /// Load and immediately materialize the `[env.<environment>]` overrides.
    pub fn load_for(&self, environment: Environment) -> Result<PacklineConfig> {
        self.load()?.materialize(environment)
    }

    /// Like [`load`](Self::load) but starting from a specific file path
    /// instead of the conventional name.
    pub fn load_from(&self, path: &Path) -> Result<PacklineConfig> {
        if !path.exists() {
            return Err(ConfigError::NotFound);
        }
        Self::extract(Figment::new()
            .merge(Serialized::defaults(PacklineConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PACKLINE_").split("__")))
    }

    fn extract(figment: Figment) -> Result<PacklineConfig> {
        figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            hint: e.to_string(),
        })
    }
}

/// Discover and load config from the current directory.
pub fn discover() -> Result<PacklineConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(root).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let result = ConfigDiscovery::new(dir.path()).load();
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound));
    }

    #[test]
    fn load_parses_toml_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
entry = ["src/index.js"]

[output]
filename = "js/[name].js"
path = "build"

[[rules]]
test = "*.css"
steps = [{ name = "style" }, { name = "css-load" }]

[dev]
port = 3000
"#,
        )
        .unwrap();

        let config = ConfigDiscovery::new(dir.path()).load().unwrap();
        assert_eq!(config.entry, vec![PathBuf::from("src/index.js")]);
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.dev.port, 3000);
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "entry = \"src/index.js\"\n").unwrap();

        let config = ConfigDiscovery::new(dir.path()).load().unwrap();
        assert_eq!(config.output.path, PathBuf::from("build"));
        assert_eq!(config.src_dir, PathBuf::from("src"));
        assert!(config.dev.compress);
    }
}
