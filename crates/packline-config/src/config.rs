//! Top-level configuration structure.
//!
//! One `packline.toml` describes both environments; the `[env.<name>]`
//! tables hold per-environment overrides that are deep-merged over the base
//! tables when the config is materialized for a build.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dev::DevOptions;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::rules::RuleSet;

/// Source-map verbosity mode, selected per environment when `devtool` is
/// not set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMapMode {
    None,
    SourceMap,
    InlineSourceMap,
    HiddenSourceMap,
    EvalSourceMap,
    NosourcesSourceMap,
    CheapSourceMap,
    CheapModuleSourceMap,
}

impl SourceMapMode {
    /// The default mode for an environment: cheap inline maps while
    /// developing, none for production artifacts.
    pub fn default_for(environment: Environment) -> Self {
        match environment {
            Environment::Development => SourceMapMode::EvalSourceMap,
            Environment::Production => SourceMapMode::None,
        }
    }
}

/// What to do with files no rule claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Log a warning and skip the file.
    #[default]
    Warn,
    /// Abort the build.
    Error,
}

/// Chunk-splitting policy for the external engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSplit {
    /// Split shared and vendor code out of every chunk.
    All,
    /// Only split dynamically imported chunks.
    Async,
    /// Only split initial chunks.
    Initial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Naming template for the main bundle, e.g. `js/[name].js`.
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Destination directory for all build artifacts.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Public URL prefix artifacts are referenced under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            path: default_output_path(),
            public_path: None,
        }
    }
}

fn default_filename() -> String {
    "js/[name].js".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("build")
}

fn default_src_dir() -> PathBuf {
    PathBuf::from("src")
}

/// A plugin descriptor: resolved into the plan verbatim and handed to the
/// external engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    pub name: String,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_chunks: Option<ChunkSplit>,

    /// Minify generated styles. Unset means "follow the environment".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify_css: Option<bool>,

    /// Minify generated markup. Unset means "follow the environment".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify_html: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacklineConfig {
    /// Entry points dependency resolution starts from. Accepts a single
    /// path or a list.
    #[serde(default, deserialize_with = "entry_points")]
    pub entry: Vec<PathBuf>,

    /// Source root watched in dev mode and walked for assets.
    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,

    #[serde(default)]
    pub output: OutputOptions,

    #[serde(default)]
    pub rules: RuleSet,

    #[serde(default)]
    pub plugins: Vec<PluginOptions>,

    #[serde(default)]
    pub optimization: OptimizationOptions,

    #[serde(default)]
    pub dev: DevOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtool: Option<SourceMapMode>,

    #[serde(default)]
    pub unmatched: UnmatchedPolicy,

    /// Per-environment overrides, deep-merged over the base tables by
    /// [`materialize`](Self::materialize).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, Value>,
}

impl Default for PacklineConfig {
    fn default() -> Self {
        Self {
            entry: Vec::new(),
            src_dir: default_src_dir(),
            output: OutputOptions::default(),
            rules: RuleSet::default(),
            plugins: Vec::new(),
            optimization: OptimizationOptions::default(),
            dev: DevOptions::default(),
            devtool: None,
            unmatched: UnmatchedPolicy::default(),
            env: HashMap::new(),
        }
    }
}

impl PacklineConfig {
    /// Create from a `serde_json::Value` (for programmatic configuration).
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: e.to_string(),
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: e.to_string(),
        })
    }

    /// Apply the `[env.<environment>]` overrides and drop the override
    /// tables from the result.
    pub fn materialize(self, environment: Environment) -> Result<Self> {
        let Some(overrides) = self.env.get(environment.as_str()).cloned() else {
            let mut config = self;
            config.env.clear();
            return Ok(config);
        };

        let invalid = |message: String| ConfigError::InvalidEnvOverride {
            environment: environment.to_string(),
            message,
        };

        let mut base = serde_json::to_value(&self).map_err(|e| invalid(e.to_string()))?;
        if let Some(map) = base.as_object_mut() {
            map.remove("env");
        }
        merge_values(&mut base, &overrides);

        let mut merged: PacklineConfig =
            serde_json::from_value(base).map_err(|e| invalid(e.to_string()))?;
        merged.env.clear();
        Ok(merged)
    }
}

/// Deep merge for override tables: objects merge key-wise, arrays and
/// scalars replace.
fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

fn entry_points<'de, D>(deserializer: D) -> std::result::Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_creates_config() {
        let value = json!({
            "entry": ["src/index.js"],
            "output": { "filename": "js/[name].js", "path": "build" }
        });

        let config = PacklineConfig::from_value(value).unwrap();
        assert_eq!(config.entry, vec![PathBuf::from("src/index.js")]);
        assert_eq!(config.output.path, PathBuf::from("build"));
    }

    #[test]
    fn single_entry_string_is_accepted() {
        let config = PacklineConfig::from_value(json!({ "entry": "src/index.js" })).unwrap();
        assert_eq!(config.entry, vec![PathBuf::from("src/index.js")]);
    }

    #[test]
    fn env_override_merging_works() {
        let value = json!({
            "entry": ["src/index.js"],
            "devtool": "eval-source-map",
            "dev": { "port": 3000 },
            "env": {
                "production": {
                    "devtool": "none",
                    "output": { "public_path": "./" }
                }
            }
        });

        let config = PacklineConfig::from_value(value)
            .unwrap()
            .materialize(Environment::Production)
            .unwrap();

        assert_eq!(config.devtool, Some(SourceMapMode::None));
        assert_eq!(config.output.public_path.as_deref(), Some("./"));
        // Untouched sections survive the merge.
        assert_eq!(config.dev.port, 3000);
        assert!(config.env.is_empty());
    }

    #[test]
    fn other_environment_overrides_are_ignored() {
        let value = json!({
            "entry": ["src/index.js"],
            "env": { "production": { "devtool": "none" } }
        });

        let config = PacklineConfig::from_value(value)
            .unwrap()
            .materialize(Environment::Development)
            .unwrap();

        assert_eq!(config.devtool, None);
        assert!(config.env.is_empty());
    }

    #[test]
    fn bad_override_is_reported_per_environment() {
        let value = json!({
            "entry": ["src/index.js"],
            "env": { "production": { "devtool": "best-effort" } }
        });

        let err = PacklineConfig::from_value(value)
            .unwrap()
            .materialize(Environment::Production)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvOverride { .. }));
    }
}
