//! Build plan resolution.
//!
//! `resolve` is the single pure transformation in this crate: environment
//! plus configuration in, immutable [`BuildPlan`] out. No filesystem or
//! network effects happen here; executing the plan is the CLI's (or the
//! external engine's) job.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{
    OptimizationOptions, PacklineConfig, PluginOptions, SourceMapMode, UnmatchedPolicy,
};
use crate::dev::DevOptions;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::rules::{FileTypeRule, RuleSet};
use crate::template::OutputTemplate;

/// Resolved optimization settings with the environment toggles applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationPlan {
    pub split_chunks: Option<crate::config::ChunkSplit>,
    pub minify_css: bool,
    pub minify_html: bool,
}

/// Resolved output location and naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPlan {
    pub dir: PathBuf,
    pub filename: String,
    pub public_path: Option<String>,
}

/// The concrete, ordered build plan. Constructed once per invocation and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub environment: Environment,
    pub entries: Vec<PathBuf>,
    pub src_dir: PathBuf,
    pub output: OutputPlan,
    pub rules: RuleSet,
    pub plugins: Vec<PluginOptions>,
    pub optimization: OptimizationPlan,
    pub source_map: SourceMapMode,
    pub unmatched: UnmatchedPolicy,
    /// Present only for development plans.
    pub dev: Option<DevOptions>,
}

impl BuildPlan {
    /// Find the rule claiming `path`. Delegates to the validated rule
    /// table, so a `None` here is the "no rule matched" outcome.
    pub fn rule_for(&self, path: &Path) -> Result<Option<&FileTypeRule>> {
        self.rules.dispatch(path)
    }
}

/// Resolve a configuration into a concrete plan for `environment`.
///
/// Fails with `MissingEntryPoint`, `ConfigurationConflict`, or
/// `InvalidOutputTemplate` before any part of the plan is returned; no
/// partial plan ever escapes.
pub fn resolve(environment: Environment, config: PacklineConfig) -> Result<BuildPlan> {
    let config = config.materialize(environment)?;

    if config.entry.is_empty() {
        return Err(ConfigError::MissingEntryPoint);
    }

    config.rules.validate()?;

    // Every naming template must parse before the plan is handed out.
    OutputTemplate::parse(&config.output.filename)?;
    let mut rules = config.rules;
    for rule in rules.iter_mut() {
        if let Some(output) = &rule.output {
            OutputTemplate::parse(&output.name)?;
        }
        // Fix the chain order now so consumers see execution order.
        rule.steps = rule.ordered_steps();
    }

    let optimization = resolve_optimization(environment, &config.optimization);
    let source_map = config
        .devtool
        .unwrap_or_else(|| SourceMapMode::default_for(environment));
    let dev = match environment {
        Environment::Development => Some(config.dev),
        Environment::Production => None,
    };

    debug!(
        environment = %environment,
        entries = config.entry.len(),
        rules = rules.len(),
        "resolved build plan"
    );

    Ok(BuildPlan {
        environment,
        entries: config.entry,
        src_dir: config.src_dir,
        output: OutputPlan {
            dir: config.output.path,
            filename: config.output.filename,
            public_path: config.output.public_path,
        },
        rules,
        plugins: config.plugins,
        optimization,
        source_map,
        unmatched: config.unmatched,
        dev,
    })
}

fn resolve_optimization(
    environment: Environment,
    options: &OptimizationOptions,
) -> OptimizationPlan {
    let default_minify = environment.is_production();
    OptimizationPlan {
        split_chunks: options.split_chunks,
        minify_css: options.minify_css.unwrap_or(default_minify),
        minify_html: options.minify_html.unwrap_or(default_minify),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{OutputRule, ProcessorStep};
    use serde_json::json;

    fn base_config() -> PacklineConfig {
        PacklineConfig::from_value(json!({
            "entry": ["src/index.js"],
            "rules": [
                { "test": "*.css", "steps": [{ "name": "extract" }, { "name": "css-load" }] },
                {
                    "test": "*.less",
                    "steps": [
                        { "name": "extract" },
                        { "name": "css-load" },
                        { "name": "less-compile" }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn missing_entry_fails() {
        let config = PacklineConfig::default();
        let err = resolve(Environment::Production, config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEntryPoint));
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve(Environment::Production, base_config()).unwrap();
        let b = resolve(Environment::Production, base_config()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn production_toggles() {
        let plan = resolve(Environment::Production, base_config()).unwrap();
        assert!(plan.optimization.minify_css);
        assert!(plan.optimization.minify_html);
        assert_eq!(plan.source_map, SourceMapMode::None);
        assert!(plan.dev.is_none());
    }

    #[test]
    fn development_toggles() {
        let plan = resolve(Environment::Development, base_config()).unwrap();
        assert!(!plan.optimization.minify_css);
        assert_eq!(plan.source_map, SourceMapMode::EvalSourceMap);
        let dev = plan.dev.expect("development plan has a dev section");
        assert!(dev.hot);
        assert_eq!(dev.port, 3000);
    }

    #[test]
    fn explicit_devtool_wins() {
        let mut config = base_config();
        config.devtool = Some(SourceMapMode::HiddenSourceMap);
        let plan = resolve(Environment::Production, config).unwrap();
        assert_eq!(plan.source_map, SourceMapMode::HiddenSourceMap);
    }

    #[test]
    fn conflicting_rules_abort_resolution() {
        let config = PacklineConfig::from_value(json!({
            "entry": ["src/index.js"],
            "rules": [
                { "test": "*.js", "steps": [{ "name": "lint" }] },
                { "test": "*.js", "steps": [{ "name": "transpile" }] }
            ]
        }))
        .unwrap();
        let err = resolve(Environment::Production, config).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigurationConflict { .. }));
    }

    #[test]
    fn bad_rule_template_aborts_resolution() {
        let mut config = base_config();
        let mut rule = FileTypeRule {
            test: Some("*.png".to_string()),
            exclude: None,
            steps: vec![ProcessorStep::new("url")],
            output: Some(OutputRule {
                name: "[chunkhash].[ext]".to_string(),
                ..OutputRule::default()
            }),
        };
        rule.steps.push(ProcessorStep::new("file"));
        config.rules = RuleSet::new(
            config.rules.iter().cloned().chain([rule]).collect::<Vec<_>>(),
        );
        let err = resolve(Environment::Production, config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOutputTemplate { .. }));
    }

    #[test]
    fn chain_order_is_fixed_in_the_plan() {
        let config = PacklineConfig::from_value(json!({
            "entry": ["src/index.js"],
            "rules": [{
                "test": "*.js",
                "steps": [
                    { "name": "transpile" },
                    { "name": "lint", "enforce": "pre" }
                ]
            }]
        }))
        .unwrap();
        let plan = resolve(Environment::Production, config).unwrap();
        let rule = plan.rule_for(Path::new("src/index.js")).unwrap().unwrap();
        assert_eq!(rule.steps[0].name, "lint");
        assert_eq!(rule.steps[1].name, "transpile");
    }

    #[test]
    fn css_and_less_share_the_extract_chain() {
        let plan = resolve(Environment::Production, base_config()).unwrap();

        let css = plan.rule_for(Path::new("src/a.css")).unwrap().unwrap();
        let less = plan.rule_for(Path::new("src/a.less")).unwrap().unwrap();

        let css_names: Vec<_> = css.steps.iter().map(|s| s.name.as_str()).collect();
        let less_names: Vec<_> = less.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(css_names, ["extract", "css-load"]);
        assert_eq!(less_names[..2], ["extract", "css-load"]);
        assert_eq!(less_names[2], "less-compile");
    }
}
