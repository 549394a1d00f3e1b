//! File-type rules: which processing chain applies to which files.
//!
//! Dispatch is first-match-wins in declaration order, with the invariant
//! that at most one non-fallback rule may claim any given path. A rule with
//! only an `exclude` pattern is the fallback: it catches everything the
//! other rules left alone.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::Glob;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Ordering constraint for a processor step within its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforce {
    /// Run before the un-enforced steps of the same rule.
    Pre,
}

/// One named processing step in a chain. The name refers to a processor the
/// external build engine knows how to run; the options map is passed to it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorStep {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Enforce>,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: serde_json::Map<String, Value>,
}

impl ProcessorStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enforce: None,
            options: serde_json::Map::new(),
        }
    }

    pub fn is_pre(&self) -> bool {
        matches!(self.enforce, Some(Enforce::Pre))
    }
}

/// Where a matched asset ends up: naming template, destination subdirectory,
/// and an optional inline threshold (assets at or under the threshold are
/// encoded as data URIs instead of emitted as files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRule {
    #[serde(default = "default_asset_template")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_limit: Option<u64>,
}

impl Default for OutputRule {
    fn default() -> Self {
        Self {
            name: default_asset_template(),
            dir: None,
            inline_limit: None,
        }
    }
}

fn default_asset_template() -> String {
    "[contenthash:10].[ext]".to_string()
}

/// A `(match pattern, processing chain, output rule)` triple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileTypeRule {
    /// Glob over the file path or basename, e.g. `*.{jpg,png,gif}`.
    /// Absent for the fallback rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    #[serde(default)]
    pub steps: Vec<ProcessorStep>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputRule>,
}

impl FileTypeRule {
    /// Fallback rules have no match pattern and claim whatever their
    /// exclude pattern does not.
    pub fn is_fallback(&self) -> bool {
        self.test.is_none()
    }

    pub fn matches(&self, path: &Path) -> bool {
        if let Some(exclude) = &self.exclude {
            if pattern_matches(exclude, path) {
                return false;
            }
        }
        match &self.test {
            Some(test) => pattern_matches(test, path),
            // Exclude-only rule: catch-all for everything not excluded.
            None => self.exclude.is_some(),
        }
    }

    /// Steps in execution order: `enforce = "pre"` steps first, otherwise
    /// declaration order (the sort is stable).
    pub fn ordered_steps(&self) -> Vec<ProcessorStep> {
        let mut steps = self.steps.clone();
        steps.sort_by_key(|step| !step.is_pre());
        steps
    }

    /// Human-readable identity for error messages.
    pub fn display_name(&self) -> String {
        match (&self.test, &self.exclude) {
            (Some(test), _) => test.clone(),
            (None, Some(exclude)) => format!("exclude:{exclude}"),
            (None, None) => "<empty rule>".to_string(),
        }
    }
}

fn pattern_matches(pattern: &str, path: &Path) -> bool {
    let Ok(glob) = Glob::new(pattern) else {
        // Invalid patterns are rejected by RuleSet::validate before any
        // dispatch happens.
        return false;
    };
    let matcher = glob.compile_matcher();
    if matcher.is_match(path) {
        return true;
    }
    path.file_name()
        .map(|name| matcher.is_match(Path::new(name)))
        .unwrap_or(false)
}

/// The extensions a simple pattern (`*.ext` or `*.{a,b}`) claims, used for
/// the syntactic overlap check. `None` when the pattern is not analyzable.
fn claimed_extensions(pattern: &str) -> Option<BTreeSet<String>> {
    let rest = pattern.strip_prefix("*.")?;
    if let Some(body) = rest.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        let mut set = BTreeSet::new();
        for ext in body.split(',') {
            let ext = ext.trim();
            if ext.is_empty() || ext.chars().any(|c| "*?[{}/,".contains(c)) {
                return None;
            }
            set.insert(ext.to_string());
        }
        Some(set)
    } else if !rest.is_empty() && !rest.chars().any(|c| "*?[{}/,".contains(c)) {
        let mut set = BTreeSet::new();
        set.insert(rest.to_string());
        Some(set)
    } else {
        None
    }
}

fn rules_conflict(a: &FileTypeRule, b: &FileTypeRule) -> bool {
    // Excludes only carve subsets out of a pattern, so two rules whose
    // match patterns overlap still collide on the files neither exclude
    // covers. They cannot disambiguate overlapping tests.
    match (&a.test, &b.test) {
        (Some(x), Some(y)) => {
            if x == y {
                return true;
            }
            match (claimed_extensions(x), claimed_extensions(y)) {
                (Some(xs), Some(ys)) => xs.intersection(&ys).next().is_some(),
                _ => false,
            }
        }
        // At most one fallback participates in dispatch after everything
        // else declined, so fallback pairs are caught separately.
        _ => false,
    }
}

/// Ordered rule table with exclusivity validation and dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<FileTypeRule>);

impl RuleSet {
    pub fn new(rules: Vec<FileTypeRule>) -> Self {
        Self(rules)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileTypeRule> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, FileTypeRule> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check pattern validity and the oneOf exclusivity invariant.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.0 {
            for pattern in [&rule.test, &rule.exclude].into_iter().flatten() {
                Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.kind().to_string(),
                })?;
            }
        }

        let mut fallbacks = self.0.iter().filter(|r| r.is_fallback() && r.exclude.is_some());
        if let (Some(first), Some(second)) = (fallbacks.next(), fallbacks.next()) {
            return Err(ConfigError::ConfigurationConflict {
                first: first.display_name(),
                second: second.display_name(),
            });
        }

        for (i, a) in self.0.iter().enumerate() {
            for b in &self.0[i + 1..] {
                if rules_conflict(a, b) {
                    return Err(ConfigError::ConfigurationConflict {
                        first: a.display_name(),
                        second: b.display_name(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Find the rule claiming `path`.
    ///
    /// Returns `Ok(None)` when nothing matches (the caller decides between
    /// warn-and-skip and fail). A concrete double match among non-fallback
    /// rules is a conflict even if the syntactic check could not compare
    /// the patterns.
    pub fn dispatch(&self, path: &Path) -> Result<Option<&FileTypeRule>> {
        let mut hits = self
            .0
            .iter()
            .filter(|rule| !rule.is_fallback() && rule.matches(path));

        match (hits.next(), hits.next()) {
            (Some(first), Some(second)) => Err(ConfigError::ConfigurationConflict {
                first: first.display_name(),
                second: second.display_name(),
            }),
            (Some(rule), None) => Ok(Some(rule)),
            (None, _) => Ok(self
                .0
                .iter()
                .find(|rule| rule.is_fallback() && rule.matches(path))),
        }
    }
}

impl From<Vec<FileTypeRule>> for RuleSet {
    fn from(rules: Vec<FileTypeRule>) -> Self {
        Self(rules)
    }
}
