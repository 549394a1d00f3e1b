//! Configuration model and build-plan resolver for the packline asset
//! pipeline.
//!
//! The crate turns a declarative table of file-type rules into a concrete,
//! immutable [`BuildPlan`]: which chain of named processors applies to which
//! files, where artifacts land, how they are named, and which environment
//! toggles (minification, source maps, dev server) are in effect.

pub mod config;
pub mod dev;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod plan;
pub mod rules;
pub mod template;
pub mod validation;

// Re-export main types
pub use config::*;
pub use dev::*;
pub use environment::Environment;
pub use error::*;
pub use plan::{resolve, BuildPlan, OptimizationPlan, OutputPlan};
pub use rules::{Enforce, FileTypeRule, OutputRule, ProcessorStep, RuleSet};
pub use template::{content_hash, OutputTemplate, DEFAULT_HASH_WIDTH};

// Re-export discovery and validation
pub use discovery::{discover, ConfigDiscovery, CONFIG_FILE};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator};
