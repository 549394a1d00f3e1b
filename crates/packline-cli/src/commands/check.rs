//! Check command implementation.
//!
//! Resolves the configuration for the requested environment without
//! touching the output directory. Catches rule conflicts, bad templates,
//! and missing entries before a build or deploy runs them.

use packline_config::{resolve, ConfigValidator, Environment, FsValidator};

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let root = utils::resolve_root(args.cwd.as_deref())?;
    let environment: Environment = args.env.into();

    // Validate what the build would actually see: overrides for the
    // requested environment applied first.
    let config = utils::load_config(&root, args.config.as_deref())?
        .materialize(environment)?;

    FsValidator::new(&root).validate(&config)?;
    let plan = resolve(environment, config)?;

    ui::success(&format!(
        "Configuration OK for {environment}: {} entry point(s), {} rule(s), {} plugin(s)",
        plan.entries.len(),
        plan.rules.len(),
        plan.plugins.len()
    ));
    ui::info(&format!(
        "Output: {} / {}, source maps: {:?}",
        plan.output.dir.display(),
        plan.output.filename,
        plan.source_map
    ));

    Ok(())
}
