//! Build command implementation.
//!
//! Loads the configuration, resolves a plan for the requested environment,
//! and executes it against the project tree.

use std::time::Instant;

use packline_config::{resolve, Environment};

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::emit;
use crate::error::Result;
use crate::ui;

/// Execute the build command.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let root = utils::resolve_root(args.cwd.as_deref())?;
    let environment: Environment = args.env.into();

    let mut config = utils::load_config(&root, args.config.as_deref())?;
    if let Some(out_dir) = &args.out_dir {
        config.output.path = out_dir.clone();
    }

    ui::info(&format!("Building for {environment}"));
    tracing::debug!(root = %root.display(), "resolved project root");

    let start = Instant::now();
    let plan = resolve(environment, config)?;

    let out_dir = root.join(&plan.output.dir);
    if args.clean {
        utils::clean_output_dir(&out_dir)?;
        ui::info(&format!("Cleaned {}", out_dir.display()));
    }

    let report = emit::execute_plan(&plan, &root, true)?;
    let elapsed = start.elapsed();

    if !report.skipped.is_empty() {
        ui::warning(&format!(
            "{} file(s) matched no rule and were skipped",
            report.skipped.len()
        ));
    }

    ui::success(&format!(
        "Built {} asset(s) ({} emitted, {} inlined, {} delegated) in {}",
        report.total_processed(),
        report.emitted.len(),
        report.inlined.len(),
        report.delegated,
        ui::format_duration(elapsed)
    ));

    Ok(())
}
