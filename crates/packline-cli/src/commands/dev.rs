//! Development server command implementation.
//!
//! Runs the full dev loop: initial development build, recursive file
//! watching, the live-reload HTTP server, and coalesced rebuilds on
//! change. A broken build keeps the server up and shows the error page
//! until the next successful rebuild.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use packline_config::{resolve, BuildPlan, Environment};
use tokio::signal;
use tokio::sync::mpsc;

use crate::cli::DevArgs;
use crate::commands::utils;
use crate::dev::{DevEvent, DevServer, DevState, FileChange, FileWatcher, ServerOptions, SharedState};
use crate::emit;
use crate::error::Result;
use crate::ui;

/// Execute the dev command.
pub async fn execute(args: DevArgs) -> Result<()> {
    ui::info("Starting development server...");

    let root = utils::resolve_root(args.cwd.as_deref())?;
    let plan = resolve_dev_plan(&root, &args)?;

    let dev = plan
        .dev
        .clone()
        .unwrap_or_default();

    let options = ServerOptions {
        host: args.host.clone().unwrap_or(dev.host),
        port: args.port.unwrap_or(dev.port),
        compress: dev.compress,
        hot: dev.hot,
        root: root.join(&plan.output.dir),
        static_dir: dev.static_dir.as_ref().map(|d| root.join(d)),
    };
    let open = args.open || dev.open;
    let debounce_ms = dev.debounce_ms;

    let state: SharedState = Arc::new(DevState::new());

    // Initial build. Failure is shown in the browser, not fatal here.
    run_build(&plan, &root, &state);

    let (watcher, mut change_rx) = FileWatcher::new(root.clone(), options.root.clone(), debounce_ms)?;
    ui::info(&format!("Watching {}", watcher.root().display()));

    let server = DevServer::new(options, state.clone());
    let hot = dev.hot;
    let mut server_handle = tokio::spawn(async move {
        let result = server
            .start(move |addr| {
                let url = format!("http://{addr}");
                ui::success(&format!("Development server running at {url}"));
                if hot {
                    ui::info("Live reload enabled");
                }
                if open {
                    open_browser(&url);
                }
            })
            .await;
        if let Err(e) = result {
            ui::error(&format!("Server error: {e}"));
        }
    });

    ui::info("Press Ctrl+C to stop");

    let mut plan = plan;
    loop {
        tokio::select! {
            Some(change) = change_rx.recv() => {
                handle_changes(change, &mut change_rx, &mut plan, &root, &args, &state);
            }

            _ = signal::ctrl_c() => {
                ui::info("Shutting down development server...");
                break;
            }

            _ = &mut server_handle => {
                ui::warning("Server task ended unexpectedly");
                break;
            }
        }
    }

    ui::success("Development server stopped");
    Ok(())
}

fn resolve_dev_plan(root: &Path, args: &DevArgs) -> Result<BuildPlan> {
    let config = utils::load_config(root, args.config.as_deref())?;
    Ok(resolve(Environment::Development, config)?)
}

/// Handle a batch of file changes as one rebuild.
///
/// Changes that arrive while a rebuild would start are drained first, so
/// a save-all in an editor triggers a single rebuild rather than one per
/// file.
fn handle_changes(
    first: FileChange,
    rx: &mut mpsc::Receiver<FileChange>,
    plan: &mut BuildPlan,
    root: &PathBuf,
    args: &DevArgs,
    state: &SharedState,
) {
    let mut config_changed = first.is_config();
    let mut changed = vec![first.path().to_path_buf()];
    while let Ok(change) = rx.try_recv() {
        config_changed |= change.is_config();
        changed.push(change.path().to_path_buf());
    }

    ui::info(&format!("{} file(s) changed", changed.len()));
    for path in changed.iter().take(3) {
        tracing::debug!(file = %path.display(), "changed");
    }

    if config_changed {
        ui::info("Configuration changed, re-resolving build plan");
        match resolve_dev_plan(root, args) {
            Ok(new_plan) => *plan = new_plan,
            Err(e) => {
                let message = e.to_string();
                ui::error(&format!("Configuration reload failed: {message}"));
                state.fail_build(message.clone());
                state.broadcast(&DevEvent::BuildFailed { error: message });
                return;
            }
        }
    }

    run_build(plan, root, state);
}

/// Run one build, updating shared state and notifying clients.
fn run_build(plan: &BuildPlan, root: &Path, state: &SharedState) {
    state.start_build();
    state.broadcast(&DevEvent::BuildStarted);

    let start = Instant::now();
    match emit::execute_plan(plan, root, false) {
        Ok(report) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            if !report.failures.is_empty() {
                ui::warning(&format!(
                    "Build finished with {} failed asset(s)",
                    report.failures.len()
                ));
            }
            state.complete_build(duration_ms);
            ui::success(&format!(
                "Built {} asset(s) in {}ms",
                report.total_processed(),
                duration_ms
            ));
            state.broadcast(&DevEvent::BuildCompleted { duration_ms });
        }
        Err(e) => {
            let message = e.to_string();
            ui::error(&format!("Build failed: {message}"));
            state.fail_build(message.clone());
            state.broadcast(&DevEvent::BuildFailed { error: message });
        }
    }
}

/// Open the server URL in the default browser.
fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {url}")),
        Err(e) => ui::warning(&format!("Failed to open browser: {e}")),
    }
}
