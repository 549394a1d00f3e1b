//! Logging setup for the packline CLI.
//!
//! Structured logging via the `tracing` ecosystem. Verbosity is decided in
//! this order: `--verbose` (debug for packline crates), `--quiet` (errors
//! only), the `RUST_LOG` environment variable, then an info-level default.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("packline=debug,packline_cli=debug,packline_config=debug")
    } else if quiet {
        EnvFilter::new("packline=error,packline_cli=error,packline_config=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("packline=info,packline_cli=info,packline_config=info")
        })
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
