//! Terminal status output.
//!
//! Short status lines on stderr, colored when the terminal supports it.

use std::time::Duration;

use owo_colors::OwoColorize;

/// Apply the `--no-color` flag and the `NO_COLOR`/`FORCE_COLOR`
/// conventions to console's global color switch.
pub fn init_colors(no_color: bool) {
    if no_color || std::env::var_os("NO_COLOR").is_some() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    } else if std::env::var_os("FORCE_COLOR").is_some() {
        console::set_colors_enabled(true);
        console::set_colors_enabled_stderr(true);
    }
}

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Format a duration as `NNNms` below one second, `N.NNs` above.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
