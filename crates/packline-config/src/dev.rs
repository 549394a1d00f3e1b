//! Development server configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevOptions {
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on. 0 asks the OS for a free port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open the browser once the server is up.
    #[serde(default = "default_true")]
    pub open: bool,

    /// Push reload events to connected clients after each rebuild.
    #[serde(default = "default_true")]
    pub hot: bool,

    /// Serve responses with gzip compression.
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Window for coalescing filesystem events into one rebuild.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Extra directory of static files to serve as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for DevOptions {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            open: default_true(),
            hot: default_true(),
            compress: default_true(),
            debounce_ms: default_debounce_ms(),
            static_dir: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    100
}
