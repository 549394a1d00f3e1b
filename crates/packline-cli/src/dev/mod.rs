//! Development mode plumbing: shared state, file watching, and the
//! live-reload HTTP server.

pub mod server;
pub mod state;
pub mod watcher;

pub use server::{DevServer, ServerOptions};
pub use state::{BuildStatus, DevEvent, DevState, SharedState};
pub use watcher::{FileChange, FileWatcher};
