//! Shared state for the development server.
//!
//! Build status and the set of connected reload clients, behind
//! parking_lot locks so the watcher loop and request handlers can share it.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

/// Build status tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// No build has been performed yet
    NotStarted,
    /// Build is currently in progress
    InProgress { started_at: Instant },
    /// Build completed successfully
    Success { duration_ms: u64 },
    /// Build failed with error
    Failed { error: String },
}

impl BuildStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success { .. })
    }

    /// Error message if the last build failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Events pushed to connected browsers over SSE.
#[derive(Debug, Clone)]
pub enum DevEvent {
    BuildStarted,
    BuildCompleted { duration_ms: u64 },
    BuildFailed { error: String },
}

impl DevEvent {
    /// Wire format sent as SSE data. The reload client switches on the
    /// first token.
    pub fn to_message(&self) -> String {
        match self {
            DevEvent::BuildStarted => "building".to_string(),
            DevEvent::BuildCompleted { duration_ms } => format!("reload {duration_ms}"),
            DevEvent::BuildFailed { error } => {
                format!("error {}", error.replace('\n', " "))
            }
        }
    }
}

/// Shared development server state.
pub struct DevState {
    status: RwLock<BuildStatus>,
    clients: Mutex<Vec<mpsc::Sender<String>>>,
}

pub type SharedState = Arc<DevState>;

impl DevState {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(BuildStatus::NotStarted),
            clients: Mutex::new(Vec::new()),
        }
    }

    pub fn status(&self) -> BuildStatus {
        self.status.read().clone()
    }

    pub fn start_build(&self) {
        *self.status.write() = BuildStatus::InProgress {
            started_at: Instant::now(),
        };
    }

    pub fn complete_build(&self, duration_ms: u64) {
        *self.status.write() = BuildStatus::Success { duration_ms };
    }

    pub fn fail_build(&self, error: String) {
        *self.status.write() = BuildStatus::Failed { error };
    }

    /// Register a new SSE client, returning the receiving end of its
    /// message channel.
    pub fn register_client(&self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(16);
        self.clients.lock().push(tx);
        rx
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send an event to every connected client. Clients whose channel is
    /// closed or full are dropped from the registry.
    pub fn broadcast(&self, event: &DevEvent) {
        let message = event.to_message();
        self.clients
            .lock()
            .retain(|tx| tx.try_send(message.clone()).is_ok());
    }
}

impl Default for DevState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions() {
        let state = DevState::new();
        assert_eq!(state.status(), BuildStatus::NotStarted);

        state.start_build();
        assert!(state.status().is_in_progress());

        state.complete_build(42);
        assert!(state.status().is_success());

        state.fail_build("boom".to_string());
        assert_eq!(state.status().error(), Some("boom"));
    }

    #[tokio::test]
    async fn broadcast_reaches_registered_clients() {
        let state = DevState::new();
        let mut rx = state.register_client();

        state.broadcast(&DevEvent::BuildCompleted { duration_ms: 7 });
        assert_eq!(rx.recv().await.unwrap(), "reload 7");
    }

    #[tokio::test]
    async fn broadcast_drops_disconnected_clients() {
        let state = DevState::new();
        let rx = state.register_client();
        assert_eq!(state.client_count(), 1);

        drop(rx);
        state.broadcast(&DevEvent::BuildStarted);
        assert_eq!(state.client_count(), 0);
    }

    #[test]
    fn event_messages() {
        assert_eq!(DevEvent::BuildStarted.to_message(), "building");
        assert_eq!(
            DevEvent::BuildFailed {
                error: "a\nb".to_string()
            }
            .to_message(),
            "error a b"
        );
    }
}
