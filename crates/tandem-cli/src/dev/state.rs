//! Shared state for the development server.
//!
//! Thread-safe access to build status and SSE client connections using
//! parking_lot locks. The manifest itself lives in the build crate's
//! [`ManifestStore`] and is only referenced here for serving.

use crate::dev::DevEvent;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tandem_build::ManifestStore;

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
    /// Check if a build is currently running.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress { .. })
    }

    /// Get the error message if failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Shared development server state.
pub struct DevState {
    /// Current build status
    status: RwLock<BuildStatus>,
    /// Connected SSE clients
    clients: RwLock<HashMap<usize, tokio::sync::mpsc::Sender<String>>>,
    /// Next client id
    next_client_id: RwLock<usize>,
    /// The published manifest, shared with the build graph
    store: Arc<ManifestStore>,
    /// Output directory served as static files
    out_dir: PathBuf,
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevState>;

impl DevState {
    /// Create dev server state over the graph's manifest store.
    pub fn new(store: Arc<ManifestStore>, out_dir: PathBuf) -> Self {
        Self {
            status: RwLock::new(BuildStatus::NotStarted),
            clients: RwLock::new(HashMap::new()),
            next_client_id: RwLock::new(0),
            store,
            out_dir,
        }
    }

    /// Mark a build as started.
    pub fn start_build(&self) {
        *self.status.write() = BuildStatus::InProgress {
            started_at: Instant::now(),
        };
    }

    /// Mark the build as succeeded.
    pub fn complete_build(&self, duration_ms: u64) {
        *self.status.write() = BuildStatus::Success { duration_ms };
    }

    /// Mark the build as failed.
    pub fn fail_build(&self, error: String) {
        *self.status.write() = BuildStatus::Failed { error };
    }

    /// Current build status.
    pub fn get_status(&self) -> BuildStatus {
        self.status.read().clone()
    }

    /// Serialized view of the currently published manifest.
    pub fn manifest_json(&self) -> crate::error::Result<String> {
        Ok(self.store.snapshot().to_json().map_err(|e| {
            crate::error::CliError::Server(format!("manifest serialization failed: {}", e))
        })?)
    }

    /// Output directory served as static files.
    pub fn out_dir(&self) -> &PathBuf {
        &self.out_dir
    }

    /// Register a new SSE client, returning its id and event receiver.
    pub fn register_client(&self) -> (usize, tokio::sync::mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };
        let (tx, rx) = tokio::sync::mpsc::channel(100);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    /// Unregister an SSE client.
    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Broadcast an event to all connected clients, dropping dead ones.
    pub async fn broadcast(&self, event: &DevEvent) {
        let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
        let clients = self.clients.read().clone();

        let mut failed_ids = Vec::new();
        for (id, tx) in clients {
            if tx.send(json.clone()).await.is_err() {
                failed_ids.push(id);
            }
        }
        for id in failed_ids {
            self.unregister_client(id);
        }
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }
}
