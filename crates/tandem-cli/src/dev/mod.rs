//! Development mode: watch, rebuild, serve, reload.
//!
//! - [`watcher`] - filesystem events into a bounded channel
//! - [`scheduler`] - debouncing state machine deciding what to rebuild
//! - [`server`] - axum server with SSE live reload
//! - [`state`] - shared status/client registry

pub mod scheduler;
pub mod server;
pub mod state;
pub mod watcher;

pub use scheduler::WatchScheduler;
pub use server::DevServer;
pub use state::{BuildStatus, DevState, SharedState};
pub use watcher::{FileWatcher, WatchEvent};

use crate::error::Result;
use crate::ui;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tandem_build::BuildGraph;
use tandem_config::{BuildMode, TandemConfig, TargetRegistry};
use tokio::signal;

/// Events in the dev server lifecycle, broadcast to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    /// Rebuild started
    BuildStarted,
    /// Rebuild completed; clients reload on this
    BuildCompleted { duration_ms: u64 },
    /// Rebuild failed for one or more units
    BuildFailed { error: String },
    /// Client connected to the event stream
    ClientConnected { id: usize },
}

/// Run development mode until interrupted.
///
/// Performs the initial full build (fail-together, like any full build),
/// then starts the file watcher, the scheduler loop, and the dev server,
/// and waits for Ctrl+C.
pub async fn serve(
    graph: Arc<BuildGraph>,
    registry: Arc<TargetRegistry>,
    config: &TandemConfig,
    root: PathBuf,
    out_dir: PathBuf,
    port: u16,
) -> Result<()> {
    ui::info("Starting development server...");

    let state = Arc::new(DevState::new(Arc::clone(graph.store()), out_dir));

    // Initial full build. A broken tree at startup is surfaced immediately
    // rather than serving a stale or empty bundle.
    ui::info("Performing initial build...");
    state.start_build();
    match graph.run_full(BuildMode::Development).await {
        Ok(report) => {
            let duration_ms = report.duration.as_millis() as u64;
            state.complete_build(duration_ms);
            ui::success(&format!("Initial build completed in {}ms", duration_ms));
        }
        Err(e) => {
            state.fail_build(e.to_string());
            ui::error(&format!("Initial build failed: {}", e));
            return Err(e.into());
        }
    }

    // File watcher over the project root; the scheduler filters relevance.
    let (watcher, events) = FileWatcher::new(root.clone(), config.dev.watch_ignore.clone())?;
    ui::info(&format!(
        "Watching for changes in: {}",
        watcher.root().display()
    ));

    let scheduler = WatchScheduler::new(
        Arc::clone(&registry),
        Arc::clone(&graph),
        Arc::clone(&state),
        Duration::from_millis(config.dev.debounce_ms),
        config.ui.as_ref().map(|ui| resolve(&ui.source_dir, &root)),
        config
            .assets
            .roots
            .iter()
            .map(|r| resolve(r, &root))
            .collect(),
    );
    let mut scheduler_handle = tokio::spawn(scheduler.run(events));

    let server = DevServer::new(port, Arc::clone(&state))?;
    ui::success(&format!("Development server running at {}", server.url()));
    let mut server_handle = tokio::spawn(server.start());

    ui::info("Press Ctrl+C to stop");
    tokio::select! {
        _ = signal::ctrl_c() => {
            ui::info("Shutting down development server...");
        }
        result = &mut scheduler_handle => {
            match result {
                Ok(Err(e)) => return Err(e),
                _ => ui::warning("Watch loop ended unexpectedly"),
            }
        }
        result = &mut server_handle => {
            match result {
                Ok(Err(e)) => return Err(e),
                _ => ui::warning("Server task ended unexpectedly"),
            }
        }
    }

    ui::success("Development server stopped");
    Ok(())
}

fn resolve(path: &std::path::Path, root: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
