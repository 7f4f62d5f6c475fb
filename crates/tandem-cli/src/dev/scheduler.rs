//! Watch scheduler: decides what to rebuild, and when.
//!
//! A single reactive loop over the watcher's event channel, running the
//! state machine `Idle -> Debouncing -> Rebuilding -> Idle`. It only ever
//! enqueues work into the build graph; compilation itself happens on the
//! graph's task pool, so an event burst cannot starve the compiler.
//!
//! Coalescing rules:
//! - events inside the debounce window extend/reset the timer;
//! - events arriving while a rebuild is in flight are queued into the next
//!   cycle, never dropped and never preempting running compiles;
//! - each cycle rebuilds exactly the affected subset (targets whose watch
//!   paths contain the changed path, the UI pass when its source tree
//!   changed, the asset pass when an asset root changed). Everything else
//!   keeps its previous result.

use crate::dev::state::SharedState;
use crate::dev::{DevEvent, WatchEvent};
use crate::error::Result;
use crate::ui;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tandem_build::BuildGraph;
use tandem_config::{BuildMode, TargetRegistry};
use tokio::sync::mpsc;

/// Work accumulated for the next rebuild cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct PendingWork {
    targets: BTreeSet<String>,
    ui: bool,
    assets: bool,
}

impl PendingWork {
    fn is_empty(&self) -> bool {
        self.targets.is_empty() && !self.ui && !self.assets
    }
}

/// Debouncing rebuild scheduler for development mode.
pub struct WatchScheduler {
    registry: Arc<TargetRegistry>,
    graph: Arc<BuildGraph>,
    state: SharedState,
    debounce: Duration,
    ui_source: Option<PathBuf>,
    asset_roots: Vec<PathBuf>,
}

impl WatchScheduler {
    /// Create a scheduler.
    ///
    /// `ui_source` and `asset_roots` must be absolute (resolved against the
    /// project root), matching the paths the watcher reports.
    pub fn new(
        registry: Arc<TargetRegistry>,
        graph: Arc<BuildGraph>,
        state: SharedState,
        debounce: Duration,
        ui_source: Option<PathBuf>,
        asset_roots: Vec<PathBuf>,
    ) -> Self {
        Self {
            registry,
            graph,
            state,
            debounce,
            ui_source,
            asset_roots,
        }
    }

    /// Run the scheduler loop until the event channel closes.
    pub async fn run(self, mut events: mpsc::Receiver<WatchEvent>) -> Result<()> {
        let mut pending = PendingWork::default();
        let mut closed = false;

        loop {
            // Idle: wait for the first relevant event
            while pending.is_empty() {
                match events.recv().await {
                    Some(event) => self.accumulate(&mut pending, &event),
                    None => return Ok(()),
                }
            }

            // Debouncing: further events extend the quiet period
            while !closed {
                tokio::select! {
                    _ = tokio::time::sleep(self.debounce) => break,
                    maybe = events.recv() => match maybe {
                        Some(event) => self.accumulate(&mut pending, &event),
                        None => closed = true,
                    }
                }
            }

            // Rebuilding: run the affected subset; late events queue up for
            // the next cycle instead of preempting this one
            let work = std::mem::take(&mut pending);
            self.rebuild(work, &mut pending, &mut events, &mut closed)
                .await?;

            if closed && pending.is_empty() {
                return Ok(());
            }
        }
    }

    /// Fold one watch event into the pending work set.
    fn accumulate(&self, pending: &mut PendingWork, event: &WatchEvent) {
        for id in self.registry.affected_by(&event.path) {
            pending.targets.insert(id);
        }
        if let Some(ui_source) = &self.ui_source {
            if event.path.starts_with(ui_source) {
                pending.ui = true;
            }
        }
        if self.asset_roots.iter().any(|r| event.path.starts_with(r)) {
            pending.assets = true;
        }
        tracing::debug!(path = %event.path.display(), ?pending, "watch event");
    }

    /// Run one rebuild cycle, draining concurrent events into `next`.
    async fn rebuild(
        &self,
        work: PendingWork,
        next: &mut PendingWork,
        events: &mut mpsc::Receiver<WatchEvent>,
        closed: &mut bool,
    ) -> Result<()> {
        let targets: Vec<String> = work.targets.into_iter().collect();
        ui::info(&format!(
            "Rebuilding: {}{}{}",
            targets.join(", "),
            if work.ui { " + ui" } else { "" },
            if work.assets { " + assets" } else { "" },
        ));

        self.state.start_build();
        self.state.broadcast(&DevEvent::BuildStarted).await;

        let rebuild = self
            .graph
            .run_partial(BuildMode::Development, &targets, work.ui, work.assets);
        tokio::pin!(rebuild);

        let report = loop {
            tokio::select! {
                result = &mut rebuild => break result?,
                maybe = events.recv(), if !*closed => match maybe {
                    Some(event) => self.accumulate(next, &event),
                    None => *closed = true,
                }
            }
        };

        let duration_ms = report.duration.as_millis() as u64;
        if report.all_succeeded() {
            self.state.complete_build(duration_ms);
            ui::success(&format!("Rebuild completed in {}ms", duration_ms));
            self.state
                .broadcast(&DevEvent::BuildCompleted { duration_ms })
                .await;
        } else {
            // Fail-isolated: stale entries stayed published, but the failure
            // is surfaced to the terminal and every connected client
            let error = report
                .results
                .iter()
                .filter(|r| !r.success)
                .flat_map(|r| r.diagnostics.iter())
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            self.state.fail_build(error.clone());
            ui::error(&format!(
                "Rebuild failed for {}: \n{}",
                report.failed.join(", "),
                error
            ));
            self.state.broadcast(&DevEvent::BuildFailed { error }).await;
        }

        Ok(())
    }
}
