//! Build graph: concurrent target coordination and outcome reconciliation.
//!
//! Targets have no declared inter-dependencies (each native module is
//! self-contained), so every compile is an independently schedulable unit;
//! the UI bundling pass and the asset pipeline run alongside them and the
//! graph joins everything before deciding what to publish.
//!
//! Two join policies:
//! - **full build** (fail-together): any failure withholds the entire
//!   manifest and surfaces an aggregate error;
//! - **partial rebuild** (fail-isolated, dev only): succeeded targets'
//!   entries merge over the previous manifest, failed targets keep their
//!   stale-but-valid entries, and the failure is surfaced in diagnostics.

pub use crate::assets::STATIC_BUNDLE;
use crate::assets::AssetPipeline;
use crate::bundler::{BundleUi, UI_BUNDLE};
use crate::compiler::{Compile, CompilationResult};
use crate::error::{BuildError, Result};
use crate::manifest::{entry_from_files, ManifestStore, OutputManifest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tandem_config::{BuildMode, TargetRegistry};
use tokio::task::JoinSet;

/// Outcome of a full build pass.
#[derive(Debug)]
pub struct BuildReport {
    /// Mode the pass ran in
    pub mode: BuildMode,
    /// One result per unit of work, sorted by id
    pub results: Vec<CompilationResult>,
    /// The manifest generation this pass published
    pub manifest: Arc<OutputManifest>,
    /// Wall-clock duration of the pass
    pub duration: Duration,
}

/// Outcome of a watch-triggered partial rebuild.
#[derive(Debug)]
pub struct PartialReport {
    /// Results for the units that actually ran
    pub results: Vec<CompilationResult>,
    /// Ids whose compilation failed (their stale manifest entries remain)
    pub failed: Vec<String>,
    /// The merged manifest generation this pass published
    pub manifest: Arc<OutputManifest>,
    /// Wall-clock duration of the pass
    pub duration: Duration,
}

impl PartialReport {
    /// Whether every unit in this cycle succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Coordinates target compilation, the UI pass, and asset processing.
pub struct BuildGraph {
    registry: Arc<TargetRegistry>,
    compiler: Arc<dyn Compile>,
    bundler: Option<Arc<dyn BundleUi>>,
    assets: Option<Arc<AssetPipeline>>,
    store: Arc<ManifestStore>,
    out_dir: PathBuf,
}

impl BuildGraph {
    /// Assemble a graph over the given collaborators.
    pub fn new(
        registry: Arc<TargetRegistry>,
        compiler: Arc<dyn Compile>,
        bundler: Option<Arc<dyn BundleUi>>,
        assets: Option<Arc<AssetPipeline>>,
        store: Arc<ManifestStore>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            compiler,
            bundler,
            assets,
            store,
            out_dir: out_dir.into(),
        }
    }

    /// The manifest store this graph publishes through.
    pub fn store(&self) -> &Arc<ManifestStore> {
        &self.store
    }

    /// Run a full build over every registered target.
    ///
    /// Fail-together: if any target, the UI pass, or the asset pass fails,
    /// no manifest is published and all diagnostics come back in one
    /// [`BuildError::Aggregate`].
    pub async fn run_full(&self, mode: BuildMode) -> Result<BuildReport> {
        let start = Instant::now();
        let ids = self.registry.ids();
        let results = self.run_units(mode, &ids, true, true).await?;

        if results.iter().any(|r| !r.success) {
            let diagnostics = results.into_iter().flat_map(|r| r.diagnostics).collect();
            return Err(BuildError::Aggregate { diagnostics });
        }

        let mut manifest = OutputManifest::new();
        for result in &results {
            manifest.insert(self.entry_for(result)?);
        }
        let manifest = self.store.publish(manifest)?;

        Ok(BuildReport {
            mode,
            results,
            manifest,
            duration: start.elapsed(),
        })
    }

    /// Run a watch-triggered rebuild of exactly the affected subset.
    ///
    /// Unaffected targets are not recompiled; their entries carry over from
    /// the previous manifest. Fail-isolated: failures withhold only their own
    /// entries, and the merged manifest is published regardless.
    pub async fn run_partial(
        &self,
        mode: BuildMode,
        targets: &[String],
        rebuild_ui: bool,
        rebuild_assets: bool,
    ) -> Result<PartialReport> {
        let start = Instant::now();
        let results = self
            .run_units(mode, targets, rebuild_ui, rebuild_assets)
            .await?;

        // Merge over the previous generation: stale entries survive for
        // anything that did not rebuild successfully this cycle.
        let mut manifest = (*self.store.snapshot()).clone();
        let mut failed = Vec::new();
        for result in &results {
            if result.success {
                manifest.insert(self.entry_for(result)?);
            } else {
                failed.push(result.target_id.clone());
            }
        }
        let manifest = self.store.publish(manifest)?;

        Ok(PartialReport {
            results,
            failed,
            manifest,
            duration: start.elapsed(),
        })
    }

    /// Spawn the requested units concurrently and join them all.
    ///
    /// Only toolchain-level failures propagate as errors; per-unit failures
    /// come back inside the results.
    async fn run_units(
        &self,
        mode: BuildMode,
        targets: &[String],
        run_ui: bool,
        run_assets: bool,
    ) -> Result<Vec<CompilationResult>> {
        let settings = mode.settings();
        let mut set: JoinSet<Result<CompilationResult>> = JoinSet::new();

        for id in targets {
            let Some(descriptor) = self.registry.get(id) else {
                tracing::warn!(target_id = %id, "unknown target requested, skipping");
                continue;
            };
            let descriptor = descriptor.clone();
            let compiler = Arc::clone(&self.compiler);
            set.spawn(async move { compiler.compile(&descriptor, mode).await });
        }

        if run_ui {
            if let Some(bundler) = &self.bundler {
                let bundler = Arc::clone(bundler);
                set.spawn(async move { bundler.bundle(settings).await });
            }
        }

        if run_assets {
            if let Some(assets) = &self.assets {
                let assets = Arc::clone(assets);
                set.spawn(async move { assets.process(settings).await });
            }
        }

        let mut results = Vec::new();
        while let Some(joined) = set.join_next().await {
            let result = joined.map_err(|e| BuildError::Io(std::io::Error::other(e)))??;
            results.push(result);
        }
        results.sort_by(|a, b| a.target_id.cmp(&b.target_id));
        Ok(results)
    }

    fn entry_for(&self, result: &CompilationResult) -> Result<crate::manifest::ManifestEntry> {
        let format = match result.target_id.as_str() {
            UI_BUNDLE => "script",
            STATIC_BUNDLE => "static",
            id => self
                .registry
                .get(id)
                .map(|d| d.format.as_str())
                .unwrap_or("module"),
        };
        entry_from_files(&result.target_id, format, &self.out_dir, &result.emitted_files)
    }
}
