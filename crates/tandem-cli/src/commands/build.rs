//! Build command implementation.
//!
//! Assembles the build graph from configuration and either runs one full
//! pass (production) or hands off to the dev loop (development: initial
//! build, watch, serve, live reload).

use crate::cli::BuildArgs;
use crate::commands::resolve_root;
use crate::error::Result;
use crate::{dev, ui};
use std::sync::Arc;
use tandem_build::{
    AssetPipeline, BuildGraph, CommandBundler, Compile, ManifestStore, WasmPackCompiler,
};
use tandem_config::{BuildMode, TandemConfig, TargetRegistry};

/// Execute the build command.
///
/// # Errors
///
/// Returns configuration errors before any compilation starts, and an
/// aggregate build error when a full pass fails.
pub async fn execute(args: BuildArgs) -> Result<()> {
    ui::info("Loading configuration...");
    let config = TandemConfig::load(args.config.as_deref())?;

    // CLI flag > config file > development default
    let mode: BuildMode = args.mode.map(Into::into).unwrap_or(config.mode);

    let root = resolve_root(args.cwd.as_deref())?;
    let registry = Arc::new(TargetRegistry::from_config(&config, &root)?);
    ui::info(&format!(
        "Registry: {} target(s): {}",
        registry.len(),
        registry.ids().join(", ")
    ));

    let out_dir = config.resolved_out_dir(&root);
    std::fs::create_dir_all(&out_dir)?;

    let graph = Arc::new(assemble_graph(&config, &registry, &root, &out_dir));

    if mode.settings().watch_enabled {
        let port = args.port.unwrap_or(config.dev.port);
        dev::serve(graph, registry, &config, root, out_dir, port).await
    } else {
        ui::info("Building in production mode...");
        let report = graph.run_full(mode).await?;
        ui::print_build_summary(&report);
        Ok(())
    }
}

/// Wire up the graph's collaborators from configuration.
fn assemble_graph(
    config: &TandemConfig,
    registry: &Arc<TargetRegistry>,
    root: &std::path::Path,
    out_dir: &std::path::Path,
) -> BuildGraph {
    let compiler: Arc<dyn Compile> = Arc::new(WasmPackCompiler::new(out_dir));

    let bundler = config
        .ui
        .as_ref()
        .map(|ui_config| {
            Arc::new(CommandBundler::new(ui_config.clone(), out_dir, root))
                as Arc<dyn tandem_build::BundleUi>
        });

    let assets = (!config.assets.roots.is_empty())
        .then(|| Arc::new(AssetPipeline::new(&config.assets.roots, root, out_dir)));

    let store = Arc::new(ManifestStore::new(out_dir));

    BuildGraph::new(
        Arc::clone(registry),
        compiler,
        bundler,
        assets,
        store,
        out_dir,
    )
}
