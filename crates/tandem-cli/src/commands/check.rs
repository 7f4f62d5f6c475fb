//! Check command implementation.
//!
//! Validates configuration and the target registry without compiling
//! anything: unique ids, existing source directories, a sane UI/asset
//! setup. Reports what a build would do.

use crate::cli::CheckArgs;
use crate::commands::resolve_root;
use crate::error::Result;
use crate::ui;
use tandem_config::{TandemConfig, TargetRegistry};

/// Execute the check command.
///
/// # Errors
///
/// Returns the first configuration error found: missing config file,
/// duplicate target ids, missing source directories, or an empty registry.
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let config = TandemConfig::load(args.config.as_deref())?;
    let root = resolve_root(args.cwd.as_deref())?;

    let registry = TargetRegistry::from_config(&config, &root)?;
    ui::success("Configuration is valid!");

    ui::info(&format!("Would build {} target(s):", registry.len()));
    for descriptor in registry.iter() {
        ui::info(&format!(
            "  {} ({}) from {}",
            descriptor.id,
            descriptor.format.as_str(),
            descriptor.source_dir.display()
        ));
    }

    match &config.ui {
        Some(ui_config) => ui::info(&format!(
            "UI pass: {} via `{}`",
            ui_config.entry.display(),
            ui_config.bundler.join(" ")
        )),
        None => ui::info("UI pass: none configured"),
    }

    if config.assets.roots.is_empty() {
        ui::info("Asset roots: none configured");
    } else {
        for asset_root in &config.assets.roots {
            let resolved = if asset_root.is_absolute() {
                asset_root.clone()
            } else {
                root.join(asset_root)
            };
            if resolved.is_dir() {
                ui::info(&format!("  asset root {} exists", asset_root.display()));
            } else {
                ui::warning(&format!(
                    "  asset root {} does not exist (skipped at build time)",
                    asset_root.display()
                ));
            }
        }
    }

    ui::info(&format!("Output directory: {}", config.out_dir.display()));
    ui::success("All checks passed!");
    Ok(())
}
