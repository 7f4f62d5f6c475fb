//! Boundary to the external UI bundler.
//!
//! Tandem does not bundle JavaScript itself; it invokes whatever bundler the
//! project configured (`ui.bundler` argv) over the entry script and
//! stylesheet entry, translating the mode settings into conventional flags.
//! The pass is joined into the build graph like any target: its outcome is a
//! [`CompilationResult`] with bundle name `ui`.

use crate::compiler::{collect_emitted_files, CompilationResult};
use crate::diagnostics::{self, Diagnostic};
use crate::error::{BuildError, Result};
use crate::manifest::MANIFEST_FILE;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tandem_config::{ModeSettings, SourceMapMode, UiConfig};
use tokio::process::Command;

/// Bundle name of the UI pass in the manifest.
pub const UI_BUNDLE: &str = "ui";

/// Name of the emitted runtime loader shim.
pub const UI_LOADER_FILE: &str = "tandem-loader.js";

/// Seam between the build graph and the UI bundling pass.
#[async_trait]
pub trait BundleUi: Send + Sync {
    /// Run the bundling pass. Bundler failure is captured in the result;
    /// only an unspawnable command is an error.
    async fn bundle(&self, settings: ModeSettings) -> Result<CompilationResult>;
}

/// Invokes the configured bundler command.
///
/// The command receives the entry script (and stylesheet entry, if any) as
/// positional arguments, followed by `--outdir` and mode-derived flags, the
/// conventions of the esbuild family. Projects using a bundler with other
/// flags wrap it in a script.
pub struct CommandBundler {
    config: UiConfig,
    out_dir: PathBuf,
    root: PathBuf,
}

impl CommandBundler {
    /// Create a bundler boundary for the given UI configuration.
    pub fn new(config: UiConfig, out_dir: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            out_dir: out_dir.into(),
            root: root.into(),
        }
    }

    /// Output directory of the UI pass.
    pub fn ui_out_dir(&self) -> PathBuf {
        self.out_dir.join(UI_BUNDLE)
    }

    fn build_args(&self, settings: ModeSettings) -> Vec<String> {
        let mut args: Vec<String> = self.config.bundler[1..].to_vec();
        args.push(resolve(&self.config.entry, &self.root));
        if let Some(ref style) = self.config.style_entry {
            args.push(resolve(style, &self.root));
        }
        args.push(format!("--outdir={}", self.ui_out_dir().display()));
        args.push("--bundle".to_string());
        if settings.minify {
            args.push("--minify".to_string());
        }
        match settings.source_maps {
            SourceMapMode::Inline => args.push("--sourcemap=inline".to_string()),
            SourceMapMode::External => args.push("--sourcemap".to_string()),
            SourceMapMode::Disabled => {}
        }
        args
    }
}

fn resolve(path: &Path, root: &Path) -> String {
    if path.is_absolute() {
        path.display().to_string()
    } else {
        root.join(path).display().to_string()
    }
}

#[async_trait]
impl BundleUi for CommandBundler {
    async fn bundle(&self, settings: ModeSettings) -> Result<CompilationResult> {
        let program = self.config.bundler.first().ok_or_else(|| {
            BuildError::BundlerSpawn {
                command: String::new(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "ui.bundler must name a command",
                ),
            }
        })?;
        let args = self.build_args(settings);
        tracing::debug!(%program, ?args, "invoking UI bundler");

        let output = Command::new(program)
            .args(&args)
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|source| BuildError::BundlerSpawn {
                command: program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut diags = diagnostics::parse_stderr(UI_BUNDLE, &stderr);

        if !output.status.success() {
            if diags.is_empty() {
                diags.push(Diagnostic::error(
                    UI_BUNDLE,
                    format!("{} exited with {}", program, output.status),
                ));
            }
            return Ok(CompilationResult::failure(UI_BUNDLE, diags));
        }

        let mut emitted = collect_emitted_files(&self.ui_out_dir())?;
        let loader = write_loader_shim(&self.out_dir)?;
        emitted.push(loader);
        emitted.sort();

        Ok(CompilationResult {
            target_id: UI_BUNDLE.to_string(),
            success: true,
            emitted_files: emitted,
            diagnostics: diags,
        })
    }
}

/// Write the runtime loader shim next to the manifest.
///
/// The shim implements the loading contract at the UI boundary: it fetches
/// the manifest, dynamically imports the first `module` bundle's entry
/// script, initializes it, and invokes its exported `run` capability.
/// Resolution failures are caught and logged, never left as unhandled
/// rejections. `global` bundles are listed for side-effect loading
/// (`importScripts` inside a worker, script tag on the main thread).
pub fn write_loader_shim(out_dir: &Path) -> Result<PathBuf> {
    let shim = format!(
        r#"// Generated by tandem. Loads the application module via the manifest.
(async () => {{
  try {{
    const res = await fetch('./{manifest}');
    const manifest = await res.json();
    const app = Object.values(manifest).find((e) => e.format === 'module');
    if (!app) throw new Error('no module bundle in manifest');
    const entry = app.files.find((f) => f.path.endsWith('.js'));
    const pkg = await import('./' + entry.path);
    if (typeof pkg.default === 'function') await pkg.default();
    if (typeof pkg.run === 'function') pkg.run();
    else if (typeof pkg.run_app === 'function') pkg.run_app();
  }} catch (err) {{
    console.error('Error loading application module:', err);
  }}
}})();
"#,
        manifest = MANIFEST_FILE
    );
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(UI_LOADER_FILE);
    std::fs::write(&path, shim)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_config::BuildMode;

    fn ui_config(bundler: Vec<&str>) -> UiConfig {
        UiConfig {
            entry: PathBuf::from("www/bootstrap.js"),
            style_entry: Some(PathBuf::from("www/styles/main.scss")),
            bundler: bundler.into_iter().map(String::from).collect(),
            source_dir: PathBuf::from("www"),
        }
    }

    #[test]
    fn test_build_args_production() {
        let bundler = CommandBundler::new(ui_config(vec!["esbuild"]), "/p/dist", "/p");
        let args = bundler.build_args(BuildMode::Production.settings());
        assert!(args.contains(&"/p/www/bootstrap.js".to_string()));
        assert!(args.contains(&"/p/www/styles/main.scss".to_string()));
        assert!(args.contains(&"--outdir=/p/dist/ui".to_string()));
        assert!(args.contains(&"--minify".to_string()));
        assert!(args.contains(&"--sourcemap".to_string()));
    }

    #[test]
    fn test_build_args_development() {
        let bundler = CommandBundler::new(ui_config(vec!["esbuild"]), "/p/dist", "/p");
        let args = bundler.build_args(BuildMode::Development.settings());
        assert!(!args.contains(&"--minify".to_string()));
        assert!(args.contains(&"--sourcemap=inline".to_string()));
    }

    #[test]
    fn test_extra_argv_elements_precede_entry() {
        let bundler = CommandBundler::new(ui_config(vec!["npx", "esbuild"]), "/p/dist", "/p");
        let args = bundler.build_args(BuildMode::Development.settings());
        assert_eq!(args[0], "esbuild");
    }

    #[test]
    fn test_loader_shim_contract() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_loader_shim(tmp.path()).unwrap();
        let shim = std::fs::read_to_string(&path).unwrap();
        // Dynamic import with caught rejection, per the UI entry contract
        assert!(shim.contains("await import("));
        assert!(shim.contains("catch"));
        assert!(shim.contains("console.error"));
        assert!(shim.contains(MANIFEST_FILE));
    }

    #[tokio::test]
    async fn test_unspawnable_bundler_is_error() {
        let bundler = CommandBundler::new(
            ui_config(vec!["tandem-test-no-such-bundler"]),
            "/tmp/dist",
            "/tmp",
        );
        let err = bundler
            .bundle(BuildMode::Development.settings())
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::BundlerSpawn { .. }));
    }
}
