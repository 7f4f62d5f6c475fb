//! Static asset pass-through pipeline.
//!
//! Styles, fonts, and HTML are external concerns; this pipeline only copies
//! the configured asset roots into the output directory so they ship with
//! the bundle. In production, filenames gain a short content hash for
//! long-term caching; HTML files keep their names so they stay addressable.

use crate::compiler::CompilationResult;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::manifest::short_hash;
use std::path::{Path, PathBuf};
use tandem_config::ModeSettings;

/// Bundle name of the static asset pass in the manifest.
pub const STATIC_BUNDLE: &str = "static";

/// Copies asset roots into the output directory.
pub struct AssetPipeline {
    roots: Vec<PathBuf>,
    out_dir: PathBuf,
}

impl AssetPipeline {
    /// Create a pipeline copying `roots` (resolved against `project_root`)
    /// into `<out_dir>/static/`.
    pub fn new(roots: &[PathBuf], project_root: &Path, out_dir: impl Into<PathBuf>) -> Self {
        let roots = roots
            .iter()
            .map(|r| {
                if r.is_absolute() {
                    r.clone()
                } else {
                    project_root.join(r)
                }
            })
            .collect();
        Self {
            roots,
            out_dir: out_dir.into(),
        }
    }

    /// Run the pass-through copy.
    ///
    /// Missing roots are surfaced as warnings, not failures; an unreadable
    /// file fails the pass (captured in the result, like a target compile).
    pub async fn process(&self, settings: ModeSettings) -> Result<CompilationResult> {
        let roots = self.roots.clone();
        let dest_root = self.out_dir.join(STATIC_BUNDLE);
        let hashed = settings.filename_hashing;

        // Plain file copies; cheap enough to run off the async executor.
        tokio::task::spawn_blocking(move || copy_roots(&roots, &dest_root, hashed))
            .await
            .map_err(|e| crate::error::BuildError::Io(std::io::Error::other(e)))?
    }
}

fn copy_roots(roots: &[PathBuf], dest_root: &Path, hashed: bool) -> Result<CompilationResult> {
    let mut emitted = Vec::new();
    let mut diagnostics = Vec::new();

    for root in roots {
        if !root.is_dir() {
            diagnostics.push(Diagnostic::new(
                crate::diagnostics::Severity::Warning,
                Some(STATIC_BUNDLE.to_string()),
                format!("asset root not found: {}", root.display()),
            ));
            continue;
        }

        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let source = entry.path();
            let rel = source.strip_prefix(root).unwrap_or(source);
            let dest = dest_root.join(output_name(rel, source, hashed)?);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(source, &dest)?;
            emitted.push(dest);
        }
    }

    emitted.sort();
    Ok(CompilationResult {
        target_id: STATIC_BUNDLE.to_string(),
        success: true,
        emitted_files: emitted,
        diagnostics,
    })
}

/// Relative output path for one asset.
///
/// With hashing enabled, `fonts/icons.woff2` becomes
/// `fonts/icons.<hash>.woff2`. HTML is exempt: it is the addressable entry
/// surface, not a cached subresource.
fn output_name(rel: &Path, source: &Path, hashed: bool) -> Result<PathBuf> {
    let is_html = rel
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    if !hashed || is_html {
        return Ok(rel.to_path_buf());
    }

    let bytes = std::fs::read(source)?;
    let hash = short_hash(&bytes);
    let stem = rel.file_stem().unwrap_or_default().to_string_lossy();
    let name = match rel.extension() {
        Some(ext) => format!("{}.{}.{}", stem, hash, ext.to_string_lossy()),
        None => format!("{}.{}", stem, hash),
    };
    Ok(rel.with_file_name(name))
}
