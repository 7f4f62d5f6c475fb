//! Build process errors.
//!
//! Only conditions that invalidate the whole pass live here. A single
//! target's compile failure is data ([`crate::CompilationResult`] with
//! `success: false`), not an error; the aggregate policy is applied when the
//! build graph joins.

use crate::diagnostics::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Build process errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The native compiler binary could not be spawned at all
    #[error("Compiler toolchain not found: '{command}'\n\nHint: Install wasm-pack (https://rustwasm.github.io/wasm-pack/) and ensure it is on PATH")]
    ToolchainMissing {
        /// The command that failed to spawn
        command: String,
    },

    /// One or more targets (or the UI pass) failed in a full build
    #[error("Build failed: {}\n{}", summary(.diagnostics), render(.diagnostics))]
    Aggregate {
        /// All diagnostics collected across the failed pass
        diagnostics: Vec<Diagnostic>,
    },

    /// The configured UI bundler command could not be spawned
    #[error("UI bundler command failed to start: '{command}': {source}\n\nHint: Check the 'ui.bundler' command in tandem.config.json")]
    BundlerSpawn {
        /// The command that failed to spawn
        command: String,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// The manifest could not be written to disk
    #[error("Failed to write manifest {}: {source}\n\nHint: Check output directory permissions", .path.display())]
    ManifestWrite {
        /// Manifest path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// I/O error during output assembly
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest serialization error
    #[error("Manifest serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using `BuildError` as the default error type.
pub type Result<T, E = BuildError> = std::result::Result<T, E>;

fn summary(diagnostics: &[Diagnostic]) -> String {
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == crate::diagnostics::Severity::Error)
        .count();
    format!("{} error(s)", errors)
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  {}", d))
        .collect::<Vec<_>>()
        .join("\n")
}
