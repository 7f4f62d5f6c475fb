//! Top-level CLI error handling.
//!
//! `CliError` wraps the domain errors from `tandem-config` and
//! `tandem-build` plus the CLI's own failure modes (server, watcher). The
//! binary converts everything to miette reports at the very end for
//! rendering; exit codes fall out of `main` returning `Err`.

use tandem_build::BuildError;
use tandem_config::ConfigError;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration errors - fatal before any compilation starts
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Build process errors (aggregate failures, missing toolchain)
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors - never swallowed silently
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert a CliError to a miette report for rendering.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    match err {
        CliError::Build(BuildError::Aggregate { diagnostics }) => {
            let rendered = diagnostics
                .iter()
                .map(|d| format!("  {}", d))
                .collect::<Vec<_>>()
                .join("\n");
            miette::miette!("Build failed:\n{}", rendered)
        }
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_build::{Diagnostic, Severity};

    #[test]
    fn test_config_error_wraps() {
        let err: CliError = ConfigError::NoTargets.into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_aggregate_report_lists_diagnostics() {
        let err: CliError = BuildError::Aggregate {
            diagnostics: vec![Diagnostic::new(
                Severity::Error,
                Some("worker".to_string()),
                "linking failed",
            )],
        }
        .into();
        let report = cli_error_to_miette(err);
        let msg = format!("{}", report);
        assert!(msg.contains("worker"));
        assert!(msg.contains("linking failed"));
    }
}
