//! Configuration errors.
//!
//! All validation problems are fatal: a bad registry aborts the process
//! before any compilation starts. Each variant carries a hint so the message
//! is actionable on its own.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error("Config file not found: {}\n\nHint: Create a tandem.config.json file or specify --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Config file failed to parse or extract
    #[error("Invalid configuration: {message}\n\nHint: Check tandem.config.json syntax and field types")]
    Invalid {
        /// Extraction error from the underlying provider
        message: String,
    },

    /// Two target descriptors share an identifier
    #[error("Duplicate target id '{id}'\n\nHint: Every entry in 'targets' must have a unique id")]
    DuplicateTarget {
        /// The repeated identifier
        id: String,
    },

    /// A target's source directory does not exist on disk
    #[error("Source directory for target '{id}' not found: {}\n\nHint: Check the 'sourceDir' field or create the crate", .dir.display())]
    SourceDirNotFound {
        /// Target identifier
        id: String,
        /// The missing directory
        dir: PathBuf,
    },

    /// No targets were configured at all
    #[error("No targets configured\n\nHint: Add at least one entry to 'targets' in tandem.config.json")]
    NoTargets,

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `ConfigError` as the default error type.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mentions_path_and_hint() {
        let err = ConfigError::NotFound(PathBuf::from("tandem.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("tandem.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_duplicate_target_mentions_id() {
        let err = ConfigError::DuplicateTarget {
            id: "app".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Duplicate target id 'app'"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_source_dir_not_found() {
        let err = ConfigError::SourceDirNotFound {
            id: "worker".to_string(),
            dir: PathBuf::from("client/bin/native_worker"),
        };
        let msg = err.to_string();
        assert!(msg.contains("worker"));
        assert!(msg.contains("client/bin/native_worker"));
    }
}
