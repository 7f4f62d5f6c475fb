//! Build mode resolution.
//!
//! A build runs in exactly one mode, chosen once per invocation. Everything
//! mode-dependent (minification, source maps, watch, filename hashing, live
//! reload) is derived here so the rest of the system never branches on the
//! mode directly.

use serde::{Deserialize, Serialize};

/// The two build modes. Never mixed within a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Incremental rebuilds, live reload, debug-friendly output
    #[default]
    Development,
    /// Minified, content-hashed, no watch overhead
    Production,
}

impl BuildMode {
    /// Derive the per-mode settings.
    ///
    /// Production implies minify, external source maps, no watching, and
    /// content-hashed filenames for long-term caching. Development implies
    /// the inverse, plus a live-reload signal alongside each published
    /// manifest.
    pub fn settings(self) -> ModeSettings {
        match self {
            BuildMode::Development => ModeSettings {
                minify: false,
                source_maps: SourceMapMode::Inline,
                watch_enabled: true,
                filename_hashing: false,
                live_reload: true,
            },
            BuildMode::Production => ModeSettings {
                minify: true,
                source_maps: SourceMapMode::External,
                watch_enabled: false,
                filename_hashing: true,
                live_reload: false,
            },
        }
    }

    /// Human-readable mode name, matching the CLI spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How source maps are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// Embedded in the artifact (fast iteration)
    Inline,
    /// Separate `.map` files next to the artifact
    External,
    /// No source maps at all
    Disabled,
}

/// Settings derived from a [`BuildMode`].
///
/// Immutable for the lifetime of a build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSettings {
    /// Minify bundled output
    pub minify: bool,
    /// Source map emission strategy
    pub source_maps: SourceMapMode,
    /// Whether the watch/rebuild loop runs after the initial build
    pub watch_enabled: bool,
    /// Content-hash output filenames for cache busting
    pub filename_hashing: bool,
    /// Emit a reload signal to connected clients on each publish
    pub live_reload: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_settings() {
        let s = BuildMode::Production.settings();
        assert!(s.minify);
        assert_eq!(s.source_maps, SourceMapMode::External);
        assert!(!s.watch_enabled);
        assert!(s.filename_hashing);
        assert!(!s.live_reload);
    }

    #[test]
    fn test_development_settings() {
        let s = BuildMode::Development.settings();
        assert!(!s.minify);
        assert_eq!(s.source_maps, SourceMapMode::Inline);
        assert!(s.watch_enabled);
        assert!(!s.filename_hashing);
        assert!(s.live_reload);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(BuildMode::Development.to_string(), "development");
        assert_eq!(BuildMode::Production.to_string(), "production");
    }

    #[test]
    fn test_mode_serde_roundtrip() {
        let json = serde_json::to_string(&BuildMode::Production).unwrap();
        assert_eq!(json, "\"production\"");
        let mode: BuildMode = serde_json::from_str("\"development\"").unwrap();
        assert_eq!(mode, BuildMode::Development);
    }
}
