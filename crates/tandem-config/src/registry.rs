//! Target descriptor registry.
//!
//! The registry is the static list of native compilation targets: one entry
//! per wasm crate, with its output format, extra compiler flags, and the
//! directories whose changes should trigger its recompilation. It is loaded
//! once at startup, validated, and never mutated afterwards.

use crate::error::{ConfigError, Result};
use crate::loading::{TandemConfig, TargetConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output format of a compiled target.
///
/// The distinction is a loading contract, not an optimization detail: the UI
/// imports `Module` targets via dynamic import, while `Global` targets bind
/// to a global runtime symbol and are side-effect-loaded via a plain script
/// tag (or `importScripts` inside a worker) before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Importable via standard dynamic module resolution
    Module,
    /// Binds to a global symbol, loaded by script inclusion
    Global,
}

impl OutputFormat {
    /// The `wasm-pack --target` value implementing this loading contract.
    pub fn wasm_pack_target(self) -> &'static str {
        match self {
            OutputFormat::Module => "web",
            OutputFormat::Global => "no-modules",
        }
    }

    /// Human-readable contract name, as recorded in the manifest.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Module => "module",
            OutputFormat::Global => "global",
        }
    }
}

/// One independently compiled native-to-wasm unit.
///
/// Immutable once the registry is loaded; identity is the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Unique identifier, doubles as the manifest bundle name
    pub id: String,
    /// Crate directory handed to the native compiler
    pub source_dir: PathBuf,
    /// Loading contract of the emitted artifact
    pub format: OutputFormat,
    /// Extra flags appended verbatim to the compiler invocation
    pub extra_flags: Vec<String>,
    /// Directories whose changes trigger recompilation of this target
    pub watch_paths: Vec<PathBuf>,
}

impl TargetDescriptor {
    /// Whether a changed path falls under one of this target's watch paths
    /// (or its own source directory).
    pub fn watches(&self, changed: &Path) -> bool {
        if changed.starts_with(&self.source_dir) {
            return true;
        }
        self.watch_paths.iter().any(|w| changed.starts_with(w))
    }
}

/// Ordered, validated collection of target descriptors.
///
/// Constructed once from configuration and passed by reference to every
/// component that needs it.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<TargetDescriptor>,
}

impl TargetRegistry {
    /// Build the registry from raw configuration.
    ///
    /// Relative source and watch paths are resolved against `root`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoTargets`] if the target list is empty
    /// - [`ConfigError::DuplicateTarget`] if two descriptors share an id
    /// - [`ConfigError::SourceDirNotFound`] if a source directory is missing
    pub fn from_config(config: &TandemConfig, root: &Path) -> Result<Self> {
        if config.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let mut targets = Vec::with_capacity(config.targets.len());
        for raw in &config.targets {
            let descriptor = Self::resolve_target(raw, root)?;

            if targets
                .iter()
                .any(|t: &TargetDescriptor| t.id == descriptor.id)
            {
                return Err(ConfigError::DuplicateTarget {
                    id: descriptor.id.clone(),
                });
            }

            if !descriptor.source_dir.is_dir() {
                return Err(ConfigError::SourceDirNotFound {
                    id: descriptor.id.clone(),
                    dir: descriptor.source_dir.clone(),
                });
            }

            targets.push(descriptor);
        }

        Ok(Self { targets })
    }

    fn resolve_target(raw: &TargetConfig, root: &Path) -> Result<TargetDescriptor> {
        if raw.id.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "targets.id".to_string(),
                value: String::new(),
                hint: "Target ids must be non-empty".to_string(),
            });
        }

        let source_dir = resolve_path(&raw.source_dir, root);
        let mut watch_paths: Vec<PathBuf> =
            raw.watch_paths.iter().map(|p| resolve_path(p, root)).collect();
        // The source directory is always watched, whether listed or not.
        if !watch_paths.contains(&source_dir) {
            watch_paths.push(source_dir.clone());
        }

        Ok(TargetDescriptor {
            id: raw.id.clone(),
            source_dir,
            format: raw.format,
            extra_flags: raw.extra_flags.clone(),
            watch_paths,
        })
    }

    /// Iterate descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TargetDescriptor> {
        self.targets.iter()
    }

    /// Look up a descriptor by id.
    pub fn get(&self, id: &str) -> Option<&TargetDescriptor> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// All target ids, in declaration order.
    pub fn ids(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.id.clone()).collect()
    }

    /// Ids of targets affected by a changed path.
    pub fn affected_by(&self, changed: &Path) -> Vec<String> {
        self.targets
            .iter()
            .filter(|t| t.watches(changed))
            .map(|t| t.id.clone())
            .collect()
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the registry is empty (never true after validation).
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::TandemConfig;

    fn config_with_targets(targets: Vec<TargetConfig>) -> TandemConfig {
        TandemConfig {
            targets,
            ..TandemConfig::default_config()
        }
    }

    fn target(id: &str, dir: &str) -> TargetConfig {
        TargetConfig {
            id: id.to_string(),
            source_dir: PathBuf::from(dir),
            format: OutputFormat::Module,
            extra_flags: vec![],
            watch_paths: vec![],
        }
    }

    #[test]
    fn test_wasm_pack_target_mapping() {
        assert_eq!(OutputFormat::Module.wasm_pack_target(), "web");
        assert_eq!(OutputFormat::Global.wasm_pack_target(), "no-modules");
    }

    #[test]
    fn test_registry_rejects_empty() {
        let config = config_with_targets(vec![]);
        let err = TargetRegistry::from_config(&config, Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::NoTargets));
    }

    #[test]
    fn test_registry_rejects_duplicate_ids() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("app")).unwrap();

        let config = config_with_targets(vec![target("app", "app"), target("app", "app")]);
        let err = TargetRegistry::from_config(&config, tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTarget { id } if id == "app"));
    }

    #[test]
    fn test_registry_rejects_missing_source_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_with_targets(vec![target("app", "does-not-exist")]);
        let err = TargetRegistry::from_config(&config, tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::SourceDirNotFound { id, .. } if id == "app"));
    }

    #[test]
    fn test_registry_resolves_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("app")).unwrap();

        let config = config_with_targets(vec![target("app", "app")]);
        let registry = TargetRegistry::from_config(&config, tmp.path()).unwrap();
        let descriptor = registry.get("app").unwrap();
        assert_eq!(descriptor.source_dir, tmp.path().join("app"));
        // Source dir is implicitly watched
        assert!(descriptor.watches(&tmp.path().join("app/src/lib.rs")));
    }

    #[test]
    fn test_affected_by_ancestor_containment() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("app")).unwrap();
        std::fs::create_dir(tmp.path().join("worker")).unwrap();
        std::fs::create_dir(tmp.path().join("shared")).unwrap();

        let mut app = target("app", "app");
        app.watch_paths = vec![PathBuf::from("shared")];
        let worker = target("worker", "worker");

        let config = config_with_targets(vec![app, worker]);
        let registry = TargetRegistry::from_config(&config, tmp.path()).unwrap();

        let affected = registry.affected_by(&tmp.path().join("shared/geometry.rs"));
        assert_eq!(affected, vec!["app".to_string()]);

        let affected = registry.affected_by(&tmp.path().join("worker/src/lib.rs"));
        assert_eq!(affected, vec!["worker".to_string()]);

        let affected = registry.affected_by(&tmp.path().join("unrelated/file.rs"));
        assert!(affected.is_empty());
    }

    #[test]
    fn test_declaration_order_preserved() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("app")).unwrap();
        std::fs::create_dir(tmp.path().join("worker")).unwrap();

        let config = config_with_targets(vec![target("app", "app"), target("worker", "worker")]);
        let registry = TargetRegistry::from_config(&config, tmp.path()).unwrap();
        assert_eq!(registry.ids(), vec!["app".to_string(), "worker".to_string()]);
    }
}
