//! Output manifest: the published mapping from bundle names to emitted files.
//!
//! Consumers (the runtime loader, the dev server) must never observe a
//! mixed-generation manifest, so publishing swaps the whole mapping in one
//! step: in memory via an `Arc` swap under a write lock, on disk via a
//! temp-file rename.

use crate::error::{BuildError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Manifest file name inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One emitted file with its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Path relative to the output directory, `/`-separated
    pub path: String,
    /// Hex blake3 hash of the file contents
    pub hash: String,
}

/// Files belonging to one logical bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Logical bundle name (target id, `ui`, or `static`)
    pub bundle_name: String,
    /// Loading contract: `module`, `global`, or `static`
    pub format: String,
    /// Emitted files in deterministic (path-sorted) order
    pub files: Vec<ManifestFile>,
}

/// The full published mapping. Keys are bundle names, unique by
/// construction; `BTreeMap` keeps serialization byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputManifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl OutputManifest {
    /// Empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest from entries. Later entries with the same bundle
    /// name supersede earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = ManifestEntry>) -> Self {
        let mut manifest = Self::new();
        for entry in entries {
            manifest.insert(entry);
        }
        manifest
    }

    /// Insert or replace one bundle's entry.
    pub fn insert(&mut self, entry: ManifestEntry) {
        self.entries.insert(entry.bundle_name.clone(), entry);
    }

    /// Look up a bundle by name.
    pub fn lookup(&self, bundle_name: &str) -> Option<&ManifestEntry> {
        self.entries.get(bundle_name)
    }

    /// Iterate entries in bundle-name order.
    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    /// Number of bundles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no bundles.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the stable on-disk JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

/// Content hash of a byte slice, full hex.
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Short content hash used for hashed filenames.
pub fn short_hash(bytes: &[u8]) -> String {
    content_hash(bytes)[..8].to_string()
}

/// Build a manifest entry from emitted files.
///
/// Paths are recorded relative to `out_dir`; files are read to compute the
/// content hash.
pub fn entry_from_files(
    bundle_name: &str,
    format: &str,
    out_dir: &Path,
    files: &[PathBuf],
) -> Result<ManifestEntry> {
    let mut manifest_files = Vec::with_capacity(files.len());
    for file in files {
        let bytes = std::fs::read(file)?;
        let rel = file.strip_prefix(out_dir).unwrap_or(file);
        manifest_files.push(ManifestFile {
            path: rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            hash: content_hash(&bytes),
        });
    }
    manifest_files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(ManifestEntry {
        bundle_name: bundle_name.to_string(),
        format: format.to_string(),
        files: manifest_files,
    })
}

/// Holder of the currently published manifest.
///
/// The in-memory view and the on-disk `manifest.json` are updated together
/// by [`ManifestStore::publish`]; readers take cheap `Arc` snapshots and are
/// never exposed to a half-written state.
pub struct ManifestStore {
    current: RwLock<Arc<OutputManifest>>,
    path: PathBuf,
}

impl ManifestStore {
    /// Create a store persisting to `<out_dir>/manifest.json`.
    pub fn new(out_dir: &Path) -> Self {
        Self {
            current: RwLock::new(Arc::new(OutputManifest::new())),
            path: out_dir.join(MANIFEST_FILE),
        }
    }

    /// Atomically publish a new manifest generation.
    ///
    /// Writes the serialized form to a temp file in the same directory and
    /// renames it over the old one, then swaps the in-memory snapshot. A
    /// failed disk write leaves the previous generation visible.
    pub fn publish(&self, manifest: OutputManifest) -> Result<Arc<OutputManifest>> {
        let json = manifest.to_json()?;

        let tmp_path = self.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&tmp_path, &json)?;
            std::fs::rename(&tmp_path, &self.path)
        };
        write().map_err(|source| BuildError::ManifestWrite {
            path: self.path.clone(),
            source,
        })?;

        let published = Arc::new(manifest);
        *self.current.write() = Arc::clone(&published);
        tracing::debug!(bundles = published.len(), path = %self.path.display(), "published manifest");
        Ok(published)
    }

    /// Snapshot of the currently published manifest.
    pub fn snapshot(&self) -> Arc<OutputManifest> {
        Arc::clone(&self.current.read())
    }

    /// On-disk manifest path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, path: &str, hash: &str) -> ManifestEntry {
        ManifestEntry {
            bundle_name: name.to_string(),
            format: "module".to_string(),
            files: vec![ManifestFile {
                path: path.to_string(),
                hash: hash.to_string(),
            }],
        }
    }

    #[test]
    fn test_lookup() {
        let manifest = OutputManifest::from_entries(vec![entry("app", "app/app.wasm", "h1")]);
        assert!(manifest.lookup("app").is_some());
        assert!(manifest.lookup("worker").is_none());
    }

    #[test]
    fn test_serialization_is_stable() {
        let a = OutputManifest::from_entries(vec![
            entry("worker", "worker/worker.wasm", "h2"),
            entry("app", "app/app.wasm", "h1"),
        ]);
        let b = OutputManifest::from_entries(vec![
            entry("app", "app/app.wasm", "h1"),
            entry("worker", "worker/worker.wasm", "h2"),
        ]);
        // Insertion order must not leak into the serialized form
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_entry_from_files_relative_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("app");
        std::fs::create_dir(&pkg).unwrap();
        std::fs::write(pkg.join("b.js"), "js").unwrap();
        std::fs::write(pkg.join("a.wasm"), "wasm").unwrap();

        let entry = entry_from_files(
            "app",
            "module",
            tmp.path(),
            &[pkg.join("b.js"), pkg.join("a.wasm")],
        )
        .unwrap();
        assert_eq!(entry.files.len(), 2);
        assert_eq!(entry.files[0].path, "app/a.wasm");
        assert_eq!(entry.files[1].path, "app/b.js");
        assert_eq!(entry.files[0].hash, content_hash(b"wasm"));
    }

    #[test]
    fn test_publish_swaps_whole_mapping() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(tmp.path());

        store
            .publish(OutputManifest::from_entries(vec![
                entry("app", "app/app.wasm", "h1"),
                entry("worker", "worker/worker.wasm", "h2"),
            ]))
            .unwrap();
        assert_eq!(store.snapshot().len(), 2);

        // Second generation drops `worker`; readers must never see a mix
        store
            .publish(OutputManifest::from_entries(vec![entry(
                "app",
                "app/app.wasm",
                "h3",
            )]))
            .unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.lookup("app").unwrap().files[0].hash, "h3");

        // Disk matches memory
        let on_disk = std::fs::read_to_string(store.path()).unwrap();
        assert!(on_disk.contains("h3"));
        assert!(!on_disk.contains("worker"));
    }

    #[test]
    fn test_short_hash_is_prefix() {
        let full = content_hash(b"data");
        assert!(full.starts_with(&short_hash(b"data")));
        assert_eq!(short_hash(b"data").len(), 8);
    }
}
