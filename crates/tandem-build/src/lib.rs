//! Build graph and target coordination core.
//!
//! This crate decides what to compile, in what order, with which
//! target-specific flags, and assembles the output manifest the runtime
//! loader consumes. The pieces:
//!
//! - [`compiler`] - invokes the native-to-wasm compiler for one target
//! - [`bundler`] - boundary to the external UI bundler
//! - [`assets`] - pass-through pipeline for styles/fonts/HTML
//! - [`graph`] - runs the above concurrently and joins the outcomes
//! - [`manifest`] - atomic-swap published mapping of bundle names to files
//! - [`diagnostics`] - per-target compiler messages, captured as data
//!
//! Compilation failure of one target never aborts its siblings: failures are
//! carried in [`CompilationResult`] values and policy (fail-together for full
//! builds, fail-isolated for watch rebuilds) is applied at the join point in
//! [`graph::BuildGraph`].

pub mod assets;
pub mod bundler;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod manifest;

pub use assets::AssetPipeline;
pub use bundler::{BundleUi, CommandBundler, UI_BUNDLE, UI_LOADER_FILE};
pub use compiler::{Compile, CompilationResult, WasmPackCompiler};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{BuildError, Result};
pub use graph::{BuildGraph, BuildReport, PartialReport, STATIC_BUNDLE};
pub use manifest::{ManifestEntry, ManifestFile, ManifestStore, OutputManifest, MANIFEST_FILE};
