//! Configuration layer for the tandem build orchestrator.
//!
//! This crate owns the static inputs of a build: the target registry (which
//! wasm crates get compiled, and how), the build mode (development vs
//! production) with its derived settings, and the config file / environment /
//! CLI layering that produces both.
//!
//! Everything here is immutable once loaded. The registry is constructed once
//! at startup and passed by reference to the build core; nothing does ambient
//! global lookups.

pub mod error;
pub mod loading;
pub mod mode;
pub mod registry;

pub use error::{ConfigError, Result};
pub use loading::{AssetConfig, DevSettings, TandemConfig, TargetConfig, UiConfig};
pub use mode::{BuildMode, ModeSettings, SourceMapMode};
pub use registry::{OutputFormat, TargetDescriptor, TargetRegistry};
