//! Tandem CLI - build orchestrator for hybrid WebAssembly applications.
//!
//! Ties the configuration layer (`tandem-config`) and the build core
//! (`tandem-build`) into a command-line tool:
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `build` and `check` implementations
//! - [`dev`] - development mode: watcher, scheduler, server, live reload
//! - [`error`] - top-level error type and miette conversion
//! - [`logger`] - tracing setup
//! - [`ui`] - terminal status messages and build summaries

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
