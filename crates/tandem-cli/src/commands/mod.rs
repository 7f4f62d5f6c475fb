//! Command implementations for the tandem CLI.
//!
//! - [`build`] - full build pass, or watch + dev server in development
//! - [`check`] - configuration and target registry validation
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod build;
pub mod check;

pub use build::execute as build_execute;
pub use check::execute as check_execute;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Resolve the project root: explicit `--cwd` wins, else the process cwd.
pub(crate) fn resolve_root(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd {
        Some(path) => Ok(path.canonicalize()?),
        None => Ok(std::env::current_dir()?),
    }
}
