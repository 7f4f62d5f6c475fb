//! Command-line interface definition.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tandem_config::BuildMode;

/// Tandem - build orchestrator for hybrid WebAssembly applications.
///
/// Coordinates wasm target compilation, UI bundling, and static assets into
/// one versioned output bundle, with watch mode and live reload in
/// development.
#[derive(Parser, Debug)]
#[command(name = "tandem", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug-level logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available tandem subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a build pass
    ///
    /// Production mode compiles every target, bundles the UI, hashes
    /// filenames, and writes the manifest once. Development mode does an
    /// initial full build, then watches for changes and serves the output
    /// with live reload until interrupted.
    Build(BuildArgs),

    /// Validate configuration and the target registry
    ///
    /// Loads tandem.config.json, checks target ids for uniqueness and
    /// source directories for existence, and reports what would be built.
    Check(CheckArgs),
}

/// Build mode as spelled on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Watch + live reload, debug-friendly output
    Development,
    /// Minified, content-hashed, no watch
    Production,
}

impl From<ModeArg> for BuildMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Development => BuildMode::Development,
            ModeArg::Production => BuildMode::Production,
        }
    }
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Build mode; falls back to the config file's 'mode', then development
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Path to the config file (default: ./tandem.config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root; defaults to the current directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Dev server port (development mode only)
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the config file (default: ./tandem.config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root; defaults to the current directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}
