//! Logging setup for the tandem CLI.
//!
//! Structured logging via the `tracing` ecosystem with verbosity flags and
//! `RUST_LOG` override. Call [`init_logger`] once at startup, before any
//! logging happens.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Level resolution order: `--verbose` (debug for tandem crates), `--quiet`
/// (errors only), `RUST_LOG`, then the info-level default.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("tandem=debug,tandem_build=debug,tandem_config=debug,tandem_cli=debug")
    } else if quiet {
        EnvFilter::new("tandem=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("tandem=info,tandem_build=info,tandem_config=info,tandem_cli=info")
        })
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
