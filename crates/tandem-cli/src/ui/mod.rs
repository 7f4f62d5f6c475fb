//! Terminal UI utilities: status messages and formatted output.
//!
//! Handles environment detection (CI, TTY) and degrades gracefully when
//! terminal features aren't available.

mod format;
mod messages;

pub use format::{format_duration, print_build_summary};
pub use messages::{error, info, success, warning};

/// Apply the process-wide color policy.
///
/// `--no-color` wins unconditionally; otherwise NO_COLOR/FORCE_COLOR and
/// terminal detection decide. Must run before the first status message.
pub fn init_colors(no_color: bool) {
    owo_colors::set_override(!no_color && should_use_color());
}

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::user_attended_stderr()
}
