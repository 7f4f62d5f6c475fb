//! Output formatting helpers.

use std::time::Duration;
use tandem_build::BuildReport;

/// Format a duration for human consumption.
///
/// Sub-second durations show milliseconds, longer ones seconds with one
/// decimal, minutes past 60s.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the per-bundle summary after a successful full build.
pub fn print_build_summary(report: &BuildReport) {
    super::info(&format!("Mode: {}", report.mode));
    for entry in report.manifest.iter() {
        super::info(&format!(
            "  {} ({}): {} file(s)",
            entry.bundle_name,
            entry.format,
            entry.files.len()
        ));
    }
    super::success(&format!(
        "Build completed in {}",
        format_duration(report.duration)
    ));
}
