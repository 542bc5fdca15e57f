//! Terminal output helpers

use anyhow::anyhow;
use romhub_core::PipelineError;
use romhub_core::library::ResolutionError;

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Name lookup failure, with "did you mean" suggestions.
pub fn lookup_error(err: ResolutionError) -> anyhow::Error {
    anyhow!(err.display_with_hint())
}

/// Log the full pipeline error and hand back the short user-facing one.
pub fn pipeline_error(err: PipelineError) -> anyhow::Error {
    if !err.is_canceled() {
        tracing::error!("{}", err);
    }
    anyhow!(err.user_message())
}
