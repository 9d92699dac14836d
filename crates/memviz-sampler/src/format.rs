//! Human-readable formatting for sampled values.
//!
//! All functions are pure and easy to test in isolation.

/// Format a percentage with one decimal, `"--%"` for NaN.
pub fn format_percent(value: f64) -> String {
    if value.is_nan() {
        "--%".into()
    } else {
        format!("{:.1}%", value)
    }
}

/// Private memory column, two decimals.
pub fn format_mib(mib: f64) -> String {
    format!("{:.2} MiB", mib)
}

/// Instance count column, e.g. `"3x"`.
pub fn format_count(count: usize) -> String {
    format!("{count}x")
}

/// Returns values like `"2h 15m 30s"`, `"3d 1h 45m"`, `"0s"`.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;
    let s = secs % 60;

    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else if hours > 0 {
        format!("{hours}h {mins}m {s}s")
    } else if mins > 0 {
        format!("{mins}m {s}s")
    } else {
        format!("{s}s")
    }
}
