/// Utility helpers shared by the collector.
///
/// This module contains:
/// - Time helpers (capture timestamps, banner timestamps)
/// - Small text helpers used by configuration and reporting
///
/// IMPORTANT:
/// - No MQTT or session logic should live here.
/// - Functions in this module must remain deterministic apart
///   from reading the wall clock.

use chrono::{Local, NaiveDateTime};

/// Format used for per-reading capture timestamps.
///
/// Naive local ISO-8601 with microseconds, e.g.
/// `2025-03-14T09:26:53.589793`.
const CAPTURE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Format used for human-facing banners.
const BANNER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the current local time as an ISO-8601 string.
///
/// Used as the `timestamp` column of every accepted reading.
pub fn now_iso() -> String {
    format_capture(Local::now().naive_local())
}

/// Returns the current local time for banner output.
pub fn now_banner() -> String {
    Local::now().format(BANNER_FORMAT).to_string()
}

pub fn format_capture(ts: NaiveDateTime) -> String {
    ts.format(CAPTURE_FORMAT).to_string()
}

/// Appends the `.csv` suffix when the filename does not already end with it.
///
/// Examples:
/// - "wind"          -> "wind.csv"
/// - "wind_data.csv" -> "wind_data.csv"
/// - "wind.CSV"      -> "wind.CSV.csv" (suffix check is case-sensitive)
///
pub fn ensure_csv_suffix(name: &str) -> String {
    if name.ends_with(".csv") {
        name.to_string()
    } else {
        format!("{}.csv", name)
    }
}

/// Horizontal rule used around the final report.
pub fn rule(width: usize) -> String {
    "=".repeat(width)
}
