//! Clock labels for the player screen

use std::time::Duration;

/// Format milliseconds as `m:ss` (minutes are not wrapped into hours)
pub fn format_clock(millis: u64) -> String {
    let total_seconds = millis / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// [`format_clock`] for a `Duration`
pub fn format_duration(duration: Duration) -> String {
    format_clock(duration.as_millis() as u64)
}
