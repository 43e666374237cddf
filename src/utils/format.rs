use chrono::{DateTime, Utc};
use std::time::Duration;

/// Human-readable run duration, e.g. "02 sec" or "01 min 09 sec".
pub fn format_execution_time(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    if minutes > 0 {
        format!("{:02} min {:02} sec", minutes, seconds)
    } else {
        format!("{:02} sec", seconds)
    }
}

/// Audit date label, e.g. "Thu Aug 28 2026".
pub fn format_audit_date(date: DateTime<Utc>) -> String {
    date.format("%a %b %-d %Y").to_string()
}
