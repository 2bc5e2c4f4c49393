//! Human-readable formatting for time estimates

/// Formats a number of seconds as a compact human-readable duration
///
/// Negative inputs clamp to zero.
pub fn format_eta(seconds: i64) -> String {
    let total = seconds.max(0);

    if total < 60 {
        return format!("{}s", total);
    }

    let minutes = total / 60;
    let secs = total % 60;
    if minutes < 60 {
        if secs == 0 {
            return format!("{}m", minutes);
        }
        return format!("{}m{}s", minutes, secs);
    }

    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h{}m", hours, mins)
    }
}
