//! Duration strings for hints and feedback copy.

/// Compact form: "45s", "2m 30s", "1h 5m 10s". Fractional seconds truncate.
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as i64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Long form for read-aloud copy: "2 minutes 30 seconds", "45 seconds".
/// Zero components are skipped except for a bare "0 seconds".
pub fn format_duration_long(seconds: f64) -> String {
    let total_seconds = seconds as i64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    let mut parts: Vec<String> = Vec::new();
    if hours > 0 {
        parts.push(if hours == 1 {
            "1 hour".to_string()
        } else {
            format!("{hours} hours")
        });
    }
    if minutes > 0 {
        parts.push(if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{minutes} minutes")
        });
    }
    if secs > 0 || parts.is_empty() {
        parts.push(if secs == 1 {
            "1 second".to_string()
        } else {
            format!("{secs} seconds")
        });
    }

    parts.join(" ")
}
