//! Human-readable byte sizes.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count using the largest binary unit whose value is at least 1.
///
/// Values are rounded to two decimals and always carry at least one decimal
/// digit, so `1024` becomes `"1.0 KB"`. Zero is special-cased to `"0B"`.
pub fn human_readable_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{} {}", format_decimal(value), UNITS[unit])
}

fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        // Shortest representation; rounding above leaves at most two decimals
        format!("{}", value)
    }
}
