const UNITS: [&str; 3] = ["KB", "MB", "GB"];

/// Human readable size using 1024-based steps: `"512 B"`, `"1.50 KB"`,
/// `"8.25 MB"`. Anything past 1024 GB is still expressed in GB.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}

/// Same as [`format_size`] for signed counts; negative values are clamped to `0 B`.
pub fn format_size_signed(bytes: i64) -> String {
    format_size(bytes.max(0) as u64)
}
