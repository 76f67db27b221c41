//! Size helper functions.

/// Bytes in a kilobyte.
pub const KB: u64 = 1 << 10;

/// Bytes in a megabyte.
pub const MB: u64 = 1 << 20;

/// Bytes in a gigabyte.
pub const GB: u64 = 1 << 30;

/// Convert kilobytes to bytes.
#[inline]
pub const fn kb(n: u64) -> u64 {
    n * KB
}

/// Convert megabytes to bytes.
#[inline]
pub const fn mb(n: u64) -> u64 {
    n * MB
}

/// Format bytes as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a bytes-per-millisecond rate.
pub fn format_speed(bytes_per_ms: f64) -> String {
    format!("{}/ms", format_bytes(bytes_per_ms as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_conversions() {
        assert_eq!(kb(1), 1024);
        assert_eq!(mb(1), 1024 * 1024);
        assert_eq!(mb(1024), GB);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(2048.7), "2.00 KB/ms");
        assert_eq!(format_speed(0.0), "0 B/ms");
    }
}
