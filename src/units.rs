//! Human-readable byte counts
//!
//! Formatting only touches log and notification text; every comparison in
//! the watcher runs on raw byte integers.

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Format a byte count in the largest unit it fills, from bytes to TiB.
///
/// Plain bytes render as a bare integer (`"512 B"`); every larger unit gets
/// two decimal places (`"1.50 KiB"`). Counts past TiB stay in TiB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}
