/// Size and count formatting for console output and the text report.
///
/// All internal sizes are `u64` bytes. Floating point only appears at the
/// formatting boundary.

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;
const TB: f64 = GB * 1024.0;

/// Format a byte count as mebibytes with two decimals, e.g. `"12.50 MB"`.
///
/// This is the unit used on every line of the text report, regardless of
/// magnitude, so lines stay comparable within a volume block.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MB)
}

/// Format a byte count with the most fitting binary unit.
pub fn format_size(bytes: u64) -> String {
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else if b < TB {
        format!("{:.2} GB", b / GB)
    } else {
        format!("{:.2} TB", b / TB)
    }
}

/// Format a file count with thousand separators.
pub fn format_count(count: u64) -> String {
    let s = count.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}
