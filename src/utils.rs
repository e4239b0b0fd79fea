/// Utility functions shared by the engine, the batch runner and the CLI
use crate::constants::{FILE_SIZE_UNITS, PROGRESS_BAR_TEMPLATE};
use indicatif::{ProgressBar, ProgressStyle};

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Size with at most two decimals and no trailing zeros (e.g. "0 Bytes", "1.5 KB", "2 MB")
pub fn format_file_size(bytes: u64) -> String {
    const THRESHOLD: u64 = 1024;

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    // floor(log1024(bytes)), computed on integers, capped at the last unit
    let mut unit_index = 0;
    let mut unit_size: u64 = 1;
    while unit_index < FILE_SIZE_UNITS.len() - 1 && bytes / unit_size >= THRESHOLD {
        unit_size *= THRESHOLD;
        unit_index += 1;
    }

    let value = bytes as f64 / unit_size as f64;
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, FILE_SIZE_UNITS[unit_index])
}

/// Calculate compression ratio as a percentage
///
/// # Returns
/// * Positive means reduction, negative means increase, 0 for an empty original
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}

/// Create a progress bar with consistent styling
pub fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}
