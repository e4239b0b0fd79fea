use crate::batch::{ImageStatus, StatusSink};
use crate::constants::{ERROR_PREFIX, SUCCESS_PREFIX};
use crate::utils::{calculate_compression_ratio, create_progress_bar, format_file_size};
use indicatif::ProgressBar;
use std::time::Duration;

/// Renders per-image status on a terminal progress bar.
#[derive(Clone)]
pub struct ProgressSink {
    bar: ProgressBar,
}

impl ProgressSink {
    pub fn new(total_files: u64) -> Self {
        let bar = create_progress_bar(total_files);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A sink that tracks progress without drawing anything.
    pub fn hidden(total_files: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_files);
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Line printed for a finished image, or `None` while it is still running.
pub fn status_line(name: &str, status: &ImageStatus) -> Option<String> {
    match status {
        ImageStatus::Pending | ImageStatus::InProgress => None,
        ImageStatus::Succeeded {
            original_size,
            compressed_size,
        } => Some(format!(
            "{} {}: {} -> {} ({:.1}% saved)",
            SUCCESS_PREFIX,
            name,
            format_file_size(*original_size),
            format_file_size(*compressed_size),
            calculate_compression_ratio(*original_size, *compressed_size)
        )),
        ImageStatus::Failed { kind, message } => {
            Some(format!("{} {}: {} failed ({})", ERROR_PREFIX, name, kind, message))
        }
    }
}

impl StatusSink for ProgressSink {
    fn on_status(&self, name: &str, status: &ImageStatus) {
        match status {
            ImageStatus::Pending => {}
            ImageStatus::InProgress => self.bar.set_message(format!("compressing {}", name)),
            ImageStatus::Succeeded { .. } | ImageStatus::Failed { .. } => {
                if let Some(line) = status_line(name, status) {
                    self.bar.println(line);
                }
                self.bar.inc(1);
            }
        }
    }
}
