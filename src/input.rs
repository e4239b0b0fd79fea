use crate::constants::{SUPPORTED_IMAGE_EXTENSIONS, UNSUPPORTED_INPUT_NOTICE};
use crate::error::{Result, ShrinkError};
use crate::source::SourceImage;
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Check if a file path has an image-like extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// Expands one input argument into files.
///
/// A plain file is taken as-is whatever its extension, so that the upload
/// filter can reject it. Directories and glob patterns only yield files with
/// an image-like extension. Hidden entries are skipped while walking. An input
/// that expands to nothing is logged as a warning and skipped.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    } else {
        return Err(ShrinkError::NoImageFilesFound(input.to_string()));
    }

    if image_files.is_empty() {
        warn!(input, "input matched no files");
    }
    image_files.sort();
    debug!(input, found = image_files.len(), "collected input files");
    Ok(image_files)
}

/// Applies the upload rule: only JPEG and PNG go through.
///
/// If nothing is left the whole selection is rejected with a user-facing
/// notice; otherwise unsupported files are dropped silently.
pub fn accept_uploads(files: Vec<SourceImage>) -> Result<Vec<SourceImage>> {
    let total = files.len();
    let accepted: Vec<SourceImage> = files
        .into_iter()
        .filter(|file| file.media_type().is_accepted())
        .collect();

    if accepted.is_empty() {
        return Err(ShrinkError::UnsupportedInput(UNSUPPORTED_INPUT_NOTICE.to_string()));
    }
    if accepted.len() < total {
        debug!(dropped = total - accepted.len(), "dropped unsupported files");
    }
    Ok(accepted)
}

/// Loads every path from disk.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceImage>> {
    paths.iter().map(|path| SourceImage::from_path(path)).collect()
}
