use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShrinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid quality value: {0}. Must be between 0 and 100")]
    InvalidQuality(u8),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Duplicate file name in batch: {0}")]
    DuplicateFileName(String),

    #[error("No successfully compressed images to bundle")]
    NothingToBundle,

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ShrinkError>;
