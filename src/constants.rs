pub const DEFAULT_QUALITY: u8 = 80;
pub const MAX_QUALITY: u8 = 100;

/// Resolution caps applied before the first encode.
pub const MAX_WIDTH: u32 = 1920;
pub const MAX_HEIGHT: u32 = 1080;

/// Inputs above this size get their first-pass quality capped.
pub const LARGE_INPUT_THRESHOLD: u64 = 1024 * 1024;
pub const LARGE_INPUT_QUALITY_CAP: f32 = 0.6;

pub const SECOND_PASS_SCALE: f64 = 0.8;
pub const SECOND_PASS_QUALITY_CAP: f32 = 0.5;

pub const ARCHIVE_NAME: &str = "compressed_images.zip";

pub const FILE_SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Extensions picked up when walking directories or expanding globs.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "bmp", "tiff", "gif"];

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub const UNSUPPORTED_INPUT_NOTICE: &str = "Please provide JPG or PNG images";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
