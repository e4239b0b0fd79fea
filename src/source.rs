use crate::constants::{DEFAULT_QUALITY, MAX_QUALITY};
use crate::error::{Result, ShrinkError};
use crate::formats::MediaType;
use image::ImageReader;
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// An uploaded image. The bytes are shared and never mutated.
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    media_type: MediaType,
    bytes: Arc<[u8]>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, media_type: MediaType, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, declaring its media type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ShrinkError::FileNotFound(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ShrinkError::FileNotFound(path.to_path_buf()))?;
        let bytes = fs::read(path)?;
        Ok(Self::new(name, MediaType::from_path(path), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Natural pixel size, read from the image header without a full decode.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let reader = ImageReader::new(Cursor::new(&self.bytes[..])).with_guessed_format()?;
        Ok(reader.into_dimensions()?)
    }
}

/// Lossy compression strength as a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    pub fn from_percent(percent: u8) -> Result<Self> {
        if percent > MAX_QUALITY {
            return Err(ShrinkError::InvalidQuality(percent));
        }
        Ok(Self(f32::from(percent) / 100.0))
    }

    /// Clamps into `[0, 1]`; NaN becomes 0.
    pub fn from_fraction(fraction: f32) -> Self {
        if fraction.is_nan() {
            return Self(0.0);
        }
        Self(fraction.clamp(0.0, 1.0))
    }

    pub fn fraction(self) -> f32 {
        self.0
    }

    pub fn min(self, cap: f32) -> Self {
        Self::from_fraction(self.0.min(cap))
    }

    /// Value on the JPEG encoder's 1..=100 scale.
    pub fn to_jpeg_quality(self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, MAX_QUALITY)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(f32::from(DEFAULT_QUALITY) / 100.0)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

/// Which step of the engine produced the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    FirstPass,
    SecondPass,
    /// Neither pass shrank the file; the untouched input is handed back.
    Original,
}

#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
    pub outcome: Outcome,
}

impl EncodedImage {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The source bytes could not be decoded.
    Decode,
    /// The encoder produced nothing usable.
    Encode,
    /// The worker task panicked or was aborted.
    Task,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Decode => "decode",
            FailureKind::Encode => "encode",
            FailureKind::Task => "task",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl EncodeFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EncodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}

impl From<&ShrinkError> for EncodeFailure {
    fn from(err: &ShrinkError) -> Self {
        let kind = match err {
            ShrinkError::Decode(_) => FailureKind::Decode,
            ShrinkError::Task(_) => FailureKind::Task,
            _ => FailureKind::Encode,
        };
        Self::new(kind, err.to_string())
    }
}

/// Exactly one of these exists per source image per run.
#[derive(Debug, Clone)]
pub enum EncodingResult {
    Success(EncodedImage),
    Failure(EncodeFailure),
}

impl EncodingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EncodingResult::Success(_))
    }

    pub fn encoded(&self) -> Option<&EncodedImage> {
        match self {
            EncodingResult::Success(encoded) => Some(encoded),
            EncodingResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&EncodeFailure> {
        match self {
            EncodingResult::Success(_) => None,
            EncodingResult::Failure(failure) => Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_percent() {
        assert_eq!(Quality::from_percent(80).unwrap().fraction(), 0.8);
        assert_eq!(Quality::from_percent(0).unwrap().fraction(), 0.0);
        assert_eq!(Quality::from_percent(100).unwrap().fraction(), 1.0);
        assert!(matches!(
            Quality::from_percent(101),
            Err(ShrinkError::InvalidQuality(101))
        ));
    }

    #[test]
    fn test_quality_default_is_eighty_percent() {
        assert_eq!(Quality::default(), Quality::from_percent(80).unwrap());
        assert_eq!(Quality::default().to_string(), "80%");
    }

    #[test]
    fn test_quality_from_fraction_clamps() {
        assert_eq!(Quality::from_fraction(1.5).fraction(), 1.0);
        assert_eq!(Quality::from_fraction(-0.2).fraction(), 0.0);
        assert_eq!(Quality::from_fraction(f32::NAN).fraction(), 0.0);
    }

    #[test]
    fn test_jpeg_quality_never_zero() {
        assert_eq!(Quality::from_fraction(0.0).to_jpeg_quality(), 1);
        assert_eq!(Quality::from_fraction(0.6).to_jpeg_quality(), 60);
        assert_eq!(Quality::from_fraction(1.0).to_jpeg_quality(), 100);
    }

    #[test]
    fn test_quality_min() {
        let q = Quality::from_fraction(0.9);
        assert_eq!(q.min(0.6).fraction(), 0.6);
        assert_eq!(Quality::from_fraction(0.3).min(0.6).fraction(), 0.3);
    }

    #[test]
    fn test_source_image_metadata() {
        let source = SourceImage::new("a.jpg", MediaType::Jpeg, vec![1u8, 2, 3]);
        assert_eq!(source.name(), "a.jpg");
        assert_eq!(source.len(), 3);
        assert!(!source.is_empty());
        assert_eq!(source.media_type(), &MediaType::Jpeg);
    }

    #[test]
    fn test_source_image_dimensions_rejects_garbage() {
        let source = SourceImage::new("bad.png", MediaType::Png, b"not an image".to_vec());
        assert!(source.dimensions().is_err());
    }

    #[test]
    fn test_source_image_from_missing_path() {
        let result = SourceImage::from_path(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(ShrinkError::FileNotFound(_))));
    }

    #[test]
    fn test_failure_kind_from_error() {
        let failure = EncodeFailure::from(&ShrinkError::Encode("empty output".to_string()));
        assert_eq!(failure.kind, FailureKind::Encode);
        assert!(failure.message.contains("empty output"));
    }
}
