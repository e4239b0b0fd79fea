/// Declared media types and the normalization rules applied to them
///
/// A source image carries the media type it was declared with (derived from
/// its file extension), which decides whether it is accepted and which format
/// the engine encodes it back to.
use crate::error::{Result, ShrinkError};
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// JPEG, lossy with a quality knob
    Jpeg,
    /// PNG, lossless; never produced as output
    Png,
    /// WebP, encoded losslessly
    WebP,
    /// Anything else, carried as its raw MIME string
    Other(String),
}

impl MediaType {
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => MediaType::Jpeg,
            "png" => MediaType::Png,
            "webp" => MediaType::WebP,
            "bmp" => MediaType::Other("image/bmp".to_string()),
            "gif" => MediaType::Other("image/gif".to_string()),
            "tif" | "tiff" => MediaType::Other("image/tiff".to_string()),
            "" => MediaType::Other("application/octet-stream".to_string()),
            other => MediaType::Other(format!("application/x-{}", other)),
        }
    }

    /// Declared type of a file, the way a browser fills in `File.type`.
    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn mime_type(&self) -> &str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::WebP => "image/webp",
            MediaType::Other(mime) => mime,
        }
    }

    /// Only JPEG and PNG uploads are accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, MediaType::Jpeg | MediaType::Png)
    }

    /// PNG has no lossy path, so it is re-encoded as JPEG.
    pub fn output_type(&self) -> MediaType {
        match self {
            MediaType::Png => MediaType::Jpeg,
            other => other.clone(),
        }
    }

    pub fn to_image_format(&self) -> Result<ImageFormat> {
        match self {
            MediaType::Jpeg => Ok(ImageFormat::Jpeg),
            MediaType::Png => Ok(ImageFormat::Png),
            MediaType::WebP => Ok(ImageFormat::WebP),
            MediaType::Other(mime) => Err(ShrinkError::UnsupportedFormat(mime.clone())),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

impl FromStr for MediaType {
    type Err = ShrinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(MediaType::Jpeg),
            "image/png" => Ok(MediaType::Png),
            "image/webp" => Ok(MediaType::WebP),
            "" => Err(ShrinkError::UnsupportedFormat("empty media type".to_string())),
            other => Ok(MediaType::Other(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_path() {
        assert_eq!(MediaType::from_path(Path::new("a.jpg")), MediaType::Jpeg);
        assert_eq!(MediaType::from_path(Path::new("a.JPEG")), MediaType::Jpeg);
        assert_eq!(MediaType::from_path(Path::new("a.png")), MediaType::Png);
        assert_eq!(MediaType::from_path(Path::new("a.webp")), MediaType::WebP);
        assert_eq!(
            MediaType::from_path(Path::new("a.gif")),
            MediaType::Other("image/gif".to_string())
        );
        assert_eq!(
            MediaType::from_path(Path::new("noext")).mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_only_jpeg_and_png_are_accepted() {
        assert!(MediaType::Jpeg.is_accepted());
        assert!(MediaType::Png.is_accepted());
        assert!(!MediaType::WebP.is_accepted());
        assert!(!MediaType::Other("image/gif".to_string()).is_accepted());
    }

    #[test]
    fn test_png_output_is_normalized_to_jpeg() {
        assert_eq!(MediaType::Png.output_type(), MediaType::Jpeg);
        assert_eq!(MediaType::Jpeg.output_type(), MediaType::Jpeg);
        assert_eq!(MediaType::WebP.output_type(), MediaType::WebP);
    }

    #[test]
    fn test_media_type_from_str() {
        assert_eq!(MediaType::from_str("image/jpeg").unwrap(), MediaType::Jpeg);
        assert_eq!(MediaType::from_str("IMAGE/PNG").unwrap(), MediaType::Png);
        assert_eq!(
            MediaType::from_str("image/gif").unwrap(),
            MediaType::Other("image/gif".to_string())
        );
        assert!(MediaType::from_str("").is_err());
    }

    #[test]
    fn test_other_has_no_image_format() {
        let result = MediaType::Other("image/gif".to_string()).to_image_format();
        assert!(matches!(result, Err(ShrinkError::UnsupportedFormat(_))));
        assert_eq!(MediaType::Png.to_image_format().unwrap(), ImageFormat::Png);
    }
}
