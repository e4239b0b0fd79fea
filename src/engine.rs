use crate::constants::{
    LARGE_INPUT_QUALITY_CAP, LARGE_INPUT_THRESHOLD, MAX_HEIGHT, MAX_WIDTH, SECOND_PASS_QUALITY_CAP,
    SECOND_PASS_SCALE,
};
use crate::error::{Result, ShrinkError};
use crate::formats::MediaType;
use crate::source::{EncodeFailure, EncodedImage, EncodingResult, Outcome, Quality, SourceImage};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, Rgb, RgbImage, Rgba,
};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, warn};

/// Tunables for the re-encoding engine. Defaults match the shipped caps.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeSettings {
    pub max_width: u32,
    pub max_height: u32,
    pub large_input_threshold: u64,
    pub large_input_quality_cap: f32,
    pub second_pass_scale: f64,
    pub second_pass_quality_cap: f32,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            large_input_threshold: LARGE_INPUT_THRESHOLD,
            large_input_quality_cap: LARGE_INPUT_QUALITY_CAP,
            second_pass_scale: SECOND_PASS_SCALE,
            second_pass_quality_cap: SECOND_PASS_QUALITY_CAP,
        }
    }
}

impl EncodeSettings {
    /// Overrides the resolution caps, keeping defaults where `None`.
    pub fn with_caps(max_width: Option<u32>, max_height: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            max_width: max_width.unwrap_or(defaults.max_width),
            max_height: max_height.unwrap_or(defaults.max_height),
            ..defaults
        }
    }
}

// Float slack for products that are whole numbers in exact arithmetic.
const DIMENSION_EPSILON: f64 = 1e-6;

/// Scales both axes by the same factor, truncating to whole pixels and never
/// going below one pixel.
pub fn scale_dimensions(dimensions: (u32, u32), scale: f64) -> (u32, u32) {
    let (width, height) = dimensions;
    let scaled_width = ((f64::from(width) * scale + DIMENSION_EPSILON).floor() as u32).max(1);
    let scaled_height = ((f64::from(height) * scale + DIMENSION_EPSILON).floor() as u32).max(1);
    (scaled_width, scaled_height)
}

/// Proportional downscale into the resolution caps. Never upscales.
pub fn target_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale =
        (f64::from(max_width) / f64::from(width)).min(f64::from(max_height) / f64::from(height));
    scale_dimensions((width, height), scale)
}

/// Large inputs are pushed toward stronger compression whatever was requested.
pub fn effective_quality(requested: Quality, original_len: u64, settings: &EncodeSettings) -> Quality {
    if original_len > settings.large_input_threshold {
        requested.min(settings.large_input_quality_cap)
    } else {
        requested
    }
}

/// What the first pass will do to an image.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodePlan {
    pub natural: (u32, u32),
    pub target: (u32, u32),
    pub output_type: MediaType,
    pub quality: Quality,
}

impl EncodePlan {
    pub fn new(
        natural: (u32, u32),
        declared: &MediaType,
        original_len: u64,
        requested: Quality,
        settings: &EncodeSettings,
    ) -> Self {
        Self {
            natural,
            target: target_dimensions(natural.0, natural.1, settings.max_width, settings.max_height),
            output_type: declared.output_type(),
            quality: effective_quality(requested, original_len, settings),
        }
    }

    pub fn needs_resize(&self) -> bool {
        self.natural != self.target
    }
}

/// Turns a pixel surface into encoded bytes.
pub trait FrameEncoder: Send + Sync + 'static {
    fn encode(&self, image: &DynamicImage, media_type: &MediaType, quality: Quality) -> Result<Vec<u8>>;
}

/// Encoder backed by the `image` crate codecs.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodecEncoder;

impl FrameEncoder for CodecEncoder {
    fn encode(&self, image: &DynamicImage, media_type: &MediaType, quality: Quality) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match media_type {
            MediaType::Jpeg => {
                let rgb = flatten_onto_black(image);
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.to_jpeg_quality());
                encoder
                    .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                    .map_err(|e| ShrinkError::Encode(e.to_string()))?;
            }
            MediaType::Png => {
                let rgba = image.to_rgba8();
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    PngFilterType::Adaptive,
                );
                encoder
                    .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
                    .map_err(|e| ShrinkError::Encode(e.to_string()))?;
            }
            MediaType::WebP => {
                let rgba = image.to_rgba8();
                let encoder = WebPEncoder::new_lossless(&mut buffer);
                encoder
                    .encode(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
                    .map_err(|e| ShrinkError::Encode(e.to_string()))?;
            }
            MediaType::Other(mime) => {
                return Err(ShrinkError::UnsupportedFormat(mime.clone()));
            }
        }
        Ok(buffer)
    }
}

/// Composites any alpha onto black, the way a canvas exports transparent
/// pixels to JPEG.
pub fn flatten_onto_black(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let scale = |channel: u8| ((u16::from(channel) * u16::from(a) + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}

/// The adaptive re-encoding engine.
///
/// Cheap to clone; clones share the same encoder.
pub struct Reencoder<E = CodecEncoder> {
    settings: EncodeSettings,
    encoder: Arc<E>,
}

impl<E> Clone for Reencoder<E> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            encoder: Arc::clone(&self.encoder),
        }
    }
}

impl Reencoder<CodecEncoder> {
    pub fn new(settings: EncodeSettings) -> Self {
        Self::with_encoder(settings, CodecEncoder)
    }
}

impl Default for Reencoder<CodecEncoder> {
    fn default() -> Self {
        Self::new(EncodeSettings::default())
    }
}

impl<E: FrameEncoder> Reencoder<E> {
    pub fn with_encoder(settings: EncodeSettings, encoder: E) -> Self {
        Self {
            settings,
            encoder: Arc::new(encoder),
        }
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Re-encodes `source` so that the result is never larger than the input.
    ///
    /// # Returns
    /// * `Err(ShrinkError::Decode)` - the source bytes are not a decodable image
    /// * `Ok(EncodingResult::Failure)` - an encode pass produced nothing usable
    /// * `Ok(EncodingResult::Success)` - shrunk bytes, or the untouched original
    ///   when neither pass helped
    pub async fn encode(&self, source: &SourceImage, quality: Quality) -> Result<EncodingResult> {
        let image = decode_image(source.shared_bytes()).await?;
        let plan = EncodePlan::new(
            image.dimensions(),
            source.media_type(),
            source.len(),
            quality,
            &self.settings,
        );
        debug!(
            name = source.name(),
            natural = ?plan.natural,
            target = ?plan.target,
            output = %plan.output_type,
            quality = plan.quality.fraction(),
            "planned first pass"
        );

        match self.run_passes(source, image, &plan).await {
            Ok(encoded) => Ok(EncodingResult::Success(encoded)),
            Err(err) => {
                warn!(name = source.name(), error = %err, "re-encoding failed");
                Ok(EncodingResult::Failure(EncodeFailure::from(&err)))
            }
        }
    }

    async fn run_passes(
        &self,
        source: &SourceImage,
        image: DynamicImage,
        plan: &EncodePlan,
    ) -> Result<EncodedImage> {
        let original_len = source.len();

        let canvas = resample(image, plan.target).await?;
        let first = self
            .encode_frame(canvas, plan.output_type.clone(), plan.quality, "first pass")
            .await?;

        if (first.len() as u64) < original_len {
            return Ok(EncodedImage {
                bytes: first,
                media_type: plan.output_type.clone(),
                width: plan.target.0,
                height: plan.target.1,
                outcome: Outcome::FirstPass,
            });
        }
        debug!(
            name = source.name(),
            first_len = first.len(),
            original_len,
            "first pass did not shrink, trying second pass"
        );

        let reloaded = decode_image(Arc::from(first)).await.map_err(|err| match err {
            ShrinkError::Decode(e) => {
                ShrinkError::Encode(format!("first pass output could not be reloaded: {}", e))
            }
            other => other,
        })?;
        let second_target = scale_dimensions(plan.target, self.settings.second_pass_scale);
        let second_quality = plan.quality.min(self.settings.second_pass_quality_cap);
        let canvas = resample(reloaded, second_target).await?;
        let second = self
            .encode_frame(canvas, plan.output_type.clone(), second_quality, "second pass")
            .await?;

        if (second.len() as u64) >= original_len {
            debug!(
                name = source.name(),
                second_len = second.len(),
                original_len,
                "second pass did not shrink, keeping original"
            );
            return Ok(EncodedImage {
                bytes: source.bytes().to_vec(),
                media_type: source.media_type().clone(),
                width: plan.natural.0,
                height: plan.natural.1,
                outcome: Outcome::Original,
            });
        }

        Ok(EncodedImage {
            bytes: second,
            media_type: plan.output_type.clone(),
            width: second_target.0,
            height: second_target.1,
            outcome: Outcome::SecondPass,
        })
    }

    async fn encode_frame(
        &self,
        image: DynamicImage,
        media_type: MediaType,
        quality: Quality,
        pass: &str,
    ) -> Result<Vec<u8>> {
        let encoder = Arc::clone(&self.encoder);
        let bytes = task::spawn_blocking(move || encoder.encode(&image, &media_type, quality)).await??;
        if bytes.is_empty() {
            return Err(ShrinkError::Encode(format!("{} produced no output", pass)));
        }
        Ok(bytes)
    }
}

async fn decode_image(bytes: Arc<[u8]>) -> Result<DynamicImage> {
    let image = task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
    Ok(image)
}

async fn resample(image: DynamicImage, target: (u32, u32)) -> Result<DynamicImage> {
    if image.dimensions() == target {
        return Ok(image);
    }
    let (width, height) = target;
    let resized =
        task::spawn_blocking(move || image.resize_exact(width, height, FilterType::Lanczos3)).await?;
    Ok(resized)
}
