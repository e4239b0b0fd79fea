use crate::engine::{FrameEncoder, Reencoder};
use crate::error::{Result, ShrinkError};
use crate::source::{EncodeFailure, EncodedImage, EncodingResult, FailureKind, Quality, SourceImage};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Per-image progress as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageStatus {
    Pending,
    InProgress,
    Succeeded {
        original_size: u64,
        compressed_size: u64,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl ImageStatus {
    fn from_result(original_size: u64, result: &EncodingResult) -> Self {
        match result {
            EncodingResult::Success(encoded) => ImageStatus::Succeeded {
                original_size,
                compressed_size: encoded.len(),
            },
            EncodingResult::Failure(failure) => ImageStatus::Failed {
                kind: failure.kind,
                message: failure.message.clone(),
            },
        }
    }
}

/// Receives status transitions. Updates for different images arrive in any order.
pub trait StatusSink: Send + Sync {
    fn on_status(&self, name: &str, status: &ImageStatus);
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl StatusSink for NoopSink {
    fn on_status(&self, _name: &str, _status: &ImageStatus) {}
}

/// Results of one compression run, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct BatchState {
    results: BTreeMap<String, EncodingResult>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a result, replacing any earlier one for the same name.
    pub fn record(&mut self, name: impl Into<String>, result: EncodingResult) {
        self.results.insert(name.into(), result);
    }

    pub fn get(&self, name: &str) -> Option<&EncodingResult> {
        self.results.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EncodingResult)> {
        self.results.iter().map(|(name, result)| (name.as_str(), result))
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &EncodedImage)> {
        self.iter()
            .filter_map(|(name, result)| result.encoded().map(|encoded| (name, encoded)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &EncodeFailure)> {
        self.iter()
            .filter_map(|(name, result)| result.failure().map(|failure| (name, failure)))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn compressed_total(&self) -> u64 {
        self.successes().map(|(_, encoded)| encoded.len()).sum()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

/// Rejects batches where two images share a file name.
pub fn ensure_unique_names(images: &[SourceImage]) -> Result<()> {
    let mut seen = HashSet::with_capacity(images.len());
    for image in images {
        if !seen.insert(image.name()) {
            return Err(ShrinkError::DuplicateFileName(image.name().to_string()));
        }
    }
    Ok(())
}

/// Runs the engine over every image at once and waits for all of them.
///
/// One image failing never stops the others: decode errors, encode failures
/// and crashed tasks all end up as `EncodingResult::Failure` entries. Only a
/// batch with duplicate names is rejected up front.
pub async fn compress_batch<E: FrameEncoder>(
    engine: &Reencoder<E>,
    images: &[SourceImage],
    quality: Quality,
    sink: Arc<dyn StatusSink>,
) -> Result<BatchState> {
    ensure_unique_names(images)?;

    info!(count = images.len(), quality = quality.fraction(), "starting batch");
    let start_time = Instant::now();

    for image in images {
        sink.on_status(image.name(), &ImageStatus::Pending);
    }

    let handles: Vec<(String, u64, JoinHandle<EncodingResult>)> = images
        .iter()
        .map(|image| {
            let engine = engine.clone();
            let image = image.clone();
            let sink = Arc::clone(&sink);
            let name = image.name().to_string();
            let original_size = image.len();
            let handle = tokio::spawn(async move {
                sink.on_status(image.name(), &ImageStatus::InProgress);
                let result = match engine.encode(&image, quality).await {
                    Ok(result) => result,
                    Err(err) => {
                        warn!(name = image.name(), error = %err, "image rejected");
                        EncodingResult::Failure(EncodeFailure::from(&err))
                    }
                };
                sink.on_status(image.name(), &ImageStatus::from_result(image.len(), &result));
                result
            });
            (name, original_size, handle)
        })
        .collect();

    let mut state = BatchState::new();
    for (name, original_size, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                let failure = EncodeFailure::new(FailureKind::Task, join_err.to_string());
                let result = EncodingResult::Failure(failure);
                sink.on_status(&name, &ImageStatus::from_result(original_size, &result));
                result
            }
        };
        state.record(name, result);
    }

    info!(
        succeeded = state.succeeded_count(),
        failed = state.failed_count(),
        elapsed = ?start_time.elapsed(),
        "batch finished"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EncodeSettings;
    use crate::formats::MediaType;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(String, ImageStatus)>>,
    }

    impl RecordingSink {
        fn statuses_for(&self, name: &str) -> Vec<ImageStatus> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(n, _)| n == name)
                .map(|(_, s)| s.clone())
                .collect()
        }
    }

    impl StatusSink for RecordingSink {
        fn on_status(&self, name: &str, status: &ImageStatus) {
            self.events
                .lock()
                .unwrap()
                .push((name.to_string(), status.clone()));
        }
    }

    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn batch_of_three() -> Vec<SourceImage> {
        vec![
            SourceImage::new("a.png", MediaType::Png, gradient_png(120, 90)),
            SourceImage::new("corrupt.jpg", MediaType::Jpeg, b"\xFF\xD8garbage".to_vec()),
            SourceImage::new("c.png", MediaType::Png, gradient_png(64, 64)),
        ]
    }

    #[tokio::test]
    async fn test_corrupt_image_does_not_abort_batch() {
        let engine = Reencoder::new(EncodeSettings::default());
        let sink = Arc::new(RecordingSink::default());

        let state = compress_batch(&engine, &batch_of_three(), Quality::default(), sink.clone())
            .await
            .unwrap();

        assert_eq!(state.len(), 3);
        assert!(state.get("a.png").unwrap().is_success());
        assert!(state.get("c.png").unwrap().is_success());
        let failure = state.get("corrupt.jpg").unwrap().failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Decode);
        assert_eq!(state.succeeded_count(), 2);
        assert_eq!(state.failed_count(), 1);

        let statuses = sink.statuses_for("corrupt.jpg");
        assert_eq!(statuses[0], ImageStatus::Pending);
        assert_eq!(statuses[1], ImageStatus::InProgress);
        assert!(matches!(
            statuses[2],
            ImageStatus::Failed {
                kind: FailureKind::Decode,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_success_status_reports_sizes() {
        let engine = Reencoder::new(EncodeSettings::default());
        let sink = Arc::new(RecordingSink::default());
        let original = gradient_png(120, 90);
        let images = vec![SourceImage::new("a.png", MediaType::Png, original.clone())];

        let state = compress_batch(&engine, &images, Quality::default(), sink.clone())
            .await
            .unwrap();

        let encoded = state.get("a.png").unwrap().encoded().unwrap();
        let last = sink.statuses_for("a.png").pop().unwrap();
        assert_eq!(
            last,
            ImageStatus::Succeeded {
                original_size: original.len() as u64,
                compressed_size: encoded.len(),
            }
        );
        assert!(encoded.len() <= original.len() as u64);
    }

    #[tokio::test]
    async fn test_duplicate_names_are_rejected() {
        let engine = Reencoder::new(EncodeSettings::default());
        let images = vec![
            SourceImage::new("same.png", MediaType::Png, gradient_png(8, 8)),
            SourceImage::new("same.png", MediaType::Png, gradient_png(9, 9)),
        ];

        let result = compress_batch(&engine, &images, Quality::default(), Arc::new(NoopSink)).await;

        assert!(matches!(result, Err(ShrinkError::DuplicateFileName(name)) if name == "same.png"));
    }

    #[tokio::test]
    async fn test_empty_batch_resolves() {
        let engine = Reencoder::new(EncodeSettings::default());
        let state = compress_batch(&engine, &[], Quality::default(), Arc::new(NoopSink))
            .await
            .unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_batch_state_record_overwrites() {
        let mut state = BatchState::new();
        state.record(
            "a.png",
            EncodingResult::Failure(EncodeFailure::new(FailureKind::Encode, "empty")),
        );
        assert_eq!(state.failed_count(), 1);

        state.record(
            "a.png",
            EncodingResult::Success(EncodedImage {
                bytes: vec![1, 2, 3],
                media_type: MediaType::Jpeg,
                width: 1,
                height: 1,
                outcome: crate::source::Outcome::FirstPass,
            }),
        );
        assert_eq!(state.len(), 1);
        assert_eq!(state.succeeded_count(), 1);
        assert_eq!(state.compressed_total(), 3);

        state.clear();
        assert!(state.is_empty());
    }
}
