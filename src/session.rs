use crate::archive;
use crate::batch::{compress_batch, ensure_unique_names, BatchState, StatusSink};
use crate::engine::{FrameEncoder, Reencoder};
use crate::error::Result;
use crate::input::accept_uploads;
use crate::source::{Quality, SourceImage};
use std::io::{Seek, Write};
use std::sync::Arc;
use tracing::info;

/// The current upload and the results computed for it.
///
/// Loading a new upload replaces the image set wholesale and discards every
/// earlier result. Bundling reads results without consuming them.
#[derive(Debug, Default)]
pub struct Session {
    images: Vec<SourceImage>,
    state: BatchState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many files were accepted.
    pub fn load(&mut self, files: Vec<SourceImage>) -> Result<usize> {
        let accepted = accept_uploads(files)?;
        ensure_unique_names(&accepted)?;

        self.images = accepted;
        self.state.clear();
        info!(count = self.images.len(), "loaded new upload");
        Ok(self.images.len())
    }

    pub fn images(&self) -> &[SourceImage] {
        &self.images
    }

    pub fn results(&self) -> &BatchState {
        &self.state
    }

    pub fn original_total(&self) -> u64 {
        self.images.iter().map(SourceImage::len).sum()
    }

    /// Compresses the current upload; results for the same names are overwritten.
    pub async fn compress<E: FrameEncoder>(
        &mut self,
        engine: &Reencoder<E>,
        quality: Quality,
        sink: Arc<dyn StatusSink>,
    ) -> Result<&BatchState> {
        let fresh = compress_batch(engine, &self.images, quality, sink).await?;
        for (name, result) in fresh.iter() {
            self.state.record(name, result.clone());
        }
        Ok(&self.state)
    }

    pub fn bundle<W: Write + Seek>(&self, writer: W) -> Result<usize> {
        archive::write_archive(&self.state, writer)
    }
}
