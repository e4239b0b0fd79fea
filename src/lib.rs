pub mod archive;
pub mod batch;
pub mod cli;
pub mod constants;
pub mod engine;
pub mod error;
pub mod formats;
pub mod info;
pub mod input;
pub mod logging;
pub mod progress;
pub mod session;
pub mod source;
pub mod utils;

pub use archive::{bundle_to_dir, bundle_to_vec, write_archive};
pub use batch::{compress_batch, BatchState, ImageStatus, NoopSink, StatusSink};
pub use engine::{
    effective_quality, target_dimensions, CodecEncoder, EncodePlan, EncodeSettings, FrameEncoder,
    Reencoder,
};
pub use error::{Result, ShrinkError};
pub use formats::MediaType;
pub use input::{accept_uploads, collect_image_files, load_sources};
pub use session::Session;
pub use source::{
    EncodeFailure, EncodedImage, EncodingResult, FailureKind, Outcome, Quality, SourceImage,
};
pub use utils::format_file_size;
