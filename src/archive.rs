use crate::batch::BatchState;
use crate::constants::ARCHIVE_NAME;
use crate::error::{Result, ShrinkError};
use std::fs::{self, File};
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes one stored entry per successful result and returns the entry count.
///
/// Entries keep the original file name even when the bytes changed format,
/// so `photo.png` may hold JPEG data.
pub fn write_archive<W: Write + Seek>(state: &BatchState, writer: W) -> Result<usize> {
    if state.succeeded_count() == 0 {
        return Err(ShrinkError::NothingToBundle);
    }

    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    let mut entries = 0;
    for (name, encoded) in state.successes() {
        zip.start_file(name, options)?;
        zip.write_all(&encoded.bytes)?;
        entries += 1;
    }
    zip.finish()?;
    Ok(entries)
}

pub fn bundle_to_vec(state: &BatchState) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_archive(state, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Writes `compressed_images.zip` into `output_dir`, creating it if needed.
pub fn bundle_to_dir(state: &BatchState, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .map_err(|_| ShrinkError::DirectoryCreationFailed(output_dir.to_path_buf()))?;

    let archive_path = output_dir.join(ARCHIVE_NAME);
    let file = File::create(&archive_path)?;
    let entries = write_archive(state, file)?;
    info!(path = ?archive_path, entries, "archive written");
    Ok(archive_path)
}
