//! Archive assembly
//!
//! Packs the staged files of successful downloads into one deflate-compressed
//! zip held entirely in memory. Member names are the staging file names, which
//! carry the admission index prefix, so they are unique and the archive
//! listing is deterministic regardless of download completion order.

use crate::fetcher::FetchOutcome;
use crate::FetcherError;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Members at or above this size need zip64 extra fields
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// One file to be written into the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Staged file to read
    pub source: PathBuf,

    /// Name of the member inside the archive
    pub member_name: String,
}

/// Derives archive entries from outcomes, in the order given
///
/// Failed outcomes, and successful ones whose staged file no longer exists,
/// produce no entry.
pub fn archive_entries(outcomes: &[FetchOutcome]) -> Vec<ArchiveEntry> {
    outcomes
        .iter()
        .filter_map(|outcome| {
            let path = match outcome.storage_path() {
                Some(path) => path,
                None => {
                    tracing::debug!(
                        "Leaving {} out of the archive: {}",
                        outcome.source_url,
                        outcome.error().unwrap_or("download failed")
                    );
                    return None;
                }
            };

            if !path.is_file() {
                tracing::warn!(
                    "Staged file for {} vanished: {}",
                    outcome.source_url,
                    path.display()
                );
                return None;
            }

            let member_name = path.file_name()?.to_string_lossy().into_owned();
            Some(ArchiveEntry {
                source: path.to_path_buf(),
                member_name,
            })
        })
        .collect()
}

/// Builds an in-memory zip archive from download outcomes
///
/// Only successful outcomes whose staged file still exists are included.
/// When nothing succeeded the result is a valid, empty archive.
///
/// This does blocking file I/O; call it from a blocking context
/// (e.g. `tokio::task::spawn_blocking`).
pub fn build_archive(outcomes: &[FetchOutcome]) -> Result<Vec<u8>, FetcherError> {
    write_entries(&archive_entries(outcomes))
}

/// Writes the given entries into an in-memory zip archive
pub fn write_entries(entries: &[ArchiveEntry]) -> Result<Vec<u8>, FetcherError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        let mut source = File::open(&entry.source)?;
        let size = source.metadata()?.len();
        let options = options.large_file(needs_zip64(size));
        writer.start_file(entry.member_name.as_str(), options)?;
        std::io::copy(&mut source, &mut writer)?;
    }

    let mut cursor = writer.finish()?;
    cursor.flush()?;
    let bytes = cursor.into_inner();

    tracing::info!(
        "Built archive with {} entries ({} bytes)",
        entries.len(),
        bytes.len()
    );

    Ok(bytes)
}

fn needs_zip64(size: u64) -> bool {
    size >= ZIP64_THRESHOLD
}
