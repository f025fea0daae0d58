//! Destination path planning
//!
//! Derives one destination per source, mirroring the source tree under the
//! output directory, and pre-creates every destination directory exactly
//! once before any job is dispatched.

use crate::error::{FlacpressError, Result};
use crate::types::TranscodeJob;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension given to every destination file.
pub const TARGET_EXTENSION: &str = "mp3";

/// Map each source onto its mirrored destination under `output_dir`.
///
/// The destination keeps the source path relative to `source_root`, with the
/// extension replaced by [`TARGET_EXTENSION`].
pub fn plan(sources: &[PathBuf], source_root: &Path, output_dir: &Path) -> Vec<TranscodeJob> {
    sources
        .iter()
        .map(|source| {
            let destination = output_dir
                .join(relative_part(source, source_root))
                .with_extension(TARGET_EXTENSION);
            TranscodeJob {
                source: source.clone(),
                destination,
            }
        })
        .collect()
}

/// The part of `source` that gets mirrored under the output directory.
fn relative_part(source: &Path, source_root: &Path) -> PathBuf {
    match source.strip_prefix(source_root) {
        Ok(relative) if relative.is_relative() && !relative.as_os_str().is_empty() => {
            relative.to_path_buf()
        }
        _ if source.is_relative() => source.to_path_buf(),
        _ => source
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| source.to_path_buf()),
    }
}

/// Create every distinct destination directory, idempotently, exactly once.
///
/// Returns the set of directories so callers can report or inspect them.
pub fn create_destination_dirs(jobs: &[TranscodeJob]) -> Result<BTreeSet<PathBuf>> {
    let dirs: BTreeSet<PathBuf> = jobs
        .iter()
        .filter_map(|job| job.destination.parent().map(Path::to_path_buf))
        .collect();

    for dir in &dirs {
        std::fs::create_dir_all(dir).map_err(|e| FlacpressError::output_error(dir.clone(), e))?;
        debug!("Ensured output directory {}", dir.display());
    }

    Ok(dirs)
}
