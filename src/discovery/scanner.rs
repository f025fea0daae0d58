//! File discovery and scanning

use crate::error::{FlacpressError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extension accepted as a lossless source.
const SOURCE_EXTENSION: &str = "flac";

/// Discovered source file with basic metadata
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Scan a path (file or directory) for FLAC sources
pub fn scan(input: &Path, recursive: bool) -> Result<Vec<SourceFile>> {
    if !input.exists() {
        return Err(FlacpressError::Config(format!(
            "Input path does not exist: {}",
            input.display()
        )));
    }

    let mut files = Vec::new();

    if input.is_file() {
        // Single file mode
        if let Some(file) = try_discover_file(input) {
            files.push(file);
        } else {
            return Err(FlacpressError::Config(format!(
                "Unsupported source format: {} (only .{} is supported)",
                input.display(),
                SOURCE_EXTENSION
            )));
        }
    } else if input.is_dir() {
        // Directory mode
        let walker = if recursive {
            WalkDir::new(input)
        } else {
            WalkDir::new(input).max_depth(1)
        };

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() {
                if let Some(file) = try_discover_file(path) {
                    debug!("Discovered: {}", file.path.display());
                    files.push(file);
                }
            }
        }
    }

    let total_bytes: u64 = files.iter().map(|f| f.size_bytes).sum();
    info!(
        "Discovered {} FLAC files ({:.1} MiB)",
        files.len(),
        total_bytes as f64 / (1024.0 * 1024.0)
    );

    if files.is_empty() {
        warn!("No FLAC files found in {}", input.display());
    }

    Ok(files)
}

/// Try to create a SourceFile if the path has the supported extension
fn try_discover_file(path: &Path) -> Option<SourceFile> {
    let ext = path.extension()?.to_str()?;
    if !ext.eq_ignore_ascii_case(SOURCE_EXTENSION) {
        return None;
    }

    let metadata = std::fs::metadata(path).ok()?;

    Some(SourceFile {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_picks_up_flac_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.flac"), b"x").unwrap();
        fs::write(dir.path().join("b.FLAC"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("c.mp3"), b"x").unwrap();

        let files = scan(dir.path(), true).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_scan_respects_recursion_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("deep")).unwrap();
        fs::write(dir.path().join("top.flac"), b"x").unwrap();
        fs::write(dir.path().join("deep/nested.flac"), b"x").unwrap();

        let flat = scan(dir.path(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = scan(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_single_file_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solo.flac");
        fs::write(&path, b"x").unwrap();

        let files = scan(&path, true).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, path);
        assert_eq!(files[0].size_bytes, 1);
    }

    #[test]
    fn test_single_unsupported_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.ogg");
        fs::write(&path, b"x").unwrap();

        assert!(matches!(
            scan(&path, true),
            Err(FlacpressError::Config(_))
        ));
    }

    #[test]
    fn test_missing_input_is_config_error() {
        assert!(matches!(
            scan(Path::new("/does/not/exist"), true),
            Err(FlacpressError::Config(_))
        ));
    }
}
