//! Source metadata extraction
//!
//! Uses lofty to read the Vorbis comment block and picture blocks from a
//! FLAC file into an immutable [`TagSet`] snapshot.

use crate::error::{FlacpressError, Result};
use crate::types::{Image, TagSet};
use lofty::config::ParseOptions;
use lofty::flac::FlacFile;
use lofty::ogg::OggPictureStorage;
use lofty::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Read the tag snapshot (comments and pictures) from a FLAC source.
///
/// Fails with [`FlacpressError::SourceRead`] when the file cannot be opened
/// or its metadata blocks cannot be parsed.
pub fn read_source(path: &Path) -> Result<TagSet> {
    read_source_inner(path).map_err(|e| FlacpressError::source_read(path, e.to_string()))
}

fn read_source_inner(path: &Path) -> std::result::Result<TagSet, lofty::error::LoftyError> {
    let mut file = File::open(path)?;
    let flac = FlacFile::read_from(&mut file, ParseOptions::new())?;

    let mut tags = TagSet::new();

    if let Some(comments) = flac.vorbis_comments() {
        for (key, value) in comments.items() {
            tags.insert(key, value);
        }
    }

    for (picture, _info) in flac.pictures() {
        tags.add_image(Image {
            kind: picture.pic_type().as_u8(),
            mime: picture
                .mime_type()
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            description: picture.description().map(str::to_string),
            data: picture.data().to_vec(),
        });
    }

    if tags.is_empty() {
        debug!("No tags found in {}", path.display());
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_source_read_error() {
        let err = read_source(Path::new("/nonexistent/album/track.flac")).unwrap_err();
        assert!(matches!(err, FlacpressError::SourceRead { .. }));
    }

    #[test]
    fn test_garbage_bytes_are_source_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.flac");
        std::fs::write(&path, b"this is not a FLAC stream").unwrap();

        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, FlacpressError::SourceRead { .. }));
    }
}
