//! Vorbis comment to ID3v2 translation
//!
//! Source tag names map to ID3v2.4 frames through fixed tables. ReplayGain
//! values are carried verbatim in TXXX frames, and when both album gain and
//! album peak are present an iTunes SoundCheck comment is synthesized.

use crate::error::{FlacpressError, Result};
use crate::loudness::LoudnessInfo;
use crate::types::TagSet;
use id3::frame::{Comment, ExtendedText, Picture, PictureType};
use id3::{Content, Frame, Tag, TagLike};

/// Well-known source fields and their ID3v2.4 text frames.
const TEXT_FRAMES: &[(&str, &str)] = &[
    ("artist", "TPE1"),
    ("albumartist", "TPE2"),
    ("album", "TALB"),
    ("title", "TIT2"),
    ("date", "TDRC"),
    ("discnumber", "TPOS"),
    ("composer", "TCOM"),
];

/// Free-form fields carried into TXXX frames under their upper-cased name.
const USER_TEXT_FIELDS: &[&str] = &[
    "replaygain_track_gain",
    "replaygain_track_peak",
    "replaygain_album_gain",
    "replaygain_album_peak",
];

/// Language code of the synthesized SoundCheck comment.
const COMMENT_LANG: &str = "eng";
/// Description of the synthesized SoundCheck comment.
const SOUND_CHECK_DESCRIPTION: &str = "iTunNORM";

/// Translate a source tag set into an ID3v2.4 tag for the destination file.
pub fn translate(tags: &TagSet) -> Result<Tag> {
    let mut out = Tag::new();

    for (field, frame_id) in TEXT_FRAMES {
        if let Some(values) = tags.get(field) {
            out.add_frame(Frame::with_content(
                frame_id,
                Content::new_text_values(values.iter().cloned()),
            ));
        }
    }

    for field in USER_TEXT_FIELDS {
        if let Some(value) = tags.first(field) {
            out.add_frame(ExtendedText {
                description: field.to_uppercase(),
                value: value.to_string(),
            });
        }
    }

    if let Some(track) = compose_track_number(tags)? {
        out.add_frame(Frame::text("TRCK", track));
    }

    for image in tags.images() {
        out.add_frame(Picture {
            mime_type: image.mime.clone(),
            picture_type: picture_type_from_code(image.kind),
            description: image.description.clone().unwrap_or_default(),
            data: image.data.clone(),
        });
    }

    if let Some(info) = LoudnessInfo::from_tags(tags)? {
        out.add_frame(Comment {
            lang: COMMENT_LANG.to_string(),
            description: SOUND_CHECK_DESCRIPTION.to_string(),
            text: info.sound_check(),
        });
    }

    Ok(out)
}

/// Compose the TRCK content.
///
/// `tracktotal` is checked before `totaltracks`; the first present wins.
/// A bare track number is coerced to an integer, stripping leading zeros
/// and whitespace. No TRCK is emitted when `tracknumber` is absent.
fn compose_track_number(tags: &TagSet) -> Result<Option<String>> {
    let Some(raw) = tags.first("tracknumber") else {
        return Ok(None);
    };
    let number: u32 = raw
        .trim()
        .parse()
        .map_err(|_| FlacpressError::tag_value("tracknumber", raw))?;

    let composed = if let Some(total) = tags.first("tracktotal") {
        format!("{number}/{}", total.trim())
    } else if let Some(total) = tags.first("totaltracks") {
        format!("{number}/{}", total.trim())
    } else {
        number.to_string()
    };
    Ok(Some(composed))
}

/// Map an APIC type byte onto the id3 picture type enum.
fn picture_type_from_code(code: u8) -> PictureType {
    match code {
        0 => PictureType::Other,
        1 => PictureType::Icon,
        2 => PictureType::OtherIcon,
        3 => PictureType::CoverFront,
        4 => PictureType::CoverBack,
        5 => PictureType::Leaflet,
        6 => PictureType::Media,
        7 => PictureType::LeadArtist,
        8 => PictureType::Artist,
        9 => PictureType::Conductor,
        10 => PictureType::Band,
        11 => PictureType::Composer,
        12 => PictureType::Lyricist,
        13 => PictureType::RecordingLocation,
        14 => PictureType::DuringRecording,
        15 => PictureType::DuringPerformance,
        16 => PictureType::ScreenCapture,
        17 => PictureType::BrightFish,
        18 => PictureType::Illustration,
        19 => PictureType::BandLogo,
        20 => PictureType::PublisherLogo,
        other => PictureType::Undefined(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Image;

    fn frame_text<'a>(tag: &'a Tag, id: &str) -> Option<&'a str> {
        tag.get(id).and_then(|frame| frame.content().text())
    }

    #[test]
    fn test_well_known_fields_map_to_text_frames() {
        let mut tags = TagSet::new();
        tags.insert("ARTIST", "Stereolab");
        tags.insert("ALBUM", "Dots and Loops");
        tags.insert("TITLE", "Brakhage");
        tags.insert("ALBUMARTIST", "Stereolab");
        tags.insert("DATE", "1997");
        tags.insert("DISCNUMBER", "1");
        tags.insert("COMPOSER", "Gane/Sadier");

        let tag = translate(&tags).unwrap();
        assert_eq!(frame_text(&tag, "TPE1"), Some("Stereolab"));
        assert_eq!(frame_text(&tag, "TALB"), Some("Dots and Loops"));
        assert_eq!(frame_text(&tag, "TIT2"), Some("Brakhage"));
        assert_eq!(frame_text(&tag, "TPE2"), Some("Stereolab"));
        assert_eq!(frame_text(&tag, "TDRC"), Some("1997"));
        assert_eq!(frame_text(&tag, "TPOS"), Some("1"));
        assert_eq!(frame_text(&tag, "TCOM"), Some("Gane/Sadier"));
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let mut tags = TagSet::new();
        tags.insert("TITLE", "Untitled");

        let tag = translate(&tags).unwrap();
        assert_eq!(frame_text(&tag, "TIT2"), Some("Untitled"));
        assert!(tag.get("TPE1").is_none());
        assert!(tag.get("TALB").is_none());
        assert!(tag.get("TRCK").is_none());
        assert_eq!(tag.comments().count(), 0);
    }

    #[test]
    fn test_replaygain_fields_become_user_text() {
        let mut tags = TagSet::new();
        tags.insert("REPLAYGAIN_TRACK_GAIN", "-6.79 dB");
        tags.insert("REPLAYGAIN_TRACK_PEAK", "0.998");

        let tag = translate(&tags).unwrap();
        let texts: Vec<_> = tag.extended_texts().collect();
        assert_eq!(texts.len(), 2);
        assert!(texts
            .iter()
            .any(|t| t.description == "REPLAYGAIN_TRACK_GAIN" && t.value == "-6.79 dB"));
        assert!(texts
            .iter()
            .any(|t| t.description == "REPLAYGAIN_TRACK_PEAK" && t.value == "0.998"));
    }

    #[test]
    fn test_tracktotal_wins_over_totaltracks() {
        let mut tags = TagSet::new();
        tags.insert("TRACKNUMBER", "3");
        tags.insert("TRACKTOTAL", "12");
        tags.insert("TOTALTRACKS", "99");

        let tag = translate(&tags).unwrap();
        assert_eq!(frame_text(&tag, "TRCK"), Some("3/12"));
    }

    #[test]
    fn test_totaltracks_used_as_fallback() {
        let mut tags = TagSet::new();
        tags.insert("TRACKNUMBER", "3");
        tags.insert("TOTALTRACKS", "99");

        let tag = translate(&tags).unwrap();
        assert_eq!(frame_text(&tag, "TRCK"), Some("3/99"));
    }

    #[test]
    fn test_bare_track_number_strips_leading_zeros() {
        let mut tags = TagSet::new();
        tags.insert("TRACKNUMBER", "07");

        let tag = translate(&tags).unwrap();
        assert_eq!(frame_text(&tag, "TRCK"), Some("7"));
    }

    #[test]
    fn test_malformed_track_number_fails() {
        let mut tags = TagSet::new();
        tags.insert("TRACKNUMBER", "three");

        let err = translate(&tags).unwrap_err();
        assert!(matches!(err, FlacpressError::TagValue { .. }));
    }

    #[test]
    fn test_images_pass_through_verbatim() {
        let mut tags = TagSet::new();
        tags.add_image(Image {
            kind: 3,
            mime: "image/jpeg".to_string(),
            description: Some("front".to_string()),
            data: vec![0xFF, 0xD8, 0xFF, 0xE0],
        });

        let tag = translate(&tags).unwrap();
        let pictures: Vec<_> = tag.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].picture_type, PictureType::CoverFront);
        assert_eq!(pictures[0].mime_type, "image/jpeg");
        assert_eq!(pictures[0].description, "front");
        assert_eq!(pictures[0].data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_sound_check_comment_requires_both_album_tags() {
        let mut tags = TagSet::new();
        tags.insert("REPLAYGAIN_ALBUM_GAIN", "0.0 dB");

        let tag = translate(&tags).unwrap();
        assert_eq!(tag.comments().count(), 0);

        tags.insert("REPLAYGAIN_ALBUM_PEAK", "1.0");
        let tag = translate(&tags).unwrap();
        let comments: Vec<_> = tag.comments().collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].lang, "eng");
        assert_eq!(comments[0].description, "iTunNORM");
        assert_eq!(
            comments[0].text,
            "000003E8 000003E8 000009C4 000009C4 0002CA8 0002CA8 00007FFF 00007FFF 0002CA8 0002CA8"
        );
    }

    #[test]
    fn test_translation_is_idempotent() {
        let mut tags = TagSet::new();
        tags.insert("ARTIST", "Can");
        tags.insert("TRACKNUMBER", "5");
        tags.insert("TRACKTOTAL", "7");
        tags.insert("REPLAYGAIN_ALBUM_GAIN", "-4.2 dB");
        tags.insert("REPLAYGAIN_ALBUM_PEAK", "0.95");

        let first = translate(&tags).unwrap();
        let second = translate(&tags).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_picture_code_is_preserved() {
        let mut tags = TagSet::new();
        tags.add_image(Image {
            kind: 42,
            mime: "image/png".to_string(),
            description: None,
            data: vec![1, 2, 3],
        });

        let tag = translate(&tags).unwrap();
        let picture = tag.pictures().next().unwrap();
        assert_eq!(picture.picture_type, PictureType::Undefined(42));
        assert_eq!(picture.description, "");
    }
}
