//! ReplayGain to SoundCheck loudness conversion
//!
//! iTunes-family players read loudness normalization from an `iTunNORM`
//! comment: ten fixed-width hexadecimal codes derived from the album gain
//! (decibels) and the album peak (linear amplitude). The codes at base 1000
//! and 2500 appear twice each, as does the peak; the remaining four slots
//! carry a fixed filler code.

use crate::error::{FlacpressError, Result};
use crate::types::TagSet;

/// Source tag holding the album gain in decibels (optionally suffixed `dB`).
pub const ALBUM_GAIN_TAG: &str = "replaygain_album_gain";
/// Source tag holding the album peak as a linear fraction.
pub const ALBUM_PEAK_TAG: &str = "replaygain_album_peak";

/// Filler code occupying the unused slots of an `iTunNORM` record.
const FILLER_CODE: &str = "0002CA8";

/// Largest value `gain_to_code` may emit; 65535 is never written.
const GAIN_CEILING: u32 = 65534;

/// Encode a decibel gain as a SoundCheck code relative to `base`.
///
/// Computes `round(10^(-gain/10) * base)`, pulled down to 65534 when the
/// result would reach 65535 or more, formatted as zero-padded 8-digit
/// uppercase hex.
pub fn gain_to_code(gain_db: f64, base: u32) -> String {
    let raw = (10f64.powf(-gain_db / 10.0) * f64::from(base)).round();
    let value = (raw as u32).min(GAIN_CEILING);
    format!("{value:08X}")
}

/// Encode a linear peak amplitude as a SoundCheck code.
///
/// Computes `round(peak * 32767)` with the same formatting. Values beyond
/// 32-bit range saturate at `FFFFFFFF` so the record stays fixed-width.
pub fn peak_to_code(peak: f64) -> String {
    let value = (peak * 32767.0).round() as u32;
    format!("{value:08X}")
}

/// Album gain/peak pair, derivable only when both ReplayGain album tags
/// are present in the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessInfo {
    pub gain_db: f64,
    pub peak: f64,
}

impl LoudnessInfo {
    /// Derive loudness info from a source tag set.
    ///
    /// Returns `Ok(None)` unless both album gain and album peak exist;
    /// malformed numeric values are a [`FlacpressError::TagValue`].
    pub fn from_tags(tags: &TagSet) -> Result<Option<Self>> {
        let (Some(gain), Some(peak)) = (tags.first(ALBUM_GAIN_TAG), tags.first(ALBUM_PEAK_TAG))
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            gain_db: parse_gain_db(ALBUM_GAIN_TAG, gain)?,
            peak: parse_number(ALBUM_PEAK_TAG, peak)?,
        }))
    }

    /// The full `iTunNORM` record, space-joined.
    pub fn sound_check(&self) -> String {
        let gain_1000 = gain_to_code(self.gain_db, 1000);
        let gain_2500 = gain_to_code(self.gain_db, 2500);
        let peak = peak_to_code(self.peak);

        [
            gain_1000.as_str(),
            gain_1000.as_str(),
            gain_2500.as_str(),
            gain_2500.as_str(),
            FILLER_CODE,
            FILLER_CODE,
            peak.as_str(),
            peak.as_str(),
            FILLER_CODE,
            FILLER_CODE,
        ]
        .join(" ")
    }
}

/// Parse a gain value, tolerating the conventional `dB` unit suffix.
pub(crate) fn parse_gain_db(field: &str, value: &str) -> Result<f64> {
    let number = value.split_whitespace().next().unwrap_or("");
    let number = number.strip_suffix("dB").unwrap_or(number);
    number
        .parse()
        .map_err(|_| FlacpressError::tag_value(field, value))
}

/// Parse a bare numeric tag value.
pub(crate) fn parse_number(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| FlacpressError::tag_value(field, value))
}
