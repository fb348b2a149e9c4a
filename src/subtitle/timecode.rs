//! Timecode formatting shared by the SRT and ASS writers.
//!
//! Milliseconds are truncated, never rounded: `3725.4567` seconds is
//! `01:02:05,456`. Downstream tools compare these strings byte for byte.

use once_cell::sync::Lazy;
use regex::Regex;

static TIMECODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})$").expect("valid timecode regex")
});

/// Character between seconds and milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `HH:MM:SS,mmm` as used by SRT.
    Comma,
    /// `HH:MM:SS.mmm` as used by the styled track.
    Dot,
}

impl Separator {
    fn as_char(self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Dot => '.',
        }
    }
}

/// Format non-negative seconds. Hours are not wrapped at 24.
pub fn format_timestamp(seconds: f64, separator: Separator) -> String {
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let millis = (((seconds - seconds.floor()) * 1000.0).floor() as u64).min(999);
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours,
        minutes,
        secs,
        separator.as_char(),
        millis
    )
}

pub fn srt_timestamp(seconds: f64) -> String {
    format_timestamp(seconds, Separator::Comma)
}

pub fn ass_timestamp(seconds: f64) -> String {
    format_timestamp(seconds, Separator::Dot)
}

/// Literal `,` to `.` substitution. Nothing else in the string changes.
pub fn comma_to_dot(timecode: &str) -> String {
    timecode.replace(',', ".")
}

/// Parse either timecode variant back into seconds.
pub fn parse_timestamp(timecode: &str) -> Option<f64> {
    let caps = TIMECODE_REGEX.captures(timecode.trim())?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());

    let hours = field(1)?;
    let minutes = field(2)?;
    let secs = field(3)?;
    let millis = field(4)?;

    Some((hours * 3600 + minutes * 60 + secs) as f64 + millis as f64 / 1000.0)
}
