pub mod ass;
pub mod convert;
pub mod srt;
pub mod timecode;

pub use ass::{AssColor, BorderStyle, DialogueLine, Margins, ScriptHeader, StyleSpec, StyledTrack};
pub use convert::{build_track_pair, TrackPair};
pub use srt::{parse_srt, read_srt, write_srt, SkipReason, SkippedBlock, SrtBlock, SrtDocument};

use crate::error::{BurnsubError, Result};

/// One numbered subtitle, times in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Ordered entries numbered `1..=N` with non-decreasing start times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleTrack {
    entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    pub fn new(entries: Vec<SubtitleEntry>) -> Result<Self> {
        let mut previous_start = f64::NEG_INFINITY;

        for (position, entry) in entries.iter().enumerate() {
            if entry.index != position + 1 {
                return Err(BurnsubError::InvalidTrack(format!(
                    "entry at position {} has index {}",
                    position + 1,
                    entry.index
                )));
            }
            if entry.end < entry.start {
                return Err(BurnsubError::InvalidTrack(format!(
                    "entry {} ends ({}) before it starts ({})",
                    entry.index, entry.end, entry.start
                )));
            }
            if entry.start < previous_start {
                return Err(BurnsubError::InvalidTrack(format!(
                    "entry {} starts at {} before the previous entry ({})",
                    entry.index, entry.start, previous_start
                )));
            }
            previous_start = entry.start;
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<SubtitleEntry> {
        self.entries
    }
}
