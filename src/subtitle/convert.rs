use super::srt::write_srt;
use super::{SubtitleEntry, SubtitleTrack};
use crate::error::Result;
use crate::transcribe::Segment;
use crate::translate::TranslatorAdapter;
use indicatif::ProgressBar;
use std::path::Path;
use tracing::debug;

/// Original-language and translated tracks built from the same segments.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPair {
    pub original: SubtitleTrack,
    pub translated: SubtitleTrack,
}

impl TrackPair {
    /// Write both tracks, replacing existing files.
    pub fn write(&self, original_path: &Path, translated_path: &Path) -> Result<()> {
        write_srt(original_path, &self.original)?;
        write_srt(translated_path, &self.translated)?;
        Ok(())
    }
}

/// Join line breaks with spaces; the SRT reader expects one text line per block.
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number segments 1..N and translate each text exactly once.
pub async fn build_track_pair(
    segments: &[Segment],
    translator: &mut TranslatorAdapter,
    progress: Option<&ProgressBar>,
) -> Result<TrackPair> {
    let mut original = Vec::with_capacity(segments.len());
    let mut translated = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        let text = single_line(&segment.text);
        let translated_text = single_line(&translator.translate(&text).await);
        debug!("Segment {}: {:?} → {:?}", i + 1, text, translated_text);

        original.push(SubtitleEntry {
            index: i + 1,
            start: segment.start,
            end: segment.end,
            text,
        });
        translated.push(SubtitleEntry {
            index: i + 1,
            start: segment.start,
            end: segment.end,
            text: translated_text,
        });

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(TrackPair {
        original: SubtitleTrack::new(original)?,
        translated: SubtitleTrack::new(translated)?,
    })
}
