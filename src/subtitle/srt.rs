// SRT subtitle format
use super::timecode::{parse_timestamp, srt_timestamp};
use super::{SubtitleEntry, SubtitleTrack};
use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const ARROW: &str = " --> ";

/// Lines per block: index, time range, text, blank separator.
pub const BLOCK_STRIDE: usize = 4;

/// Render a track as SRT. Every block, including the last, ends with a blank line.
pub fn render_srt(track: &SubtitleTrack) -> String {
    track
        .entries()
        .iter()
        .map(|entry| {
            format!(
                "{}\n{}{}{}\n{}\n\n",
                entry.index,
                srt_timestamp(entry.start),
                ARROW,
                srt_timestamp(entry.end),
                entry.text
            )
        })
        .collect()
}

/// Write a track to `path`, replacing any existing file.
pub fn write_srt(path: &Path, track: &SubtitleTrack) -> Result<()> {
    fs::write(path, render_srt(track))?;
    debug!("Wrote {} SRT entries to {:?}", track.len(), path);
    Ok(())
}

/// One parsed block. Timecodes are kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrtBlock {
    pub index: usize,
    pub start: String,
    pub end: String,
    pub text: String,
}

impl SrtBlock {
    pub fn start_seconds(&self) -> Option<f64> {
        parse_timestamp(&self.start)
    }

    pub fn end_seconds(&self) -> Option<f64> {
        parse_timestamp(&self.end)
    }

    /// Convert to an entry, `None` if either timecode is unreadable.
    pub fn to_entry(&self) -> Option<SubtitleEntry> {
        Some(SubtitleEntry {
            index: self.index,
            start: self.start_seconds()?,
            end: self.end_seconds()?,
            text: self.text.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than four lines left after the index line.
    Truncated,
    /// The line after the index has no `-->` separator.
    MissingArrow,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Truncated => write!(f, "truncated block"),
            SkipReason::MissingArrow => write!(f, "missing time range"),
        }
    }
}

/// A block the scanner could not use, with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedBlock {
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrtDocument {
    pub blocks: Vec<SrtBlock>,
    pub skipped: Vec<SkippedBlock>,
}

impl SrtDocument {
    /// Entries for every block whose timecodes parse.
    pub fn to_entries(&self) -> Vec<SubtitleEntry> {
        self.blocks.iter().filter_map(SrtBlock::to_entry).collect()
    }
}

fn parse_index(line: &str) -> Option<usize> {
    if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    line.parse().ok()
}

/// Scan SRT text in fixed four-line strides.
///
/// Entry text is a single line; a second text line would be read as the
/// blank separator. Blocks that cannot be read are reported in `skipped`.
pub fn parse_srt(content: &str) -> SrtDocument {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .collect();

    let mut document = SrtDocument::default();
    let mut cursor = 0;

    while cursor < lines.len() {
        let Some(index) = parse_index(lines[cursor].trim()) else {
            cursor += 1;
            continue;
        };

        if lines.len() - cursor < BLOCK_STRIDE {
            document.skipped.push(SkippedBlock {
                line: cursor + 1,
                reason: SkipReason::Truncated,
            });
            break;
        }

        let Some((start, rest)) = lines[cursor + 1].trim().split_once(ARROW) else {
            document.skipped.push(SkippedBlock {
                line: cursor + 1,
                reason: SkipReason::MissingArrow,
            });
            cursor += 1;
            continue;
        };
        let end = rest.split(ARROW).next().unwrap_or(rest);

        document.blocks.push(SrtBlock {
            index,
            start: start.trim().to_string(),
            end: end.trim().to_string(),
            text: lines[cursor + 2].trim().to_string(),
        });
        cursor += BLOCK_STRIDE;
    }

    for skip in &document.skipped {
        warn!("Skipped SRT block at line {}: {}", skip.line, skip.reason);
    }

    document
}

pub fn read_srt(path: &Path) -> Result<SrtDocument> {
    let content = fs::read_to_string(path)?;
    let document = parse_srt(&content);
    debug!(
        "Read {} SRT blocks from {:?} ({} skipped)",
        document.blocks.len(),
        path,
        document.skipped.len()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track() -> SubtitleTrack {
        SubtitleTrack::new(vec![
            SubtitleEntry {
                index: 1,
                start: 1.5,
                end: 4.0,
                text: "Hello, world!".to_string(),
            },
            SubtitleEntry {
                index: 2,
                start: 4.5,
                end: 7.0,
                text: "This is a test.".to_string(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_srt_render() {
        let output = render_srt(&sample_track());

        assert_eq!(
            output,
            "1\n00:00:01,500 --> 00:00:04,000\nHello, world!\n\n\
             2\n00:00:04,500 --> 00:00:07,000\nThis is a test.\n\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let track = sample_track();
        let document = parse_srt(&render_srt(&track));

        assert!(document.skipped.is_empty());
        assert_eq!(document.to_entries(), track.entries());
    }

    #[test]
    fn test_parse_keeps_timecode_strings() {
        let document = parse_srt("7\n01:02:05,456 --> 01:02:06,000\nSawasdee\n\n");
        assert_eq!(
            document.blocks,
            vec![SrtBlock {
                index: 7,
                start: "01:02:05,456".to_string(),
                end: "01:02:06,000".to_string(),
                text: "Sawasdee".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_crlf() {
        let document = parse_srt("1\r\n00:00:00,000 --> 00:00:01,000\r\nHi\r\n\r\n");
        assert_eq!(document.blocks.len(), 1);
        assert_eq!(document.blocks[0].text, "Hi");
        assert_eq!(document.blocks[0].end, "00:00:01,000");
    }

    #[test]
    fn test_truncated_trailing_block_skipped() {
        let content = "1\n00:00:00,000 --> 00:00:01,000\nFirst\n\n2\n00:00:01,000 --> 00:00:02,000\nSecond";
        let document = parse_srt(content);

        assert_eq!(document.blocks.len(), 1);
        assert_eq!(
            document.skipped,
            vec![SkippedBlock {
                line: 5,
                reason: SkipReason::Truncated,
            }]
        );
    }

    #[test]
    fn test_missing_arrow_skipped() {
        let content = "1\nnot a time range\nText\n\n2\n00:00:01,000 --> 00:00:02,000\nSecond\n\n";
        let document = parse_srt(content);

        assert_eq!(document.blocks.len(), 1);
        assert_eq!(document.blocks[0].index, 2);
        assert_eq!(document.skipped[0].reason, SkipReason::MissingArrow);
        assert_eq!(document.skipped[0].line, 1);
    }

    #[test]
    fn test_numeric_text_is_payload() {
        let document = parse_srt("1\n00:00:00,000 --> 00:00:01,000\n42\n\n");
        assert_eq!(document.blocks.len(), 1);
        assert_eq!(document.blocks[0].text, "42");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.srt");
        fs::write(&path, "stale content that is much longer than the new track").unwrap();

        write_srt(&path, &sample_track()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), render_srt(&sample_track()));
    }

    #[test]
    fn test_parse_empty() {
        let document = parse_srt("");
        assert!(document.blocks.is_empty());
        assert!(document.skipped.is_empty());
    }
}
