//! Styled (ASS) track compiled from SRT blocks.
//!
//! A single style is applied to every dialogue line. Timecodes are taken from
//! the SRT text and only have their comma replaced, so whatever precision the
//! resync tool wrote is passed through untouched.

use super::srt::{read_srt, SkippedBlock, SrtDocument};
use super::timecode::comma_to_dot;
use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Colour in ASS `&HAABBGGRR` notation (alpha 00 is opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssColor(pub u32);

impl AssColor {
    pub const WHITE: AssColor = AssColor(0x00FF_FFFF);
    pub const RED: AssColor = AssColor(0x0000_00FF);
    pub const BLACK: AssColor = AssColor(0x0000_0000);
    /// Black at roughly 60% opacity.
    pub const TRANSLUCENT_BLACK: AssColor = AssColor(0x6400_0000);
}

impl std::fmt::Display for AssColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "&H{:08X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    /// Outline plus drop shadow.
    #[default]
    Outline,
    /// Opaque box behind the text.
    OpaqueBox,
}

impl BorderStyle {
    fn code(self) -> u8 {
        match self {
            BorderStyle::Outline => 1,
            BorderStyle::OpaqueBox => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub vertical: u32,
}

/// Font, colour and layout of the single subtitle style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpec {
    pub name: String,
    pub font_name: String,
    pub font_size: u32,
    pub primary_color: AssColor,
    pub secondary_color: AssColor,
    pub outline_color: AssColor,
    pub back_color: AssColor,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike_out: bool,
    pub scale_x: u32,
    pub scale_y: u32,
    pub spacing: u32,
    pub angle: u32,
    pub border_style: BorderStyle,
    pub outline: u32,
    pub shadow: u32,
    /// Numpad position, 2 is bottom centre.
    pub alignment: u8,
    pub margins: Margins,
    pub encoding: u8,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            font_name: "NotoSansThai-SemiBold".to_string(),
            font_size: 42,
            primary_color: AssColor::WHITE,
            secondary_color: AssColor::RED,
            outline_color: AssColor::BLACK,
            back_color: AssColor::TRANSLUCENT_BLACK,
            bold: false,
            italic: false,
            underline: false,
            strike_out: false,
            scale_x: 100,
            scale_y: 100,
            spacing: 0,
            angle: 0,
            border_style: BorderStyle::Outline,
            outline: 2,
            shadow: 1,
            alignment: 2,
            margins: Margins {
                left: 30,
                right: 30,
                vertical: 20,
            },
            encoding: 1,
        }
    }
}

fn flag(value: bool) -> i8 {
    if value {
        -1
    } else {
        0
    }
}

impl StyleSpec {
    pub fn with_font(font_name: impl Into<String>) -> Self {
        Self {
            font_name: font_name.into(),
            ..Self::default()
        }
    }

    /// The `Style:` line. Commas in the font name would shift every field, so
    /// they become spaces.
    pub fn style_line(&self) -> String {
        format!(
            "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.name,
            self.font_name.replace(',', " "),
            self.font_size,
            self.primary_color,
            self.secondary_color,
            self.outline_color,
            self.back_color,
            flag(self.bold),
            flag(self.italic),
            flag(self.underline),
            flag(self.strike_out),
            self.scale_x,
            self.scale_y,
            self.spacing,
            self.angle,
            self.border_style.code(),
            self.outline,
            self.shadow,
            self.alignment,
            self.margins.left,
            self.margins.right,
            self.margins.vertical,
            self.encoding
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHeader {
    pub title: String,
    pub script_type: String,
    pub play_res_x: u32,
    pub play_res_y: u32,
}

impl Default for ScriptHeader {
    fn default() -> Self {
        Self {
            title: "Auto Subtitle".to_string(),
            script_type: "v4.00+".to_string(),
            play_res_x: 1280,
            play_res_y: 720,
        }
    }
}

/// One `Dialogue:` event with `HH:MM:SS.mmm` timecodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    pub start: String,
    pub end: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledTrack {
    pub header: ScriptHeader,
    pub style: StyleSpec,
    pub dialogues: Vec<DialogueLine>,
}

impl StyledTrack {
    /// Build one dialogue line per parsed block.
    pub fn compile(document: &SrtDocument, style: StyleSpec) -> Self {
        let dialogues = document
            .blocks
            .iter()
            .map(|block| DialogueLine {
                start: comma_to_dot(&block.start),
                end: comma_to_dot(&block.end),
                text: block.text.trim_end_matches(['\r', '\n']).to_string(),
            })
            .collect();

        Self {
            header: ScriptHeader::default(),
            style,
            dialogues,
        }
    }

    /// The complete script text, as written to disk.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        debug!("Wrote {} dialogue lines to {:?}", self.dialogues.len(), path);
        Ok(())
    }
}

impl std::fmt::Display for StyledTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[Script Info]")?;
        writeln!(f, "Title: {}", self.header.title)?;
        writeln!(f, "ScriptType: {}", self.header.script_type)?;
        writeln!(f, "PlayResX: {}", self.header.play_res_x)?;
        writeln!(f, "PlayResY: {}", self.header.play_res_y)?;
        writeln!(f)?;

        writeln!(f, "[V4+ Styles]")?;
        writeln!(f, "{STYLE_FORMAT}")?;
        writeln!(f, "{}", self.style.style_line())?;
        writeln!(f)?;

        writeln!(f, "[Events]")?;
        writeln!(f, "{EVENT_FORMAT}")?;
        for line in &self.dialogues {
            writeln!(
                f,
                "Dialogue: 0,{},{},{},,0,0,0,,{}",
                line.start, line.end, self.style.name, line.text
            )?;
        }
        Ok(())
    }
}

/// Read an SRT file, compile it with `style`, and write the styled track.
///
/// Returns the track and the blocks the reader had to skip.
pub fn compile_file(
    input: &Path,
    output: &Path,
    style: StyleSpec,
) -> Result<(StyledTrack, Vec<SkippedBlock>)> {
    let document = read_srt(input)?;
    let track = StyledTrack::compile(&document, style);
    track.write(output)?;

    info!(
        "Compiled {} dialogue lines into {}",
        track.dialogues.len(),
        output.display()
    );

    Ok((track, document.skipped))
}
