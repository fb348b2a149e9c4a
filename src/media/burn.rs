use std::path::Path;
use std::process::Command;

use async_trait::async_trait;
use tracing::info;

use crate::error::{BurnsubError, Result, Stage};

use super::tools::run_tool;
use super::SubtitleRenderer;

fn backslash_escape(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape a path for use as the value of a filter inside `-vf`.
///
/// FFmpeg unescapes the argument twice: once when splitting the filtergraph
/// and once when splitting the filter's options.
pub fn escape_filter_path(path: &Path) -> String {
    let option_value = backslash_escape(&path.to_string_lossy(), &['\\', '\'', ':', '=']);
    backslash_escape(&option_value, &['\\', '\'', '[', ']', ',', ';'])
}

/// Burns an ASS track into the video with FFmpeg's `ass` filter.
pub struct FfmpegBurner {
    binary: String,
}

impl Default for FfmpegBurner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegBurner {
    pub fn new() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn build_command(&self, video: &Path, subtitles: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-y")
            .arg("-i")
            .arg(video)
            .arg("-vf")
            .arg(format!("ass={}", escape_filter_path(subtitles)))
            .args(["-c:a", "copy"])
            .arg(output);
        command
    }
}

#[async_trait]
impl SubtitleRenderer for FfmpegBurner {
    async fn render(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<()> {
        if !subtitles.exists() {
            return Err(BurnsubError::collaborator(
                Stage::Render,
                format!("Subtitle file not found: {}", subtitles.display()),
            ));
        }

        info!("Embedding subtitles into {}", output.display());
        run_tool(Stage::Render, &mut self.build_command(video, subtitles, output))
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
