pub mod burn;
pub mod download;
pub mod tools;

pub use burn::FfmpegBurner;
pub use download::YtDlp;
pub use tools::{capture_tool, check_tool, preflight, run_tool};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Fetches the source video for a locator (usually a URL).
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch(&self, locator: &str, destination: &Path) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Renders a styled subtitle track into a copy of the video.
#[async_trait]
pub trait SubtitleRenderer: Send + Sync {
    async fn render(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<()>;
    fn name(&self) -> &'static str;
}
