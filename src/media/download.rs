use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use async_trait::async_trait;
use tracing::info;

use crate::error::{BurnsubError, Result, Stage};

use super::tools::run_tool;
use super::VideoSource;

/// Downloads through `yt-dlp`.
pub struct YtDlp {
    binary: String,
    format: String,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: "mp4".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn command_args(&self, locator: &str, destination: &Path) -> Vec<OsString> {
        vec![
            "-f".into(),
            self.format.as_str().into(),
            "--force-overwrites".into(),
            locator.into(),
            "-o".into(),
            destination.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl VideoSource for YtDlp {
    async fn fetch(&self, locator: &str, destination: &Path) -> Result<()> {
        info!("Downloading video from: {}", locator);

        run_tool(
            Stage::Acquisition,
            Command::new(&self.binary).args(self.command_args(locator, destination)),
        )?;

        if !destination.exists() {
            return Err(BurnsubError::collaborator(
                Stage::Acquisition,
                format!("{} did not produce {}", self.binary, destination.display()),
            ));
        }

        info!("Video saved to {}", destination.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let args = YtDlp::new().command_args(
            "https://www.youtube.com/watch?v=abc",
            Path::new("input/video_downloaded.mp4"),
        );
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-f",
                "mp4",
                "--force-overwrites",
                "https://www.youtube.com/watch?v=abc",
                "-o",
                "input/video_downloaded.mp4",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_downloader() {
        let result = YtDlp::new()
            .with_binary("burnsub-no-such-yt-dlp")
            .fetch("https://example.com/v", Path::new("/tmp/never.mp4"))
            .await;
        assert!(matches!(result, Err(BurnsubError::ToolNotFound { .. })));
    }
}
