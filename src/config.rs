use crate::error::{BurnsubError, Result};
use crate::transcribe::whisper::WhisperModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default argospm package index.
pub const DEFAULT_PACKAGE_INDEX: &str =
    "https://raw.githubusercontent.com/argosopentech/argospm-index/main/index.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Staging directory for the downloaded video and intermediate subtitles.
    pub input_dir: PathBuf,
    /// Directory receiving the final video.
    pub output_dir: PathBuf,
    /// Font family used by the subtitle style.
    pub font_name: String,
    pub whisper_model: WhisperModel,
    pub package_index_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            font_name: "NotoSansThai-SemiBold".to_string(),
            whisper_model: WhisperModel::default(),
            package_index_url: DEFAULT_PACKAGE_INDEX.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents).map_err(|e| {
                    BurnsubError::Config(format!("{}: {}", config_path.display(), e))
                })?;
            }
        }

        // Override with environment variables
        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(font) = lookup("FONT_NAME") {
            self.font_name = font;
        }
        if let Some(model) = lookup("WHISPER_MODEL") {
            self.whisper_model = model.parse().map_err(BurnsubError::Config)?;
        }
        if let Some(url) = lookup("BURNSUB_PACKAGE_INDEX") {
            self.package_index_url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(BurnsubError::Config(
                "INPUT_DIR must not be empty".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(BurnsubError::Config(
                "OUTPUT_DIR must not be empty".to_string(),
            ));
        }
        if self.font_name.trim().is_empty() {
            return Err(BurnsubError::Config(
                "FONT_NAME must not be empty".to_string(),
            ));
        }
        if self.package_index_url.trim().is_empty() {
            return Err(BurnsubError::Config(
                "Package index URL must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Well-known locations of every artifact the pipeline produces.
    pub fn artifacts(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.input_dir, &self.output_dir)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("burnsub").join("config.toml"))
    }
}

/// Fixed artifact paths under the staging and output directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub video: PathBuf,
    pub original_track: PathBuf,
    pub translated_track: PathBuf,
    pub synced_track: PathBuf,
    pub styled_track: PathBuf,
    pub output_video: PathBuf,
}

impl ArtifactPaths {
    pub fn new(input_dir: &Path, output_dir: &Path) -> Self {
        Self {
            video: input_dir.join("video_downloaded.mp4"),
            original_track: input_dir.join("video_downloaded.srt"),
            translated_track: input_dir.join("video_downloaded_th.srt"),
            synced_track: input_dir.join("synced_th.srt"),
            styled_track: input_dir.join("video_downloaded_th.ass"),
            output_video: output_dir.join("video_withsub.mp4"),
        }
    }
}
