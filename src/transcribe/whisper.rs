use crate::error::{BurnsubError, Result, Stage};
use crate::media::tools::run_tool;
use crate::transcribe::{Segment, Transcriber};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Model sizes accepted by the whisper CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WhisperModel {
    #[serde(rename = "tiny")]
    Tiny,
    #[serde(rename = "tiny.en")]
    TinyEn,
    #[default]
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "base.en")]
    BaseEn,
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "small.en")]
    SmallEn,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "medium.en")]
    MediumEn,
    #[serde(rename = "large")]
    Large,
    #[serde(rename = "large-v1")]
    LargeV1,
    #[serde(rename = "large-v2")]
    LargeV2,
    #[serde(rename = "large-v3")]
    LargeV3,
    #[serde(rename = "turbo")]
    Turbo,
}

const ALL_MODELS: [WhisperModel; 13] = [
    WhisperModel::Tiny,
    WhisperModel::TinyEn,
    WhisperModel::Base,
    WhisperModel::BaseEn,
    WhisperModel::Small,
    WhisperModel::SmallEn,
    WhisperModel::Medium,
    WhisperModel::MediumEn,
    WhisperModel::Large,
    WhisperModel::LargeV1,
    WhisperModel::LargeV2,
    WhisperModel::LargeV3,
    WhisperModel::Turbo,
];

impl WhisperModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::TinyEn => "tiny.en",
            WhisperModel::Base => "base",
            WhisperModel::BaseEn => "base.en",
            WhisperModel::Small => "small",
            WhisperModel::SmallEn => "small.en",
            WhisperModel::Medium => "medium",
            WhisperModel::MediumEn => "medium.en",
            WhisperModel::Large => "large",
            WhisperModel::LargeV1 => "large-v1",
            WhisperModel::LargeV2 => "large-v2",
            WhisperModel::LargeV3 => "large-v3",
            WhisperModel::Turbo => "turbo",
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_MODELS
            .iter()
            .copied()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = ALL_MODELS.iter().map(|m| m.as_str()).collect();
                format!("Unknown whisper model: {}. Use one of: {}", s, names.join(", "))
            })
    }
}

/// Local transcription through the `whisper` command-line tool.
pub struct WhisperCli {
    binary: String,
    model: WhisperModel,
    language: Option<String>,
}

impl WhisperCli {
    pub fn new(model: WhisperModel) -> Self {
        Self {
            binary: "whisper".to_string(),
            model,
            language: None,
        }
    }

    /// Use a different executable (e.g. a virtualenv path).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Skip language detection.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn command_args(&self, media: &Path, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            media.as_os_str().to_owned(),
            "--model".into(),
            self.model.as_str().into(),
            "--fp16".into(),
            "False".into(),
            "--output_format".into(),
            "json".into(),
            "--output_dir".into(),
            output_dir.as_os_str().to_owned(),
            "--verbose".into(),
            "False".into(),
        ];
        if let Some(ref language) = self.language {
            args.push("--language".into());
            args.push(language.into());
        }
        args
    }
}

#[async_trait]
impl Transcriber for WhisperCli {
    async fn transcribe(&self, media: &Path) -> Result<Vec<Segment>> {
        if !media.exists() {
            return Err(BurnsubError::collaborator(
                Stage::Transcription,
                format!("Media file not found: {}", media.display()),
            ));
        }

        let output_dir = TempDir::new()?;
        info!(
            "Transcribing {} with whisper model {}",
            media.display(),
            self.model
        );

        run_tool(
            Stage::Transcription,
            Command::new(&self.binary).args(self.command_args(media, output_dir.path())),
        )?;

        let stem = media
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let json_path = output_dir.path().join(format!("{stem}.json"));

        let body = std::fs::read_to_string(&json_path).map_err(|e| {
            BurnsubError::collaborator(
                Stage::Transcription,
                format!("Missing whisper output {}: {e}", json_path.display()),
            )
        })?;

        let segments = parse_output(&body)?;
        debug!("Whisper returned {} segments", segments.len());
        Ok(segments)
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}

/// Convert whisper's JSON output into segments, dropping invalid spans.
pub fn parse_output(body: &str) -> Result<Vec<Segment>> {
    let output: WhisperOutput = serde_json::from_str(body).map_err(|e| {
        BurnsubError::collaborator(
            Stage::Transcription,
            format!("Failed to parse whisper output: {e}"),
        )
    })?;

    if let Some(ref language) = output.language {
        debug!("Whisper detected language: {}", language);
    }

    let segments = output
        .segments
        .into_iter()
        .map(|seg| Segment::new(seg.start, seg.end, seg.text))
        .filter(|seg| {
            if seg.is_valid() {
                true
            } else {
                warn!(
                    "Dropping invalid segment {:.3}-{:.3}: {:?}",
                    seg.start, seg.end, seg.text
                );
                false
            }
        })
        .collect();

    Ok(segments)
}

// Whisper JSON output

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_parsing() {
        assert_eq!("base".parse::<WhisperModel>().unwrap(), WhisperModel::Base);
        assert_eq!("Large-V3".parse::<WhisperModel>().unwrap(), WhisperModel::LargeV3);
        assert_eq!("tiny.en".parse::<WhisperModel>().unwrap(), WhisperModel::TinyEn);
        assert!("huge".parse::<WhisperModel>().is_err());
    }

    #[test]
    fn test_model_str_round_trip() {
        for model in ALL_MODELS {
            assert_eq!(model.as_str().parse::<WhisperModel>().unwrap(), model);
        }
    }

    #[test]
    fn test_command_args() {
        let cli = WhisperCli::new(WhisperModel::Small).with_language("en");
        let args = cli.command_args(Path::new("input/video.mp4"), Path::new("/tmp/out"));
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args[0], "input/video.mp4");
        assert!(args.windows(2).any(|w| w == ["--model", "small"]));
        assert!(args.windows(2).any(|w| w == ["--fp16", "False"]));
        assert!(args.windows(2).any(|w| w == ["--output_format", "json"]));
        assert!(args.windows(2).any(|w| w == ["--output_dir", "/tmp/out"]));
        assert!(args.windows(2).any(|w| w == ["--language", "en"]));
    }

    #[test]
    fn test_parse_output() {
        let body = r#"{
            "text": " Hello World",
            "segments": [
                {"id": 0, "seek": 0, "start": 0.0, "end": 1.5, "text": " Hello", "tokens": [1, 2]},
                {"id": 1, "seek": 0, "start": 1.5, "end": 3.0, "text": " World", "tokens": [3]}
            ],
            "language": "en"
        }"#;

        let segments = parse_output(body).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], Segment::new(0.0, 1.5, " Hello"));
        assert_eq!(segments[1].start, 1.5);
    }

    #[test]
    fn test_parse_output_drops_invalid() {
        let body = r#"{"segments": [
            {"start": -1.0, "end": 0.5, "text": "negative"},
            {"start": 4.0, "end": 3.0, "text": "reversed"},
            {"start": 2.0, "end": 3.0, "text": "ok"}
        ]}"#;

        let segments = parse_output(body).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "ok");
    }

    #[test]
    fn test_parse_output_keeps_zero_length() {
        let body = r#"{"segments": [
            {"start": 1.0, "end": 2.0, "text": " a"},
            {"start": 2.0, "end": 2.0, "text": " spoken word"},
            {"start": 2.0, "end": 3.0, "text": " c"}
        ]}"#;

        let segments = parse_output(body).unwrap();
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec![" a", " spoken word", " c"]);
        assert_eq!(segments[1].start, segments[1].end);
    }

    #[test]
    fn test_parse_output_invalid_json() {
        let result = parse_output("not json");
        assert!(matches!(
            result,
            Err(BurnsubError::Collaborator {
                stage: Stage::Transcription,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_transcribe_missing_file() {
        let cli = WhisperCli::new(WhisperModel::Tiny);
        let result = cli.transcribe(Path::new("/nonexistent/video.mp4")).await;
        assert!(matches!(
            result,
            Err(BurnsubError::Collaborator {
                stage: Stage::Transcription,
                ..
            })
        ));
    }
}
