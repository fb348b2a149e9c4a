pub mod whisper;

pub use whisper::{WhisperCli, WhisperModel};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A span of detected speech, times in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// `start` is non-negative and `end` is not before it. Zero-length spans are
    /// valid; whisper reports them for short words.
    pub fn is_valid(&self) -> bool {
        self.start >= 0.0 && self.end >= self.start
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the speech in `media`, returning segments in chronological order.
    async fn transcribe(&self, media: &Path) -> Result<Vec<Segment>>;
    fn name(&self) -> &'static str;
}
