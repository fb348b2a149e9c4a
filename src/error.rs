use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage that talks to an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquisition,
    Transcription,
    Resync,
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Acquisition => write!(f, "acquisition"),
            Stage::Transcription => write!(f, "transcription"),
            Stage::Resync => write!(f, "resync"),
            Stage::Render => write!(f, "render"),
        }
    }
}

/// How a failure is handled by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad invocation or configuration; reported before any work starts.
    Usage,
    /// An external step failed. The run aborts.
    FatalCollaborator,
    /// The final artifact is missing after rendering.
    FatalVerification,
    /// Absorbed by the translator adapter; the run continues.
    RecoverableTranslation,
}

#[derive(Error, Debug)]
pub enum BurnsubError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Required tool not found: {tool}. Make sure it is installed and in your PATH")]
    ToolNotFound { tool: String },

    #[error("{stage} failed: {message}")]
    Collaborator { stage: Stage, message: String },

    #[error("Expected output was not created: {0}")]
    Verification(PathBuf),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Invalid subtitle track: {0}")]
    InvalidTrack(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BurnsubError {
    /// Shorthand for a failed collaborator call.
    pub fn collaborator(stage: Stage, message: impl Into<String>) -> Self {
        BurnsubError::Collaborator {
            stage,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BurnsubError::Usage(_) | BurnsubError::Config(_) => ErrorKind::Usage,
            BurnsubError::Verification(_) => ErrorKind::FatalVerification,
            BurnsubError::Translation(_) => ErrorKind::RecoverableTranslation,
            BurnsubError::ToolNotFound { .. }
            | BurnsubError::Collaborator { .. }
            | BurnsubError::InvalidTrack(_)
            | BurnsubError::Io(_)
            | BurnsubError::Http(_)
            | BurnsubError::Json(_) => ErrorKind::FatalCollaborator,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::RecoverableTranslation
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Usage => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BurnsubError>;
