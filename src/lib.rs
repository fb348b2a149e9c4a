pub mod config;
pub mod error;
pub mod fonts;
pub mod media;
pub mod pipeline;
pub mod resync;
pub mod subtitle;
pub mod transcribe;
pub mod translate;

pub use config::{ArtifactPaths, Config};
pub use error::{BurnsubError, ErrorKind, Result, Stage};
pub use pipeline::{
    print_summary, run_pipeline, Collaborators, PipelineConfig, PipelineResult, PipelineStats,
};
