use crate::error::{BurnsubError, Result, Stage};
use crate::media::tools::run_tool;
use crate::resync::Resynchronizer;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Alignment through the `ffsubsync` command-line tool.
pub struct Ffsubsync {
    binary: String,
}

impl Default for Ffsubsync {
    fn default() -> Self {
        Self::new()
    }
}

impl Ffsubsync {
    pub fn new() -> Self {
        Self {
            binary: "ffsubsync".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn command_args(reference: &Path, input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            reference.as_os_str().to_owned(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-o".into(),
            output.as_os_str().to_owned(),
            "--overwrite".into(),
        ]
    }
}

#[async_trait]
impl Resynchronizer for Ffsubsync {
    async fn resync(&self, reference: &Path, input: &Path, output: &Path) -> Result<()> {
        for path in [reference, input] {
            if !path.exists() {
                return Err(BurnsubError::collaborator(
                    Stage::Resync,
                    format!("Input not found: {}", path.display()),
                ));
            }
        }

        info!("Syncing {} against {}", input.display(), reference.display());

        run_tool(
            Stage::Resync,
            Command::new(&self.binary).args(Self::command_args(reference, input, output)),
        )?;

        if !output.exists() {
            return Err(BurnsubError::collaborator(
                Stage::Resync,
                format!("{} did not write {}", self.binary, output.display()),
            ));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffsubsync"
    }
}
