use std::io::ErrorKind;
use std::process::Command;

use tracing::debug;

use crate::error::{BurnsubError, Result, Stage};

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

fn spawn_error(tool: String, stage: Stage, e: std::io::Error) -> BurnsubError {
    if e.kind() == ErrorKind::NotFound {
        BurnsubError::ToolNotFound { tool }
    } else {
        BurnsubError::collaborator(stage, format!("Failed to run {tool}: {e}"))
    }
}

/// Check that `tool` is installed by running it with `version_arg`.
pub fn check_tool(tool: &str, version_arg: &str) -> Result<()> {
    let output = Command::new(tool).arg(version_arg).output().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            BurnsubError::ToolNotFound {
                tool: tool.to_string(),
            }
        } else {
            BurnsubError::Io(e)
        }
    })?;

    if !output.status.success() {
        return Err(BurnsubError::ToolNotFound {
            tool: tool.to_string(),
        });
    }

    debug!("{} is available", tool);
    Ok(())
}

/// Tools the default collaborators shell out to, with the flag that makes them
/// print a version and exit. Argos is left out since translation may fail softly.
pub const REQUIRED_TOOLS: [(&str, &str); 4] = [
    ("yt-dlp", "--version"),
    ("whisper", "--help"),
    ("ffsubsync", "--version"),
    ("ffmpeg", "-version"),
];

/// Check every required tool before any stage runs.
pub fn preflight() -> Result<()> {
    for (tool, version_arg) in REQUIRED_TOOLS {
        check_tool(tool, version_arg)?;
    }
    Ok(())
}

/// Run a command to completion with inherited stdio.
pub fn run_tool(stage: Stage, command: &mut Command) -> Result<()> {
    let tool = program_name(command);
    debug!("Running {:?}", command);

    let status = command
        .status()
        .map_err(|e| spawn_error(tool.clone(), stage, e))?;

    if !status.success() {
        return Err(BurnsubError::collaborator(
            stage,
            format!("{tool} exited with {status}"),
        ));
    }

    Ok(())
}

/// Run a command to completion and return its stdout.
pub fn capture_tool(stage: Stage, command: &mut Command) -> Result<String> {
    let tool = program_name(command);
    debug!("Running {:?}", command);

    let output = command
        .output()
        .map_err(|e| spawn_error(tool.clone(), stage, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BurnsubError::collaborator(
            stage,
            format!("{tool} exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
