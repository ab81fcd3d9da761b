//! Platform screenshot capture via the OS screenshot tool.

use crate::capture::{CaptureAdapter, CaptureError, CapturedImage};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// Screenshot tools probed in order, with the arguments that make them
/// write a full-screen PNG to a given path without user interaction.
const BACKENDS: &[(&str, &[&str])] = &[
    ("screencapture", &["-x"]),
    ("gnome-screenshot", &["-f"]),
    ("grim", &[]),
    ("import", &["-window", "root"]),
];

/// Captures the full screen by spawning the platform screenshot tool.
///
/// The backend is discovered once at construction via `which`; capture
/// writes to a temporary file and reads the bytes back, so the adapter's
/// output is a plain in-memory image and the temp file never outlives the
/// call.
pub struct ScreenCapture {
    command: PathBuf,
    args: Vec<String>,
}

impl ScreenCapture {
    /// Locate a screenshot backend on this host.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::NoBackend` when none of the known tools is on
    /// PATH.
    pub fn discover() -> Result<Self, CaptureError> {
        for (name, args) in BACKENDS {
            if let Ok(command) = which::which(name) {
                info!(backend = %name, "screenshot backend selected");
                return Ok(Self {
                    command,
                    args: args.iter().map(|a| (*a).to_string()).collect(),
                });
            }
        }

        Err(CaptureError::NoBackend(format!(
            "none of {:?} found on PATH",
            BACKENDS.iter().map(|(n, _)| *n).collect::<Vec<_>>()
        )))
    }
}

#[async_trait]
impl CaptureAdapter for ScreenCapture {
    async fn capture(&self) -> Result<CapturedImage, CaptureError> {
        let tmp = tempfile::Builder::new()
            .prefix("deskpilot-capture-")
            .suffix(".png")
            .tempfile()?;
        let tmp_path = tmp.path().to_path_buf();

        debug!(command = %self.command.display(), "capturing screen");

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(&tmp_path)
            .output()
            .await
            .map_err(|e| CaptureError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(CaptureError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.command.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let bytes = tokio::fs::read(&tmp_path).await?;
        if bytes.is_empty() {
            return Err(CaptureError::CommandFailed(format!(
                "{} produced an empty image",
                self.command.display()
            )));
        }

        Ok(CapturedImage { bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_reports_all_backends_when_missing() {
        // Only meaningful on hosts without any screenshot tool; on hosts
        // that have one, discovery must succeed instead.
        match ScreenCapture::discover() {
            Ok(_) => {}
            Err(CaptureError::NoBackend(msg)) => {
                assert!(msg.contains("screencapture"));
                assert!(msg.contains("grim"));
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
