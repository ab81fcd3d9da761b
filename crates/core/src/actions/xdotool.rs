//! X11 input synthesis via `xdotool`.

use crate::actions::{ActionError, InputDriver};
use async_trait::async_trait;
use dp_protocol::ActionSpec;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Input driver backed by the `xdotool` binary.
pub struct XdotoolDriver {
    binary: PathBuf,
}

impl XdotoolDriver {
    /// Locate xdotool on PATH.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NoBackend` if the binary is missing.
    pub fn discover() -> Result<Self, ActionError> {
        let binary = which::which("xdotool")
            .map_err(|e| ActionError::NoBackend(format!("xdotool: {e}")))?;
        Ok(Self { binary })
    }

    async fn run(&self, args: &[String]) -> Result<(), ActionError> {
        debug!(?args, "invoking input tool");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| ActionError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(ActionError::CommandFailed(format!(
                "xdotool exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InputDriver for XdotoolDriver {
    async fn apply(&self, action: &ActionSpec) -> Result<(), ActionError> {
        let args: Vec<String> = match action {
            ActionSpec::Click { x, y } => vec![
                "mousemove".to_string(),
                x.to_string(),
                y.to_string(),
                "click".to_string(),
                "1".to_string(),
            ],
            ActionSpec::TypeText { text } => vec![
                "type".to_string(),
                "--delay".to_string(),
                "50".to_string(),
                text.clone(),
            ],
            ActionSpec::KeyPress { key } => vec!["key".to_string(), key.clone()],
            // Handled by the executor; a direct call is a no-op.
            ActionSpec::Wait { .. } | ActionSpec::None => return Ok(()),
        };

        self.run(&args).await
    }
}
