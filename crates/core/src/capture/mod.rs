//! Screen capture adapter.
//!
//! The capture stage produces one screenshot on demand. The boundary is the
//! [`CaptureAdapter`] trait; [`ScreenCapture`] shells out to the platform
//! screenshot tool, and [`MockCapture`] serves tests and dry runs.

pub mod mock;
pub mod screen;

pub use mock::MockCapture;
pub use screen::ScreenCapture;

use async_trait::async_trait;
use thiserror::Error;

/// One captured screen image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Encoded image bytes (PNG).
    pub bytes: Vec<u8>,
}

/// Errors from the capture stage.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// No screenshot tool could be found on this host.
    #[error("No screenshot backend available: {0}")]
    NoBackend(String),

    /// The screenshot tool ran but did not produce an image.
    #[error("Screenshot command failed: {0}")]
    CommandFailed(String),

    /// Reading the captured image back failed.
    #[error("Failed to read captured image: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces one screen image on demand.
#[async_trait]
pub trait CaptureAdapter: Send + Sync {
    async fn capture(&self) -> Result<CapturedImage, CaptureError>;
}
