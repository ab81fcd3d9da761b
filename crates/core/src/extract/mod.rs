//! OCR and UI element extraction adapter.
//!
//! The extraction stage turns one captured image into a
//! `SceneDescription`: recognized text spans (confidence-filtered by the
//! adapter, per the stage contract) plus heuristically derived UI element
//! candidates.

pub mod heuristics;
pub mod mock;
pub mod tesseract;

pub use mock::MockExtractor;
pub use tesseract::TesseractExtractor;

use crate::capture::CapturedImage;
use async_trait::async_trait;
use dp_protocol::SceneDescription;
use thiserror::Error;

/// Errors from the extraction stage.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The OCR binary could not be found.
    #[error("No OCR backend available: {0}")]
    NoBackend(String),

    /// The OCR process ran but failed.
    #[error("OCR command failed: {0}")]
    CommandFailed(String),

    /// OCR output could not be parsed.
    #[error("Failed to parse OCR output: {0}")]
    OutputParse(String),

    /// The captured image could not be decoded.
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Temp file round-trip failed.
    #[error("Extraction I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces a structured scene description from a captured image.
#[async_trait]
pub trait ExtractionAdapter: Send + Sync {
    async fn extract(&self, image: &CapturedImage) -> Result<SceneDescription, ExtractionError>;
}
