//! Language-model inference adapter.
//!
//! The inference stage sends the scene description to a remote model and
//! returns a `Recommendation`: the assistant's narrative plus the UI
//! actions parsed out of it. A `None` scene produces a degraded prompt so
//! the cycle can still yield a narrative after a failed extraction.

pub mod mock;
pub mod openai;
pub mod parser;

pub use mock::MockInference;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use dp_protocol::{Recommendation, SceneDescription};
use thiserror::Error;

/// Errors from the inference stage.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Transport-level failure after retries were exhausted.
    #[error("Inference request failed: {0}")]
    Http(String),

    /// The API answered with a non-success status after retries.
    #[error("Inference API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The API answered 200 but the expected fields were missing.
    #[error("Inference response missing assistant content")]
    MissingContent,
}

/// Produces a recommendation for one scene.
#[async_trait]
pub trait InferenceAdapter: Send + Sync {
    /// `scene: None` means extraction failed; the adapter sends a degraded
    /// prompt instead of the scene data. `history` carries the narratives
    /// of recent cycles, oldest first.
    async fn infer(
        &self,
        scene: Option<&SceneDescription>,
        history: &[String],
    ) -> Result<Recommendation, InferenceError>;
}
