//! Mock inference adapter for testing.

use crate::infer::parser::parse_recommendation;
use crate::infer::{InferenceAdapter, InferenceError};
use async_trait::async_trait;
use dp_protocol::{Recommendation, SceneDescription};
use std::sync::Mutex;

/// Canned inference adapter: returns a fixed recommendation or failure,
/// and records the inputs it was called with.
pub struct MockInference {
    result: Result<Recommendation, String>,
    calls: Mutex<Vec<MockInferenceCall>>,
}

/// Inputs observed by one `infer` call.
#[derive(Debug, Clone)]
pub struct MockInferenceCall {
    pub had_scene: bool,
    pub history_len: usize,
}

impl MockInference {
    pub fn with_recommendation(recommendation: Recommendation) -> Self {
        Self {
            result: Ok(recommendation),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Recommendation whose narrative parses into one click action.
    pub fn sample() -> Self {
        Self::with_recommendation(parse_recommendation(
            "1. CLICK button at coordinates [132, 210]\nThe Submit button is the likely target.",
        ))
    }

    /// Recommendation with no parseable actions.
    pub fn narrative_only() -> Self {
        Self::with_recommendation(parse_recommendation(
            "The screen shows a report overview. No action is recommended.",
        ))
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<MockInferenceCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl InferenceAdapter for MockInference {
    async fn infer(
        &self,
        scene: Option<&SceneDescription>,
        history: &[String],
    ) -> Result<Recommendation, InferenceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockInferenceCall {
                had_scene: scene.is_some(),
                history_len: history.len(),
            });
        }

        match &self.result {
            Ok(recommendation) => Ok(recommendation.clone()),
            Err(message) => Err(InferenceError::Http(message.clone())),
        }
    }
}
