//! Chat Completions client.
//!
//! Posts the scene to an OpenAI-compatible Chat Completions endpoint and
//! parses the assistant's reply into a `Recommendation`. Rate-limit and
//! server errors are retried with exponential backoff plus jitter.

use crate::infer::parser::parse_recommendation;
use crate::infer::{InferenceAdapter, InferenceError};
use async_trait::async_trait;
use dp_protocol::{Recommendation, SceneDescription};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a desktop automation assistant. Analyze the screen content \
and suggest specific actions the user might want to take. Focus on practical, actionable \
suggestions like clicking buttons, typing text, or navigating menus. Be specific about \
coordinates when suggesting clicks.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Inference over an OpenAI-compatible Chat Completions API.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl OpenAiClient {
    /// Build a client with the default retry limit (5 attempts).
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Http` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(api_url: &str, api_key: &str, model: &str) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InferenceError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_retries: 5,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn build_user_message(scene: Option<&SceneDescription>, history: &[String]) -> String {
        let mut message = String::new();

        if !history.is_empty() {
            message.push_str("Recent cycle summaries, oldest first:\n");
            for (i, narrative) in history.iter().enumerate() {
                message.push_str(&format!("{}. {}\n", i + 1, truncate(narrative, 300)));
            }
            message.push('\n');
        }

        match scene {
            Some(scene) => {
                let scene_json = serde_json::to_string_pretty(scene)
                    .unwrap_or_else(|_| scene.summary.clone());
                message.push_str(&format!(
                    "Screen analysis data:\n{scene_json}\n\nPlease analyze this screen and \
                     suggest specific actions the user could take."
                ));
            }
            // Degraded prompt: extraction failed, there is no scene data.
            None => {
                message.push_str(
                    "No screen extraction is available for this cycle (the OCR stage failed). \
                     Based on the recent summaries, suggest a cautious next step, or say that \
                     no action should be taken.",
                );
            }
        }

        message
    }

    async fn request_once(&self, user_message: &str) -> Result<String, RequestFailure> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_message },
            ],
            "temperature": 0.0,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RequestFailure::Retryable(InferenceError::Http(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let error = InferenceError::Api {
                status: status.as_u16(),
                message: truncate(&message, 400).to_string(),
            };
            return if matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504) {
                Err(RequestFailure::Retryable(error))
            } else {
                Err(RequestFailure::Permanent(error))
            };
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| RequestFailure::Permanent(InferenceError::Http(e.to_string())))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(RequestFailure::Permanent(InferenceError::MissingContent))
    }
}

enum RequestFailure {
    Retryable(InferenceError),
    Permanent(InferenceError),
}

#[async_trait]
impl InferenceAdapter for OpenAiClient {
    async fn infer(
        &self,
        scene: Option<&SceneDescription>,
        history: &[String],
    ) -> Result<Recommendation, InferenceError> {
        let user_message = Self::build_user_message(scene, history);
        debug!(model = %self.model, degraded = scene.is_none(), "sending inference request");

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.request_once(&user_message).await {
                Ok(content) => return Ok(parse_recommendation(&content)),
                Err(RequestFailure::Permanent(error)) => return Err(error),
                Err(RequestFailure::Retryable(error)) => {
                    if attempt > self.max_retries {
                        return Err(error);
                    }
                    let jitter: f64 = rand::thread_rng().gen_range(0.0..0.5);
                    let delay = Duration::from_secs_f64(2f64.powi(attempt as i32 - 1) + jitter);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "inference request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::mock::sample_scene;

    #[test]
    fn test_user_message_includes_scene_json() {
        let scene = sample_scene();
        let message = OpenAiClient::build_user_message(Some(&scene), &[]);
        assert!(message.contains("Screen analysis data:"));
        assert!(message.contains("Submit"));
    }

    #[test]
    fn test_degraded_message_without_scene() {
        let message = OpenAiClient::build_user_message(None, &[]);
        assert!(message.contains("No screen extraction is available"));
    }

    #[test]
    fn test_history_is_prepended_in_order() {
        let history = vec!["first summary".to_string(), "second summary".to_string()];
        let message = OpenAiClient::build_user_message(None, &history);
        let first = message.find("first summary").expect("first present");
        let second = message.find("second summary").expect("second present");
        assert!(first < second);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 100), "short");
    }

    #[test]
    fn test_chat_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"CLICK at [5, 6]"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).expect("parse response");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("CLICK at [5, 6]")
        );
    }
}
