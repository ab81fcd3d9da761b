//! Application configuration model.

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ocr_confidence_threshold() -> u16 {
    30
}

fn default_ocr_lang() -> String {
    "eng".to_string()
}

fn default_action_delay_ms() -> u64 {
    500
}

fn default_max_actions() -> usize {
    1
}

fn default_history_context() -> usize {
    3
}

fn default_screenshots_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_store_path() -> PathBuf {
    PathBuf::from("cycles.json")
}

fn default_viewer_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8750))
}

/// All runtime settings for deskpilot.
///
/// Deserialized from `deskpilot.toml`; the API key may instead come from
/// the `OPENAI_API_KEY` environment variable, which takes precedence over
/// the file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Credential for the inference API. Required; validated at load.
    #[serde(default)]
    pub api_key: String,

    /// Chat Completions endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier sent with each inference request.
    #[serde(default = "default_model")]
    pub model: String,

    /// OCR spans below this confidence are dropped by the extraction
    /// adapter. Range 0-100.
    #[serde(default = "default_ocr_confidence_threshold")]
    pub ocr_confidence_threshold: u16,

    /// Tesseract language code.
    #[serde(default = "default_ocr_lang")]
    pub ocr_lang: String,

    /// Execute recommended actions without per-action confirmation.
    #[serde(default)]
    pub auto_execute: bool,

    /// Pacing delay between executed actions.
    #[serde(default = "default_action_delay_ms")]
    pub action_delay_ms: u64,

    /// Cap on actions executed per cycle.
    #[serde(default = "default_max_actions")]
    pub max_actions: usize,

    /// Number of recent cycle narratives passed to inference as context.
    #[serde(default = "default_history_context")]
    pub history_context: usize,

    /// Directory screenshots are persisted to.
    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: PathBuf,

    /// Path of the durable cycle store document.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Timer-driven mode period; interactive key-trigger mode when absent.
    #[serde(default)]
    pub interval_secs: Option<u64>,

    /// Bind address for the read-only viewer server.
    #[serde(default = "default_viewer_addr")]
    pub viewer_addr: SocketAddr,
}

impl AppConfig {
    /// The API key, or the startup-fatal error when none is configured.
    ///
    /// Called before the first cycle; the read-only viewer never needs it.
    pub fn require_api_key(&self) -> ConfigResult<&str> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(&self.api_key)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_api_url(),
            model: default_model(),
            ocr_confidence_threshold: default_ocr_confidence_threshold(),
            ocr_lang: default_ocr_lang(),
            auto_execute: false,
            action_delay_ms: default_action_delay_ms(),
            max_actions: default_max_actions(),
            history_context: default_history_context(),
            screenshots_dir: default_screenshots_dir(),
            store_path: default_store_path(),
            interval_secs: None,
            viewer_addr: default_viewer_addr(),
        }
    }
}
