//! Durable cycle record models.
//!
//! A `Cycle` is the unit of record for one complete analysis iteration:
//! capture → extraction → inference → action → persistence. It is created
//! once at cycle start, populated stage by stage by the orchestrator, and
//! becomes immutable the instant it is appended to the store.

use crate::action_models::{ActionResult, ActionStatus, Recommendation};
use crate::scene_models::SceneDescription;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Final outcome of one analysis cycle.
///
/// - `Success`: every attempted stage succeeded and no executed action failed
/// - `Partial`: capture succeeded but a later stage degraded the cycle
/// - `Failed`: capture itself failed; no later stage was attempted
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    Success,
    Partial,
    Failed,
}

/// One recorded analysis cycle.
///
/// Stored cycles are never mutated; corrections happen by appending new
/// cycles.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Cycle {
    /// Monotonically increasing identifier, assigned at cycle start.
    pub id: u64,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,

    /// Path of the externally persisted screenshot. The cycle references the
    /// image; it never owns the bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<PathBuf>,

    /// Extraction result, or None if extraction failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<SceneDescription>,

    /// Inference result, or None if inference failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,

    /// One result per attempted action, in execution order. Empty when no
    /// actions were proposed.
    #[serde(default)]
    pub action_results: Vec<ActionResult>,

    pub status: CycleStatus,

    /// Message describing what went wrong, for failed and partial cycles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Cycle {
    /// Wall-clock duration of the cycle.
    pub fn processing_time(&self) -> Duration {
        self.completed_at - self.started_at
    }

    /// True if any action in the batch failed.
    pub fn has_failed_action(&self) -> bool {
        self.action_results
            .iter()
            .any(|r| r.status == ActionStatus::Failed)
    }

    /// Searchable text of this cycle: narrative, error message, and
    /// extracted span text.
    pub fn search_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(recommendation) = &self.recommendation {
            parts.push(recommendation.narrative.clone());
        }
        if let Some(error) = &self.error {
            parts.push(error.clone());
        }
        if let Some(scene) = &self.scene {
            parts.push(scene.full_text());
        }
        parts.join(" ")
    }
}
