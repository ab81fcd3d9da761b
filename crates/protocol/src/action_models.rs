//! Model recommendation and UI action models.
//!
//! This module defines the structured output of the inference stage
//! (`Recommendation`) and the enumerated UI actions the executor can apply.
//! `ActionSpec` is a tagged enum so the Action Executor is forced into
//! exhaustive handling: adding a new kind does not compile until the
//! executor decides what to do with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One proposed UI interaction.
///
/// Serialized with a `type` tag:
/// ```json
/// { "type": "click", "x": 120, "y": 48 }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSpec {
    /// Click at absolute screen coordinates.
    Click { x: u32, y: u32 },
    /// Type a text string into the focused element.
    TypeText { text: String },
    /// Press a single named key (e.g. "Return", "Tab").
    KeyPress { key: String },
    /// Pause for the given number of milliseconds.
    Wait { ms: u64 },
    /// Explicit no-op; recorded but applies nothing.
    None,
}

impl ActionSpec {
    /// Short human-readable description for logs and confirmation prompts.
    pub fn describe(&self) -> String {
        match self {
            ActionSpec::Click { x, y } => format!("click at ({x}, {y})"),
            ActionSpec::TypeText { text } => format!("type {text:?}"),
            ActionSpec::KeyPress { key } => format!("press key {key}"),
            ActionSpec::Wait { ms } => format!("wait {ms}ms"),
            ActionSpec::None => "no-op".to_string(),
        }
    }
}

/// Structured model output for one scene: a narrative plus the ordered
/// actions extracted from it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// The assistant's full response text.
    pub narrative: String,
    /// Actions parsed from the narrative, in order of appearance.
    pub actions: Vec<ActionSpec>,
}

impl Recommendation {
    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// Outcome of attempting one action.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    /// The input-synthesis primitive was invoked and reported success.
    Executed,
    /// The user declined the confirmation prompt; the primitive was never
    /// invoked.
    SkippedUnconfirmed,
    /// The primitive was invoked and failed.
    Failed,
}

/// Record of one executed (or skipped) action.
///
/// The executor returns one `ActionResult` per input `ActionSpec`, in input
/// order; a failing action never truncates the batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub action: ActionSpec,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl ActionResult {
    pub fn executed(action: ActionSpec) -> Self {
        Self {
            action,
            status: ActionStatus::Executed,
            error: None,
            finished_at: Utc::now(),
        }
    }

    pub fn skipped(action: ActionSpec) -> Self {
        Self {
            action,
            status: ActionStatus::SkippedUnconfirmed,
            error: None,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(action: ActionSpec, error: String) -> Self {
        Self {
            action,
            status: ActionStatus::Failed,
            error: Some(error),
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_spec_tagged_serialization() {
        let action = ActionSpec::Click { x: 120, y: 48 };
        let json = serde_json::to_value(&action).expect("serialize action");
        assert_eq!(json["type"], "click");
        assert_eq!(json["x"], 120);
        assert_eq!(json["y"], 48);

        let back: ActionSpec = serde_json::from_value(json).expect("deserialize action");
        assert_eq!(back, action);
    }

    #[test]
    fn test_action_spec_none_round_trip() {
        let json = serde_json::to_value(ActionSpec::None).expect("serialize none");
        assert_eq!(json["type"], "none");
        let back: ActionSpec = serde_json::from_value(json).expect("deserialize none");
        assert_eq!(back, ActionSpec::None);
    }

    #[test]
    fn test_action_status_serialization() {
        let json =
            serde_json::to_value(ActionStatus::SkippedUnconfirmed).expect("serialize status");
        assert_eq!(json, "SKIPPED_UNCONFIRMED");
    }

    #[test]
    fn test_action_result_constructors() {
        let executed = ActionResult::executed(ActionSpec::None);
        assert_eq!(executed.status, ActionStatus::Executed);
        assert!(executed.error.is_none());

        let failed = ActionResult::failed(
            ActionSpec::KeyPress {
                key: "Tab".to_string(),
            },
            "driver unavailable".to_string(),
        );
        assert_eq!(failed.status, ActionStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("driver unavailable"));
    }

    #[test]
    fn test_recommendation_has_actions() {
        let empty = Recommendation {
            narrative: "Nothing to do".to_string(),
            actions: vec![],
        };
        assert!(!empty.has_actions());

        let with_actions = Recommendation {
            narrative: "CLICK at [10, 10]".to_string(),
            actions: vec![ActionSpec::Click { x: 10, y: 10 }],
        };
        assert!(with_actions.has_actions());
    }

    #[test]
    fn test_describe_is_stable() {
        assert_eq!(
            ActionSpec::Click { x: 5, y: 9 }.describe(),
            "click at (5, 9)"
        );
        assert_eq!(ActionSpec::Wait { ms: 250 }.describe(), "wait 250ms");
    }
}
