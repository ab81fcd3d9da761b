use chrono::{Duration, TimeZone, Utc};
use dp_protocol::*;
use std::path::PathBuf;

#[test]
fn test_cycle_deserialization_from_stored_document_shape() {
    // Sample record in the shape the store persists
    let json_str = r#"
{
  "id": 3,
  "started_at": "2025-06-01T12:00:00Z",
  "completed_at": "2025-06-01T12:00:02Z",
  "screenshot_path": "screenshots/screenshot_20250601_120000_3.png",
  "scene": {
    "width": 1920,
    "height": 1080,
    "text_spans": [
      {
        "text": "Submit",
        "confidence": 93.0,
        "bounds": { "x": 100, "y": 200, "width": 64, "height": 20 }
      }
    ],
    "elements": [
      {
        "kind": "button",
        "bounds": { "x": 96, "y": 196, "width": 72, "height": 28 },
        "label": "Submit"
      }
    ],
    "summary": "Screen resolution: 1920x1080. Detected elements: 1 text spans, 1 candidates."
  },
  "recommendation": {
    "narrative": "1. CLICK button at coordinates [132, 210]",
    "actions": [ { "type": "click", "x": 132, "y": 210 } ]
  },
  "action_results": [
    {
      "action": { "type": "click", "x": 132, "y": 210 },
      "status": "EXECUTED",
      "finished_at": "2025-06-01T12:00:02Z"
    }
  ],
  "status": "SUCCESS"
}
"#;

    let cycle: Cycle = serde_json::from_str(json_str).expect("Failed to deserialize Cycle");

    assert_eq!(cycle.id, 3);
    assert_eq!(cycle.status, CycleStatus::Success);
    assert_eq!(
        cycle.screenshot_path,
        Some(PathBuf::from("screenshots/screenshot_20250601_120000_3.png"))
    );

    let scene = cycle.scene.as_ref().expect("scene present");
    assert_eq!(scene.text_spans.len(), 1);
    assert_eq!(scene.elements[0].kind, UiElementKind::Button);
    assert_eq!(scene.elements[0].label.as_deref(), Some("Submit"));

    let recommendation = cycle.recommendation.as_ref().expect("recommendation present");
    assert_eq!(
        recommendation.actions[0],
        ActionSpec::Click { x: 132, y: 210 }
    );

    assert_eq!(cycle.action_results.len(), 1);
    assert_eq!(cycle.action_results[0].status, ActionStatus::Executed);
    assert!(cycle.error.is_none());
    assert_eq!(cycle.processing_time(), Duration::seconds(2));
}

#[test]
fn test_failed_cycle_omits_optional_fields() {
    let started = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid timestamp");
    let cycle = Cycle {
        id: 1,
        started_at: started,
        completed_at: started,
        screenshot_path: None,
        scene: None,
        recommendation: None,
        action_results: vec![],
        status: CycleStatus::Failed,
        error: Some("no screenshot backend available".to_string()),
    };

    let json = serde_json::to_value(&cycle).expect("Failed to serialize Cycle");
    assert!(json.get("scene").is_none());
    assert!(json.get("recommendation").is_none());
    assert!(json.get("screenshot_path").is_none());
    assert_eq!(json["status"], "FAILED");
    assert_eq!(json["error"], "no screenshot backend available");
}

#[test]
fn test_action_spec_variants_round_trip() {
    let actions = vec![
        ActionSpec::Click { x: 1, y: 2 },
        ActionSpec::TypeText {
            text: "hello".to_string(),
        },
        ActionSpec::KeyPress {
            key: "Return".to_string(),
        },
        ActionSpec::Wait { ms: 500 },
        ActionSpec::None,
    ];

    let json = serde_json::to_string(&actions).expect("Failed to serialize actions");
    let back: Vec<ActionSpec> = serde_json::from_str(&json).expect("Failed to deserialize actions");
    assert_eq!(back, actions);
}

#[test]
fn test_filter_deserializes_from_query_shape() {
    // The viewer maps its query string onto this exact shape
    let filter: CycleFilter = serde_json::from_value(serde_json::json!({
        "status": "PARTIAL",
        "query": "timeout"
    }))
    .expect("Failed to deserialize filter");

    assert_eq!(filter.status, Some(CycleStatus::Partial));
    assert_eq!(filter.query.as_deref(), Some("timeout"));
    assert!(filter.since.is_none());
}
