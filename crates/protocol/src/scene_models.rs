//! Scene extraction models.
//!
//! This module defines the structured output of the extraction stage:
//! OCR text spans with confidence scores and heuristically detected UI
//! element candidates, together forming a `SceneDescription` for one
//! screenshot.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Center point of the box, used to derive click targets.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// One piece of text recognized by OCR.
///
/// `confidence` is the recognizer's score in `[0, 100]`. Spans below the
/// configured confidence threshold are dropped by the extraction adapter
/// before the scene is returned, so consumers never see them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub confidence: f32,
    pub bounds: BoundingBox,
}

/// Kinds of UI element candidates the extraction heuristics can produce.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UiElementKind {
    Button,
    Window,
    Icon,
    TextBlock,
}

/// A detected UI element candidate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UiElement {
    pub kind: UiElementKind,
    pub bounds: BoundingBox,
    /// Visible label, when one could be associated with the element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Structured extraction result for one screenshot.
///
/// Immutable once produced: the orchestrator owns it for the duration of
/// one cycle and then embeds it into the `Cycle` record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SceneDescription {
    /// Screenshot width in pixels.
    pub width: u32,
    /// Screenshot height in pixels.
    pub height: u32,
    /// Recognized text, in reading order as reported by the OCR backend.
    pub text_spans: Vec<TextSpan>,
    /// UI element candidates, in detection order.
    pub elements: Vec<UiElement>,
    /// Human-readable one-line description of the scene.
    pub summary: String,
}

impl SceneDescription {
    pub fn text_count(&self) -> usize {
        self.text_spans.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Mean OCR confidence across all spans, or None for an empty scene.
    pub fn average_confidence(&self) -> Option<f32> {
        if self.text_spans.is_empty() {
            return None;
        }
        let sum: f32 = self.text_spans.iter().map(|s| s.confidence).sum();
        Some(sum / self.text_spans.len() as f32)
    }

    /// Concatenated span text, used for substring search over cycles.
    pub fn full_text(&self) -> String {
        self.text_spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, confidence: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            confidence,
            bounds: BoundingBox {
                x: 10,
                y: 20,
                width: 100,
                height: 16,
            },
        }
    }

    #[test]
    fn test_bounding_box_center() {
        let bounds = BoundingBox {
            x: 10,
            y: 20,
            width: 100,
            height: 40,
        };
        assert_eq!(bounds.center(), (60, 40));
    }

    #[test]
    fn test_average_confidence() {
        let scene = SceneDescription {
            width: 1920,
            height: 1080,
            text_spans: vec![span("File", 80.0), span("Edit", 90.0)],
            elements: vec![],
            summary: String::new(),
        };
        assert_eq!(scene.average_confidence(), Some(85.0));
        assert_eq!(scene.text_count(), 2);
    }

    #[test]
    fn test_average_confidence_empty_scene() {
        let scene = SceneDescription {
            width: 1920,
            height: 1080,
            text_spans: vec![],
            elements: vec![],
            summary: String::new(),
        };
        assert_eq!(scene.average_confidence(), None);
    }

    #[test]
    fn test_full_text_joins_spans() {
        let scene = SceneDescription {
            width: 800,
            height: 600,
            text_spans: vec![span("Save", 91.0), span("Cancel", 88.0)],
            elements: vec![],
            summary: String::new(),
        };
        assert_eq!(scene.full_text(), "Save Cancel");
    }

    #[test]
    fn test_ui_element_kind_serialization() {
        let json = serde_json::to_value(UiElementKind::TextBlock).expect("serialize kind");
        assert_eq!(json, "text_block");
    }
}
