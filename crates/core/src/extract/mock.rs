//! Mock extraction adapter for testing.

use crate::capture::CapturedImage;
use crate::extract::{ExtractionAdapter, ExtractionError};
use async_trait::async_trait;
use dp_protocol::{BoundingBox, SceneDescription, TextSpan, UiElement, UiElementKind};

/// Canned extraction adapter: returns a fixed scene or a fixed failure.
#[derive(Clone)]
pub struct MockExtractor {
    result: Result<SceneDescription, String>,
}

impl MockExtractor {
    pub fn with_scene(scene: SceneDescription) -> Self {
        Self { result: Ok(scene) }
    }

    /// A small but realistic scene: two spans and one button candidate.
    pub fn sample() -> Self {
        Self::with_scene(sample_scene())
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

/// Fixed scene used across tests.
pub fn sample_scene() -> SceneDescription {
    let spans = vec![
        TextSpan {
            text: "Submit".to_string(),
            confidence: 93.0,
            bounds: BoundingBox {
                x: 100,
                y: 200,
                width: 64,
                height: 20,
            },
        },
        TextSpan {
            text: "Report Overview".to_string(),
            confidence: 88.0,
            bounds: BoundingBox {
                x: 40,
                y: 30,
                width: 280,
                height: 32,
            },
        },
    ];
    let elements = vec![UiElement {
        kind: UiElementKind::Button,
        bounds: spans[0].bounds,
        label: Some("Submit".to_string()),
    }];
    SceneDescription {
        width: 1920,
        height: 1080,
        text_spans: spans,
        elements,
        summary: "Screen resolution: 1920x1080. Detected 2 text spans, 1 button candidates, 1 elements total.".to_string(),
    }
}

#[async_trait]
impl ExtractionAdapter for MockExtractor {
    async fn extract(&self, _image: &CapturedImage) -> Result<SceneDescription, ExtractionError> {
        match &self.result {
            Ok(scene) => Ok(scene.clone()),
            Err(message) => Err(ExtractionError::CommandFailed(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::mock::TINY_PNG;

    #[tokio::test]
    async fn test_mock_extractor_sample() {
        let extractor = MockExtractor::sample();
        let image = CapturedImage {
            bytes: TINY_PNG.to_vec(),
        };
        let scene = extractor.extract(&image).await.expect("extract succeeds");
        assert_eq!(scene.text_count(), 2);
        assert_eq!(scene.elements[0].kind, UiElementKind::Button);
    }

    #[tokio::test]
    async fn test_mock_extractor_failure() {
        let extractor = MockExtractor::failing("ocr crashed");
        let image = CapturedImage { bytes: vec![] };
        let result = extractor.extract(&image).await;
        assert!(matches!(result, Err(ExtractionError::CommandFailed(_))));
    }
}
