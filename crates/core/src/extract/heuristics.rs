//! UI element heuristics over OCR spans.
//!
//! Without a full computer-vision pass, element candidates are derived from
//! the geometry and style of recognized text: heading-like spans become
//! labeled text blocks, short high-confidence spans with button-like boxes
//! become button candidates.

use dp_protocol::{SceneDescription, TextSpan, UiElement, UiElementKind};

/// Confidence at which a span counts as a heading even without stylistic
/// hints.
const TITLE_CONFIDENCE: f32 = 75.0;

/// Decide whether a span reads like a title or heading.
///
/// Requires at least 3 alphabetic characters, a reasonable length (at most
/// 10 words / 80 chars), and either high confidence or upper/title casing.
pub fn looks_like_title(span: &TextSpan) -> bool {
    let text = span.text.trim();
    if text.len() < 3 {
        return false;
    }

    let alpha_chars = text.chars().filter(|c| c.is_alphabetic()).count();
    if alpha_chars < 3 {
        return false;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let reasonable_length = (1..=10).contains(&words.len()) && text.len() <= 80;

    let upper = text.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase());
    let title_case = words
        .iter()
        .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase() || !c.is_alphabetic()));
    let stylistic_hint = upper || title_case;

    (span.confidence >= TITLE_CONFIDENCE || stylistic_hint) && reasonable_length
}

/// Decide whether a span's box has button-like proportions: short text in a
/// small, wider-than-tall box.
pub fn looks_like_button(span: &TextSpan) -> bool {
    let b = span.bounds;
    if b.height == 0 {
        return false;
    }
    let aspect = b.width as f32 / b.height as f32;
    span.text.len() <= 20
        && span.confidence >= TITLE_CONFIDENCE
        && b.height <= 50
        && (1.0..=8.0).contains(&aspect)
}

/// Derive UI element candidates from the recognized spans.
pub fn derive_elements(spans: &[TextSpan]) -> Vec<UiElement> {
    let mut elements = Vec::new();

    for span in spans {
        if looks_like_button(span) {
            elements.push(UiElement {
                kind: UiElementKind::Button,
                bounds: span.bounds,
                label: Some(span.text.clone()),
            });
        } else if looks_like_title(span) {
            elements.push(UiElement {
                kind: UiElementKind::TextBlock,
                bounds: span.bounds,
                label: Some(span.text.clone()),
            });
        }
    }

    elements
}

/// One-line human-readable description of the scene.
pub fn summarize(width: u32, height: u32, spans: &[TextSpan], elements: &[UiElement]) -> String {
    let buttons = elements
        .iter()
        .filter(|e| e.kind == UiElementKind::Button)
        .count();
    format!(
        "Screen resolution: {width}x{height}. Detected {} text spans, {buttons} button candidates, {} elements total.",
        spans.len(),
        elements.len()
    )
}

/// Assemble the final scene from parsed spans.
pub fn build_scene(width: u32, height: u32, spans: Vec<TextSpan>) -> SceneDescription {
    let elements = derive_elements(&spans);
    let summary = summarize(width, height, &spans, &elements);
    SceneDescription {
        width,
        height,
        text_spans: spans,
        elements,
        summary,
    }
}
