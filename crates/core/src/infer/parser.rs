//! Action extraction from assistant text.
//!
//! The model answers in prose; actions are recovered with the same
//! patterns the surrounding prompts ask for:
//!
//! - `CLICK button at coordinates [123, 456]` / `CLICK at [123,456]`
//! - `CLICK at 123, 456` (bare coordinate form)
//! - `TYPE "some text"`
//! - `PRESS Return`
//! - `WAIT 500`
//!
//! Repeated click coordinates are deduplicated; text without any pattern
//! yields an empty action list, never an error.

use dp_protocol::{ActionSpec, Recommendation};
use regex::Regex;
use std::sync::OnceLock;

fn click_bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)CLICK[^\[\n]*\[\s*(\d{1,5})\s*,\s*(\d{1,5})\s*\]")
            .unwrap_or_else(|e| panic!("invalid click pattern: {e}"))
    })
}

fn click_bare_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)CLICK[^0-9\n\[]*(\d{1,4})\s*,\s*(\d{1,4})")
            .unwrap_or_else(|e| panic!("invalid click pattern: {e}"))
    })
}

fn type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bTYPE\s+"([^"\n]{1,120})""#)
            .unwrap_or_else(|e| panic!("invalid type pattern: {e}"))
    })
}

fn press_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bPRESS\s+([A-Za-z][A-Za-z0-9_+]{0,30})")
            .unwrap_or_else(|e| panic!("invalid press pattern: {e}"))
    })
}

fn wait_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bWAIT\s+(\d{1,6})")
            .unwrap_or_else(|e| panic!("invalid wait pattern: {e}"))
    })
}

/// Parse assistant text into an ordered action list.
pub fn parse_actions(text: &str) -> Vec<ActionSpec> {
    if text.is_empty() {
        return Vec::new();
    }

    let normalized = text.replace('\r', "\n");
    let mut actions: Vec<(usize, ActionSpec)> = Vec::new();
    let mut seen_clicks: Vec<(u32, u32)> = Vec::new();

    for m in click_bracket_re().captures_iter(&normalized) {
        if let Some((x, y)) = coords_from_captures(&m) {
            seen_clicks.push((x, y));
            let start = m.get(0).map_or(0, |g| g.start());
            actions.push((start, ActionSpec::Click { x, y }));
        }
    }

    // Bare form only adds coordinates the bracket form did not capture.
    for m in click_bare_re().captures_iter(&normalized) {
        if let Some((x, y)) = coords_from_captures(&m) {
            if !seen_clicks.contains(&(x, y)) {
                seen_clicks.push((x, y));
                let start = m.get(0).map_or(0, |g| g.start());
                actions.push((start, ActionSpec::Click { x, y }));
            }
        }
    }

    for m in type_re().captures_iter(&normalized) {
        if let Some(text) = m.get(1) {
            actions.push((
                m.get(0).map_or(0, |g| g.start()),
                ActionSpec::TypeText {
                    text: text.as_str().to_string(),
                },
            ));
        }
    }

    for m in press_re().captures_iter(&normalized) {
        if let Some(key) = m.get(1) {
            actions.push((
                m.get(0).map_or(0, |g| g.start()),
                ActionSpec::KeyPress {
                    key: key.as_str().to_string(),
                },
            ));
        }
    }

    for m in wait_re().captures_iter(&normalized) {
        if let Some(ms) = m.get(1).and_then(|g| g.as_str().parse::<u64>().ok()) {
            actions.push((m.get(0).map_or(0, |g| g.start()), ActionSpec::Wait { ms }));
        }
    }

    // Restore order of appearance across pattern families.
    actions.sort_by_key(|(start, _)| *start);
    actions.into_iter().map(|(_, action)| action).collect()
}

fn coords_from_captures(captures: &regex::Captures<'_>) -> Option<(u32, u32)> {
    let x = captures.get(1)?.as_str().parse().ok()?;
    let y = captures.get(2)?.as_str().parse().ok()?;
    Some((x, y))
}

/// Wrap assistant text into a `Recommendation`.
pub fn parse_recommendation(text: &str) -> Recommendation {
    Recommendation {
        narrative: text.trim().to_string(),
        actions: parse_actions(text),
    }
}
