//! Parsing and validation of reasoning replies
//!
//! Replies are free text that should contain one JSON document, either in a
//! fenced code block or bare. Anything that does not survive the checks
//! below fails the stage.

use crate::error::{ErrorCode, LibResult, PacemakerError};
use crate::pace::Pace;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Contiguity slack between neighbouring segments, in km
const JOIN_EPSILON_KM: f64 = 0.005;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").unwrap());

/// Pull the JSON document out of a reply.
///
/// Prefers the first fenced block; otherwise takes the span from the first
/// `[` or `{` to the last `]` or `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(captures) = FENCED_BLOCK.captures(text) {
        if let Some(body) = captures.get(1) {
            let body = body.as_str().trim();
            if !body.is_empty() {
                return Some(body);
            }
        }
    }

    let start = text.find(['[', '{'])?;
    let end = text.rfind([']', '}'])?;
    (end > start).then(|| text[start..=end].trim())
}

fn invalid(stage: &str, message: impl Into<String>) -> PacemakerError {
    PacemakerError::reasoning(ErrorCode::REASONING_INVALID_RESPONSE, stage, message)
}

fn parse_json<T: for<'de> Deserialize<'de>>(stage: &str, text: &str) -> LibResult<T> {
    let json = extract_json(text).ok_or_else(|| invalid(stage, "reply contains no JSON"))?;
    serde_json::from_str(json)
        .map_err(|e| invalid(stage, format!("reply JSON does not match: {}", e)).with_source(e))
}

/// One segment as returned by the adjustment stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedSegment {
    pub set_num: u32,
    pub start_km: f64,
    pub end_km: f64,
    pub pace: Pace,
}

impl AdjustedSegment {
    pub fn length_km(&self) -> f64 {
        self.end_km - self.start_km
    }
}

/// Parse the adjustment reply and check it still describes the requested run.
///
/// Segments must be non-empty, start at kilometer zero, join without gaps or
/// overlaps, have positive length and pace, and end within `tolerance_km` of
/// the goal.
pub fn parse_adjustment(
    text: &str,
    goal_km: f64,
    tolerance_km: f64,
) -> LibResult<Vec<AdjustedSegment>> {
    const STAGE: &str = "adjust";
    let segments: Vec<AdjustedSegment> = parse_json(STAGE, text)?;

    let first = segments
        .first()
        .ok_or_else(|| invalid(STAGE, "no segments returned"))?;
    if first.start_km.abs() > JOIN_EPSILON_KM {
        return Err(invalid(
            STAGE,
            format!("first segment starts at {} km", first.start_km),
        ));
    }

    for (index, segment) in segments.iter().enumerate() {
        if !(segment.start_km.is_finite() && segment.end_km.is_finite())
            || segment.length_km() <= 0.0
        {
            return Err(invalid(
                STAGE,
                format!(
                    "segment {} spans {} to {} km",
                    index + 1,
                    segment.start_km,
                    segment.end_km
                ),
            ));
        }
        if segment.pace.seconds() == 0 {
            return Err(invalid(STAGE, format!("segment {} has zero pace", index + 1)));
        }
    }

    for pair in segments.windows(2) {
        if (pair[1].start_km - pair[0].end_km).abs() > JOIN_EPSILON_KM {
            return Err(invalid(
                STAGE,
                format!(
                    "gap or overlap between {} km and {} km",
                    pair[0].end_km, pair[1].start_km
                ),
            ));
        }
    }

    let end_km = segments.last().map_or(0.0, |segment| segment.end_km);
    if (end_km - goal_km).abs() > tolerance_km {
        return Err(invalid(
            STAGE,
            format!("plan ends at {} km, goal is {} km", end_km, goal_km),
        ));
    }

    Ok(segments)
}

/// Voice guidance returned by the narration stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narration {
    pub summary: String,
    pub initial_message: String,
    pub running_tip: String,
    pub messages: Vec<String>,
}

/// Parse the narration reply; it needs one message per adjusted segment
pub fn parse_narration(text: &str, segment_count: usize) -> LibResult<Narration> {
    const STAGE: &str = "narrate";
    let narration: Narration = parse_json(STAGE, text)?;

    if narration.summary.trim().is_empty() {
        return Err(invalid(STAGE, "summary is empty"));
    }
    if narration.messages.len() != segment_count {
        return Err(invalid(
            STAGE,
            format!(
                "{} messages for {} segments",
                narration.messages.len(),
                segment_count
            ),
        ));
    }
    Ok(narration)
}
