//! Common fixtures: profiles, requests and canned reasoning replies

pub mod builders;

pub use builders::RunnerProfileBuilder;

use crate::pace::RunningType;
use crate::plan::{PlanRequest, RunnerProfile};
use crate::reasoning::extract_json;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

static NARRATED_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\d+\. set ").unwrap());

/// VDOT 40 runner in very good condition
pub fn runner_profile() -> RunnerProfile {
    RunnerProfileBuilder::new().build()
}

/// 10 km threshold run on a 32 C day for `runner-1`
pub fn threshold_request() -> PlanRequest {
    PlanRequest::new("runner-1", RunningType::Threshold, 10.0).with_temperature(32.0)
}

/// Adjustment reply that hands the draft segments back unchanged.
///
/// The adjust prompt carries the draft as its first fenced JSON block.
pub fn echo_adjust_reply(prompt: &str) -> String {
    extract_json(prompt).unwrap_or("[]").to_string()
}

/// Narration reply with `count` segment messages
pub fn narration_reply(count: usize) -> String {
    let messages: Vec<String> = (1..=count)
        .map(|n| format!("Segment {}, hold your pace", n))
        .collect();
    json!({
        "summary": "A steady session built around your threshold pace",
        "initialMessage": "Warm up gently and settle into your rhythm",
        "runningTip": "Drink a little water before you start",
        "messages": messages,
    })
    .to_string()
}

/// Narration reply with one message per segment listed in a narrate prompt
pub fn narration_reply_for(prompt: &str) -> String {
    narration_reply(NARRATED_SEGMENT.find_iter(prompt).count())
}
