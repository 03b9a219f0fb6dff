//! The pacemaker plan aggregate
//!
//! A `Pacemaker` is created in `CREATED` when a runner asks for a plan, moves
//! through `PROCESSING`, and ends `COMPLETED` or `FAILED`. Its segments are
//! only filled in on completion.

pub mod draft;
pub mod profile;
pub mod transitions;

pub use draft::{DraftPlan, DraftSegment, PlanDrafter};
pub use profile::{Condition, Gender, PlanRequest, RunnerProfile};
pub use transitions::Completion;

use crate::pace::{Pace, RunningType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Created,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessingStatus::Created => "CREATED",
            ProcessingStatus::Processing => "PROCESSING",
            ProcessingStatus::Completed => "COMPLETED",
            ProcessingStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// One ordered portion of a finished plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacemakerSegment {
    pub set_num: u32,
    pub message: String,
    pub start_km: f64,
    pub end_km: f64,
    /// Per-km pace, "minutes.seconds" on the wire
    pub pace: Pace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pacemaker {
    pub id: String,
    pub runner_id: String,
    /// The run this plan is attached to, if any
    #[serde(default)]
    pub running_id: Option<String>,
    pub norm: RunningType,
    pub goal_km: f64,
    #[serde(default)]
    pub vdot: Option<u8>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub expected_minutes: Option<u32>,
    #[serde(default)]
    pub initial_message: Option<String>,
    #[serde(default)]
    pub running_tip: Option<String>,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub segments: Vec<PacemakerSegment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pacemaker {
    pub fn new(
        runner_id: impl Into<String>,
        running_id: Option<String>,
        norm: RunningType,
        goal_km: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            runner_id: runner_id.into(),
            running_id,
            norm,
            goal_km,
            vdot: None,
            template_id: None,
            summary: None,
            expected_minutes: None,
            initial_message: None,
            running_tip: None,
            processing_status: ProcessingStatus::Created,
            failure_reason: None,
            segments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Client-facing view; only completed plans have one
    pub fn view(&self) -> Option<PacemakerView> {
        if self.processing_status != ProcessingStatus::Completed {
            return None;
        }

        Some(PacemakerView {
            id: self.id.clone(),
            norm: self.norm,
            summary: self.summary.clone().unwrap_or_default(),
            goal_km: self.goal_km,
            expected_minutes: self.expected_minutes.unwrap_or_default(),
            initial_message: self.initial_message.clone().unwrap_or_default(),
            running_tip: self.running_tip.clone().unwrap_or_default(),
            segments: self.segments.clone(),
        })
    }

    pub fn poll_response(&self) -> PollResponse {
        PollResponse {
            processing_status: self.processing_status,
            pacemaker: self.view(),
        }
    }
}

/// What a polling client receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub processing_status: ProcessingStatus,
    pub pacemaker: Option<PacemakerView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacemakerView {
    pub id: String,
    pub norm: RunningType,
    pub summary: String,
    pub goal_km: f64,
    pub expected_minutes: u32,
    pub initial_message: String,
    pub running_tip: String,
    pub segments: Vec<PacemakerSegment>,
}
