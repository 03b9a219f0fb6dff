//! Processing status transitions for pacemaker jobs
//!
//! Status only moves forward: `CREATED -> PROCESSING -> COMPLETED | FAILED`,
//! plus `CREATED -> FAILED` when the draft cannot be built. Terminal states
//! never change again.

use super::{Pacemaker, PacemakerSegment, ProcessingStatus};
use crate::error::{LibResult, PacemakerError};
use chrono::Utc;
use tracing::{debug, error, info};

impl ProcessingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }

    /// Statuses reachable in one step from this one
    pub fn valid_transitions(self) -> &'static [ProcessingStatus] {
        match self {
            ProcessingStatus::Created => &[ProcessingStatus::Processing, ProcessingStatus::Failed],
            ProcessingStatus::Processing => {
                &[ProcessingStatus::Completed, ProcessingStatus::Failed]
            }
            ProcessingStatus::Completed | ProcessingStatus::Failed => &[],
        }
    }

    pub fn can_transition_to(self, next: ProcessingStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

/// Narrative and numbers produced by a finished pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub summary: String,
    pub initial_message: String,
    pub running_tip: String,
    pub expected_minutes: u32,
    pub segments: Vec<PacemakerSegment>,
}

impl Pacemaker {
    /// Move to `next`, rejecting anything the state machine does not allow
    pub fn transition(&mut self, next: ProcessingStatus) -> LibResult<()> {
        let from = self.processing_status;
        if !from.can_transition_to(next) {
            return Err(PacemakerError::InvalidTransition { from, to: next });
        }

        self.processing_status = next;
        self.updated_at = Utc::now();
        debug!("Pacemaker {} transitioned from {} to {}", self.id, from, next);
        Ok(())
    }

    pub fn mark_processing(&mut self) -> LibResult<()> {
        self.transition(ProcessingStatus::Processing)
    }

    /// Fill in the finished plan and mark it completed
    pub fn complete(&mut self, completion: Completion) -> LibResult<()> {
        self.transition(ProcessingStatus::Completed)?;

        self.summary = Some(completion.summary);
        self.initial_message = Some(completion.initial_message);
        self.running_tip = Some(completion.running_tip);
        self.expected_minutes = Some(completion.expected_minutes);
        self.segments = completion.segments;

        info!(
            "Pacemaker {} completed with {} segments",
            self.id,
            self.segments.len()
        );
        Ok(())
    }

    /// Mark as failed from any non-terminal status
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> LibResult<()> {
        self.transition(ProcessingStatus::Failed)?;

        let reason = reason.into();
        error!("Pacemaker {} failed: {}", self.id, reason);
        self.failure_reason = Some(reason);
        Ok(())
    }
}
