//! Testing utilities and fixtures
//!
//! A scripted `MockReasoningService` plus fixtures shared by unit tests,
//! integration tests and benches. By default the mock echoes the draft back
//! from the adjust stage and narrates every segment, which is enough for a
//! full pipeline run without network access.

pub mod fixtures;
pub mod mocks;

pub use fixtures::{
    echo_adjust_reply, narration_reply, narration_reply_for, runner_profile, threshold_request,
    RunnerProfileBuilder,
};
pub use mocks::{MockReasoningService, MockReasoningServiceBuilder};
