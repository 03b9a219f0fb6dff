//! Mock implementations of the engine's external collaborators

pub mod reasoning;

pub use reasoning::{MockReasoningService, MockReasoningServiceBuilder};
