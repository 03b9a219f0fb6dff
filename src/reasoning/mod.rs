//! External reasoning service used to refine draft plans
//!
//! Plans go through two strictly sequential stages: `adjust` reworks the
//! numbers of the draft, then `narrate` writes the voice guidance for the
//! adjusted segments. The engine only relies on the call contract (prompt in,
//! plain text out); prompt wording and reply parsing live in `prompt` and
//! `response`.

pub mod client;
pub mod prompt;
pub mod response;

pub use client::ClaudeClient;
pub use prompt::PromptRenderer;
pub use response::{extract_json, parse_adjustment, parse_narration, AdjustedSegment, Narration};

use crate::error::LibResult;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Adjust,
    Narrate,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Adjust => "adjust",
            Stage::Narrate => "narrate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text completion service behind the two plan refinement stages
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Numeric and structural adjustment of a draft
    async fn adjust(&self, prompt: &str) -> LibResult<String>;

    /// Narrative and voice guidance for adjusted segments
    async fn narrate(&self, prompt: &str) -> LibResult<String>;

    async fn complete(&self, stage: Stage, prompt: &str) -> LibResult<String> {
        match stage {
            Stage::Adjust => self.adjust(prompt).await,
            Stage::Narrate => self.narrate(prompt).await,
        }
    }
}
