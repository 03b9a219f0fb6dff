//! Mock reasoning service for testing

use crate::error::{ErrorCode, LibResult, PacemakerError};
use crate::reasoning::{ReasoningService, Stage};
use crate::testing::fixtures::{echo_adjust_reply, narration_reply_for};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

type ReplyFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone)]
enum Reply {
    Text(String),
    With(ReplyFn),
    Fail { code: u16, message: String },
}

impl Reply {
    fn produce(&self, stage: Stage, prompt: &str) -> LibResult<String> {
        match self {
            Reply::Text(text) => Ok(text.clone()),
            Reply::With(f) => Ok(f(prompt)),
            Reply::Fail { code, message } => {
                Err(PacemakerError::reasoning(*code, stage.name(), message.clone()))
            }
        }
    }
}

#[derive(Clone)]
struct StageScript {
    reply: Reply,
    delay: Option<Duration>,
}

/// Builder for creating configured mock reasoning services
pub struct MockReasoningServiceBuilder {
    adjust: StageScript,
    narrate: StageScript,
}

impl Default for MockReasoningServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReasoningServiceBuilder {
    /// Echoes the draft on adjust and narrates every segment
    pub fn new() -> Self {
        Self {
            adjust: StageScript {
                reply: Reply::With(Arc::new(echo_adjust_reply)),
                delay: None,
            },
            narrate: StageScript {
                reply: Reply::With(Arc::new(narration_reply_for)),
                delay: None,
            },
        }
    }

    /// Return the draft segments unchanged
    pub fn echo_adjust(mut self) -> Self {
        self.adjust.reply = Reply::With(Arc::new(echo_adjust_reply));
        self
    }

    pub fn adjust_reply(mut self, reply: impl Into<String>) -> Self {
        self.adjust.reply = Reply::Text(reply.into());
        self
    }

    pub fn adjust_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.adjust.reply = Reply::With(Arc::new(f));
        self
    }

    pub fn fail_adjust(mut self, message: impl Into<String>) -> Self {
        self.adjust.reply = Reply::Fail {
            code: ErrorCode::REASONING_REQUEST_FAILED,
            message: message.into(),
        };
        self
    }

    pub fn adjust_delay(mut self, delay: Duration) -> Self {
        self.adjust.delay = Some(delay);
        self
    }

    pub fn narrate_reply(mut self, reply: impl Into<String>) -> Self {
        self.narrate.reply = Reply::Text(reply.into());
        self
    }

    pub fn narrate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.narrate.reply = Reply::With(Arc::new(f));
        self
    }

    pub fn fail_narrate(mut self, message: impl Into<String>) -> Self {
        self.narrate.reply = Reply::Fail {
            code: ErrorCode::REASONING_REQUEST_FAILED,
            message: message.into(),
        };
        self
    }

    pub fn narrate_delay(mut self, delay: Duration) -> Self {
        self.narrate.delay = Some(delay);
        self
    }

    pub fn build(self) -> MockReasoningService {
        MockReasoningService {
            adjust: self.adjust,
            narrate: self.narrate,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Scripted `ReasoningService` that records every prompt it receives
#[derive(Clone)]
pub struct MockReasoningService {
    adjust: StageScript,
    narrate: StageScript,
    calls: Arc<Mutex<Vec<(Stage, String)>>>,
}

impl MockReasoningService {
    pub fn builder() -> MockReasoningServiceBuilder {
        MockReasoningServiceBuilder::new()
    }

    /// Prompts received for `stage`, oldest first
    pub fn prompts(&self, stage: Stage) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    pub fn call_count(&self, stage: Stage) -> usize {
        self.prompts(stage).len()
    }

    /// Stages in the order they were called
    pub fn call_order(&self) -> Vec<Stage> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(stage, _)| *stage)
            .collect()
    }

    async fn respond(&self, stage: Stage, prompt: &str) -> LibResult<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((stage, prompt.to_string()));

        let script = match stage {
            Stage::Adjust => &self.adjust,
            Stage::Narrate => &self.narrate,
        };
        if let Some(delay) = script.delay {
            tokio::time::sleep(delay).await;
        }
        script.reply.produce(stage, prompt)
    }
}

#[async_trait]
impl ReasoningService for MockReasoningService {
    async fn adjust(&self, prompt: &str) -> LibResult<String> {
        self.respond(Stage::Adjust, prompt).await
    }

    async fn narrate(&self, prompt: &str) -> LibResult<String> {
        self.respond(Stage::Narrate, prompt).await
    }
}
