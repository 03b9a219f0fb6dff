//! Shared setup for pipeline integration tests

#![allow(dead_code)]

use pacemaker::orchestrator::{OrchestratorSettings, PlanOrchestrator};
use pacemaker::plan::{PlanDrafter, PollResponse, ProcessingStatus};
use pacemaker::storage::{MemoryBackend, Storage};
use pacemaker::testing::MockReasoningService;
use std::sync::Arc;
use std::time::Duration;

/// Orchestrator over a fresh memory backend that tests can inspect directly
pub struct TestEngine {
    pub orchestrator: PlanOrchestrator,
    pub backend: Arc<MemoryBackend>,
    pub reasoning: MockReasoningService,
}

impl TestEngine {
    pub fn new(reasoning: MockReasoningService) -> Self {
        Self::with_settings(reasoning, OrchestratorSettings::default())
    }

    pub fn with_settings(reasoning: MockReasoningService, settings: OrchestratorSettings) -> Self {
        let drafter = Arc::new(PlanDrafter::builtin().expect("builtin catalogs load"));
        Self::with_drafter(reasoning, settings, drafter)
    }

    pub fn with_drafter(
        reasoning: MockReasoningService,
        settings: OrchestratorSettings,
        drafter: Arc<PlanDrafter>,
    ) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let storage = Storage {
            plans: backend.clone(),
            counters: backend.clone(),
        };
        let orchestrator =
            PlanOrchestrator::new(drafter, storage, Arc::new(reasoning.clone()), settings)
                .expect("orchestrator builds");
        Self {
            orchestrator,
            backend,
            reasoning,
        }
    }

    /// Units of today's quota in use by `runner_id`
    pub async fn quota_used(&self, runner_id: &str) -> i64 {
        let key = self.orchestrator.quota_key(runner_id);
        self.orchestrator.quota().current(&key).await.unwrap()
    }

    /// Poll until the plan reaches a terminal status
    pub async fn poll_until_done(&self, id: &str) -> PollResponse {
        for _ in 0..200 {
            let response = self.orchestrator.poll(id).await.unwrap();
            if matches!(
                response.processing_status,
                ProcessingStatus::Completed | ProcessingStatus::Failed
            ) {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("pacemaker {} never finished", id);
    }
}

/// Settings with a short stage timeout
pub fn fast_timeout_settings(timeout: Duration) -> OrchestratorSettings {
    OrchestratorSettings {
        stage_timeout: timeout,
        ..OrchestratorSettings::default()
    }
}
