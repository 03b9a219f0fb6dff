//! Plan generation pipeline
//!
//! `submit` does the synchronous part of a request (quota, record creation,
//! drafting) and hands the two reasoning stages to a background task. The
//! caller learns the outcome by polling. Every failure after the quota was
//! taken marks the record `FAILED` and gives the unit back.

use crate::config::EngineConfig;
use crate::error::{ErrorCode, LibResult, PacemakerError};
use crate::plan::draft::{expected_minutes, round_km};
use crate::plan::{
    Completion, DraftPlan, Pacemaker, PacemakerSegment, PlanDrafter, PlanRequest,
    PollResponse, ProcessingStatus, RunnerProfile,
};
use crate::quota::{daily_key, QuotaGuard};
use crate::reasoning::{
    parse_adjustment, parse_narration, PromptRenderer, ReasoningService, Stage,
};
use crate::storage::{PlanStore, Storage, StorageFactory};
use chrono::{FixedOffset, Offset, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Knobs the pipeline reads on every request
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub daily_limit: u32,
    pub quota_ttl: Duration,
    pub utc_offset: FixedOffset,
    pub stage_timeout: Duration,
    pub distance_tolerance_km: f64,
}

impl OrchestratorSettings {
    pub fn from_config(config: &EngineConfig) -> LibResult<Self> {
        Ok(Self {
            daily_limit: config.quota.daily_limit,
            quota_ttl: config.quota.ttl,
            utc_offset: config.quota.offset()?,
            stage_timeout: config.reasoning.stage_timeout,
            distance_tolerance_km: config.plan.distance_tolerance_km,
        })
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            daily_limit: config.quota.daily_limit,
            quota_ttl: config.quota.ttl,
            utc_offset: config.quota.offset().unwrap_or_else(|_| Utc.fix()),
            stage_timeout: config.reasoning.stage_timeout,
            distance_tolerance_km: config.plan.distance_tolerance_km,
        }
    }
}

/// A submitted plan whose reasoning stages may still be running
#[derive(Debug)]
pub struct PlanHandle {
    pub id: String,
    task: JoinHandle<ProcessingStatus>,
}

impl PlanHandle {
    /// Wait for the background stages and return the final status
    pub async fn wait(self) -> LibResult<ProcessingStatus> {
        self.task.await.map_err(|e| {
            PacemakerError::reasoning(
                ErrorCode::JOB_GENERIC,
                "pipeline",
                format!("plan task for {} did not finish: {}", self.id, e),
            )
        })
    }
}

#[derive(Clone)]
pub struct PlanOrchestrator {
    drafter: Arc<PlanDrafter>,
    plans: Arc<dyn PlanStore>,
    quota: QuotaGuard,
    reasoning: Arc<dyn ReasoningService>,
    prompts: Arc<PromptRenderer>,
    settings: Arc<OrchestratorSettings>,
}

impl std::fmt::Debug for PlanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanOrchestrator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PlanOrchestrator {
    pub fn new(
        drafter: Arc<PlanDrafter>,
        storage: Storage,
        reasoning: Arc<dyn ReasoningService>,
        settings: OrchestratorSettings,
    ) -> LibResult<Self> {
        Ok(Self {
            drafter,
            plans: storage.plans,
            quota: QuotaGuard::new(storage.counters),
            reasoning,
            prompts: Arc::new(PromptRenderer::new()?),
            settings: Arc::new(settings),
        })
    }

    /// Build everything the config describes: catalogs, stores and settings
    pub async fn from_config(
        config: &EngineConfig,
        reasoning: Arc<dyn ReasoningService>,
    ) -> LibResult<Self> {
        let drafter = PlanDrafter::new(
            Arc::new(config.catalog.load_pace_table()?),
            Arc::new(config.catalog.load_estimator()?),
            Arc::new(config.catalog.load_workouts()?),
        );
        let storage = StorageFactory::from_config(&config.storage).await?;
        Self::new(
            Arc::new(drafter),
            storage,
            reasoning,
            OrchestratorSettings::from_config(config)?,
        )
    }

    /// Replace the embedded prompt templates
    pub fn with_prompts(mut self, prompts: PromptRenderer) -> Self {
        self.prompts = Arc::new(prompts);
        self
    }

    pub fn quota(&self) -> &QuotaGuard {
        &self.quota
    }

    pub fn drafter(&self) -> &PlanDrafter {
        &self.drafter
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Today's quota key for a runner
    pub fn quota_key(&self, runner_id: &str) -> String {
        daily_key(runner_id, Utc::now(), self.settings.utc_offset)
    }

    /// Accept a plan request.
    ///
    /// Quota exhaustion and malformed requests are rejected before anything
    /// is stored. Drafting failures are returned here too, after the record
    /// was marked `FAILED`. Once this returns `Ok` the record exists and the
    /// reasoning stages run in the background.
    pub async fn submit(
        &self,
        profile: RunnerProfile,
        request: PlanRequest,
    ) -> LibResult<PlanHandle> {
        request.validate()?;

        let quota_key = self.quota_key(&request.runner_id);
        let used = self
            .quota
            .acquire_for(
                &request.runner_id,
                &quota_key,
                self.settings.daily_limit,
                self.settings.quota_ttl,
            )
            .await?;
        debug!(
            "Runner {} request {}/{} today",
            request.runner_id, used, self.settings.daily_limit
        );

        let mut pacemaker = Pacemaker::new(
            request.runner_id.clone(),
            request.running_id.clone(),
            request.running_type,
            request.goal_km,
        );
        if let Err(e) = self.plans.save(&pacemaker).await {
            self.release_quota(&quota_key).await;
            return Err(PacemakerError::from(e).with_context("creating pacemaker record"));
        }
        info!(
            "Created pacemaker {} for runner {} ({} km {})",
            pacemaker.id,
            pacemaker.runner_id,
            pacemaker.goal_km,
            pacemaker.norm.name()
        );

        pacemaker.mark_processing()?;

        let draft = match self.drafter.draft(&profile, &request) {
            Ok(draft) => draft,
            Err(e) => {
                self.fail(pacemaker, &quota_key, &e).await;
                return Err(e);
            }
        };
        pacemaker.vdot = Some(draft.vdot);
        pacemaker.template_id = Some(draft.workout.template_id.clone());

        if let Err(e) = self.plans.save(&pacemaker).await {
            let e = PacemakerError::from(e);
            self.fail(pacemaker, &quota_key, &e).await;
            return Err(e);
        }

        let id = pacemaker.id.clone();
        let this = self.clone();
        let task = tokio::spawn(async move {
            this.finish(pacemaker, profile, request, draft, quota_key)
                .await
        });

        Ok(PlanHandle { id, task })
    }

    /// Current status of a plan, with the plan itself once completed
    pub async fn poll(&self, id: &str) -> LibResult<PollResponse> {
        match self.plans.find_by_id(id).await? {
            Some(pacemaker) => Ok(pacemaker.poll_response()),
            None => Err(PacemakerError::not_found(format!("No pacemaker with id {}", id))),
        }
    }

    pub async fn find(&self, id: &str) -> LibResult<Option<Pacemaker>> {
        Ok(self.plans.find_by_id(id).await?)
    }

    /// Drop every plan attached to the given runs
    pub async fn delete_for_runs(&self, running_ids: &[String]) -> LibResult<usize> {
        let deleted = self.plans.delete_by_running_ids(running_ids).await?;
        info!("Deleted {} pacemakers for {} runs", deleted, running_ids.len());
        Ok(deleted)
    }

    async fn finish(
        &self,
        pacemaker: Pacemaker,
        profile: RunnerProfile,
        request: PlanRequest,
        draft: DraftPlan,
        quota_key: String,
    ) -> ProcessingStatus {
        // Stages run in their own task so a panic in them still fails the plan
        let stages = self.clone();
        let outcome =
            tokio::spawn(async move { stages.run_stages(&profile, &request, &draft).await }).await;

        let completion = match outcome {
            Ok(Ok(completion)) => completion,
            Ok(Err(e)) => return self.fail(pacemaker, &quota_key, &e).await,
            Err(e) => {
                error!("Reasoning stages for pacemaker {} aborted: {}", pacemaker.id, e);
                let e = PacemakerError::reasoning(
                    ErrorCode::JOB_GENERIC,
                    "pipeline",
                    format!("reasoning stages aborted: {}", e),
                );
                return self.fail(pacemaker, &quota_key, &e).await;
            }
        };

        let mut finished = pacemaker.clone();
        let persisted = match finished.complete(completion) {
            Ok(()) => self.plans.save(&finished).await.map_err(PacemakerError::from),
            Err(e) => Err(e),
        };

        match persisted {
            Ok(()) => ProcessingStatus::Completed,
            Err(e) => self.fail(pacemaker, &quota_key, &e).await,
        }
    }

    async fn run_stages(
        &self,
        profile: &RunnerProfile,
        request: &PlanRequest,
        draft: &DraftPlan,
    ) -> LibResult<Completion> {
        let tolerance_km = self.settings.distance_tolerance_km;

        let prompt = self
            .prompts
            .render_adjust(profile, request, draft, tolerance_km)?;
        let reply = self
            .bounded(Stage::Adjust, self.reasoning.adjust(&prompt))
            .await?;
        let adjusted = parse_adjustment(&reply, draft.goal_km, tolerance_km)?;

        let expected_minutes = expected_minutes(
            adjusted.iter().map(|s| (s.length_km(), s.pace)),
            draft.rest_minutes,
        );
        debug!(
            "Adjusted plan has {} segments, about {} minutes",
            adjusted.len(),
            expected_minutes
        );

        let prompt = self.prompts.render_narrate(
            profile,
            request,
            draft.vdot,
            &adjusted,
            expected_minutes,
        )?;
        let reply = self
            .bounded(Stage::Narrate, self.reasoning.narrate(&prompt))
            .await?;
        let narration = parse_narration(&reply, adjusted.len())?;

        let segments = adjusted
            .into_iter()
            .zip(narration.messages)
            .map(|(segment, message)| PacemakerSegment {
                set_num: segment.set_num,
                message,
                start_km: round_km(segment.start_km),
                end_km: round_km(segment.end_km),
                pace: segment.pace,
            })
            .collect();

        Ok(Completion {
            summary: narration.summary,
            initial_message: narration.initial_message,
            running_tip: narration.running_tip,
            expected_minutes,
            segments,
        })
    }

    async fn bounded<F>(&self, stage: Stage, call: F) -> LibResult<String>
    where
        F: Future<Output = LibResult<String>>,
    {
        let after = self.settings.stage_timeout;
        debug!("Calling reasoning {} stage (timeout {:?})", stage, after);
        match tokio::time::timeout(after, call).await {
            Ok(result) => result,
            Err(_) => Err(PacemakerError::Timeout {
                stage: stage.name().to_string(),
                after,
            }),
        }
    }

    /// Mark failed, persist, and give the quota unit back
    async fn fail(
        &self,
        mut pacemaker: Pacemaker,
        quota_key: &str,
        cause: &PacemakerError,
    ) -> ProcessingStatus {
        if let Err(e) = pacemaker.mark_failed(cause.to_string()) {
            warn!("Pacemaker {} could not be marked failed: {}", pacemaker.id, e);
        }
        if let Err(e) = self.plans.save(&pacemaker).await {
            error!("Failed to persist failure of pacemaker {}: {}", pacemaker.id, e);
        }
        self.release_quota(quota_key).await;
        pacemaker.processing_status
    }

    async fn release_quota(&self, quota_key: &str) {
        if let Err(e) = self.quota.release(quota_key).await {
            error!("Failed to release quota {}: {}", quota_key, e);
        }
    }
}
