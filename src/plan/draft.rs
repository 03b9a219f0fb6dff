//! Draft plan assembly
//!
//! Turns a runner profile and a request into a segment list: VDOT, paces,
//! the scaled template, then one segment per distance-covering set laid end
//! to end from kilometer zero. This is the input of the first reasoning stage.

use super::profile::{PlanRequest, RunnerProfile};
use crate::error::LibResult;
use crate::pace::{Pace, PaceTable, RunningType, TrainingPaces, VdotEstimator};
use crate::workout::{distance_of, SelectedWorkout, SetUnit, TemplateSelector, WorkoutCatalog, WorkoutType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One leg of the draft, positioned on the course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSegment {
    pub set_num: u32,
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub start_km: f64,
    pub end_km: f64,
    pub pace: Pace,
}

impl DraftSegment {
    pub fn length_km(&self) -> f64 {
        self.end_km - self.start_km
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPlan {
    pub running_type: RunningType,
    pub goal_km: f64,
    pub vdot: u8,
    pub paces: TrainingPaces,
    pub workout: SelectedWorkout,
    pub segments: Vec<DraftSegment>,
    /// Standing rest taken between efforts, in minutes
    pub rest_minutes: f64,
}

impl DraftPlan {
    pub fn expected_minutes(&self) -> u32 {
        expected_minutes(
            self.segments.iter().map(|s| (s.length_km(), s.pace)),
            self.rest_minutes,
        )
    }
}

/// Whole minutes needed to run `legs` of `(km, pace)` plus standing rest, rounded up
pub fn expected_minutes(legs: impl IntoIterator<Item = (f64, Pace)>, rest_minutes: f64) -> u32 {
    let running: f64 = legs.into_iter().map(|(km, pace)| km * pace.minutes()).sum();
    let total = running + rest_minutes;
    // float noise must not push an exact minute count up by one
    (total - 1e-6).ceil().max(0.0) as u32
}

pub(crate) fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Builds draft plans from shared, immutable reference data
#[derive(Debug, Clone)]
pub struct PlanDrafter {
    pace_table: Arc<PaceTable>,
    estimator: Arc<VdotEstimator>,
    catalog: Arc<WorkoutCatalog>,
    selector: TemplateSelector,
}

impl PlanDrafter {
    pub fn new(
        pace_table: Arc<PaceTable>,
        estimator: Arc<VdotEstimator>,
        catalog: Arc<WorkoutCatalog>,
    ) -> Self {
        Self {
            pace_table,
            estimator,
            catalog,
            selector: TemplateSelector,
        }
    }

    /// Drafter over the reference data embedded in the crate
    pub fn builtin() -> LibResult<Self> {
        Ok(Self::new(
            Arc::new(PaceTable::builtin()?),
            Arc::new(VdotEstimator::builtin()?),
            Arc::new(WorkoutCatalog::builtin()?),
        ))
    }

    pub fn pace_table(&self) -> &PaceTable {
        &self.pace_table
    }

    pub fn estimator(&self) -> &VdotEstimator {
        &self.estimator
    }

    pub fn catalog(&self) -> &WorkoutCatalog {
        &self.catalog
    }

    /// VDOT used for a request: re-estimated from a recent mile when given
    pub fn resolve_vdot(&self, profile: &RunnerProfile, request: &PlanRequest) -> u8 {
        match request.recent_mile_pace {
            Some(mile) => {
                let estimated = self.estimator.estimate(mile);
                debug!(
                    "Estimated VDOT {} from mile pace {} (profile says {})",
                    estimated,
                    mile.clock(),
                    profile.vdot
                );
                estimated
            }
            None => profile.vdot,
        }
    }

    pub fn draft(&self, profile: &RunnerProfile, request: &PlanRequest) -> LibResult<DraftPlan> {
        profile.validate()?;
        request.validate()?;

        let vdot = self.resolve_vdot(profile, request);
        let paces = self.pace_table.paces_for(vdot)?;
        let workout = self.selector.select(
            &self.catalog,
            request.goal_km * 1000.0,
            request.running_type,
            &paces,
        )?;

        let mut segments = Vec::with_capacity(workout.sets.len());
        let mut rest_minutes = 0.0;
        let mut covered_m = 0.0;

        for set in &workout.sets {
            let meters = distance_of(set, &paces)?;
            if meters <= 0.0 {
                if set.is_rest() && set.unit == SetUnit::Duration {
                    rest_minutes += set.value;
                }
                continue;
            }

            let start_km = round_km(covered_m / 1000.0);
            covered_m += meters;
            let end_km = round_km(covered_m / 1000.0);
            if end_km <= start_km {
                continue;
            }

            // Recovery jogs are run at easy pace
            let pace = paces.pace(set.kind.running_type().unwrap_or(RunningType::Easy))?;
            segments.push(DraftSegment {
                set_num: set.set_num,
                kind: set.kind,
                start_km,
                end_km,
                pace,
            });
        }

        let plan = DraftPlan {
            running_type: request.running_type,
            goal_km: request.goal_km,
            vdot,
            paces,
            workout,
            segments,
            rest_minutes,
        };

        info!(
            "Drafted {} km {} plan from {} for runner {} (vdot {}, {} segments)",
            plan.goal_km,
            plan.running_type.name(),
            plan.workout.template_id,
            request.runner_id,
            plan.vdot,
            plan.segments.len()
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::plan::profile::{Condition, Gender};

    fn profile(vdot: u8) -> RunnerProfile {
        RunnerProfile {
            age: 34,
            gender: Gender::Male,
            weight_kg: 70.0,
            height_cm: 175.0,
            vdot,
            condition: Condition::VeryGood,
        }
    }

    fn drafter() -> PlanDrafter {
        PlanDrafter::builtin().unwrap()
    }

    #[test]
    fn test_threshold_ten_km_draft() {
        let request = PlanRequest::new("runner-1", RunningType::Threshold, 10.0).with_temperature(32.0);
        let plan = drafter().draft(&profile(40), &request).unwrap();

        assert_eq!(plan.vdot, 40);
        assert_eq!(plan.workout.template_id, "T-CRUISE-3X1600");
        assert_eq!(plan.segments.len(), 5);
        assert_eq!(plan.rest_minutes, 2.0);

        let first = &plan.segments[0];
        assert_eq!(first.start_km, 0.0);
        assert_eq!(first.kind, WorkoutType::E);
        assert_eq!(first.pace, Pace::from_seconds(386));

        let last = plan.segments.last().unwrap();
        assert_eq!(last.end_km, 10.0);

        for pair in plan.segments.windows(2) {
            assert_eq!(pair[0].end_km, pair[1].start_km);
        }
        assert!(plan
            .segments
            .iter()
            .filter(|s| s.kind == WorkoutType::T)
            .all(|s| s.pace == Pace::from_seconds(300)));
    }

    #[test]
    fn test_expected_minutes_includes_rest() {
        let request = PlanRequest::new("runner-1", RunningType::Threshold, 10.0);
        let plan = drafter().draft(&profile(40), &request).unwrap();
        // 4.54 km easy at 6:26 and 5.46 km threshold at 5:00, plus 2 min rest
        assert_eq!(plan.expected_minutes(), 59);
    }

    #[test]
    fn test_expected_minutes_rounds_up() {
        assert_eq!(expected_minutes([(1.0, Pace::from_seconds(300))], 0.0), 5);
        assert_eq!(expected_minutes([(1.0, Pace::from_seconds(301))], 0.0), 6);
        assert_eq!(expected_minutes([(2.0, Pace::from_seconds(330))], 1.5), 13);
        assert_eq!(expected_minutes(Vec::new(), 0.0), 0);
    }

    #[test]
    fn test_recent_mile_overrides_profile_vdot() {
        let request = PlanRequest::new("runner-1", RunningType::Easy, 8.0)
            .with_recent_mile_pace(Pace::from_seconds(469));
        let plan = drafter().draft(&profile(60), &request).unwrap();
        assert_eq!(plan.vdot, 36);
    }

    #[test]
    fn test_interval_draft_keeps_repetition_numbers() {
        let request = PlanRequest::new("runner-1", RunningType::Interval, 5.0);
        let plan = drafter().draft(&profile(50), &request).unwrap();

        assert!(plan.segments.iter().all(|s| s.set_num >= 1));
        let max_rep = plan.segments.iter().map(|s| s.set_num).max().unwrap();
        assert!(max_rep > 1);
        let end = plan.segments.last().unwrap().end_km;
        assert!((end - 5.0).abs() < 0.011);
    }

    #[test]
    fn test_invalid_profile_is_rejected_before_lookup() {
        let request = PlanRequest::new("runner-1", RunningType::Easy, 5.0);
        let err = drafter().draft(&profile(12), &request).unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_OUT_OF_RANGE);
    }

    #[test]
    fn test_round_km() {
        assert_eq!(round_km(2.2727), 2.27);
        assert_eq!(round_km(4.0909), 4.09);
        assert_eq!(round_km(10.0000001), 10.0);
    }
}
