//! Template selection and scaling to a goal distance
//!
//! Selection rule: among the templates of the requested type, take the one
//! whose total distance at the runner's paces is nearest the goal. Ties keep
//! the template listed first in the catalog. Templates covering no distance
//! cannot be scaled and are skipped.
//!
//! Scaling multiplies every distance-contributing set by `goal / total`, so
//! the scaled workout covers the goal exactly. Timed rest stays as authored.

use super::convert::{distance_of, total_distance_of};
use super::{WorkoutCatalog, WorkoutSet, WorkoutTemplate};
use crate::error::{ErrorCode, LibResult, PacemakerError};
use crate::pace::{RunningType, TrainingPaces};
use serde::Serialize;
use tracing::debug;

/// A template copied out of the catalog and scaled to the goal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedWorkout {
    pub template_id: String,
    /// Distance of the unscaled template in meters
    pub template_distance_m: f64,
    pub scale: f64,
    pub sets: Vec<WorkoutSet>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSelector;

impl TemplateSelector {
    /// Pick the nearest template without scaling it
    pub fn nearest<'a>(
        &self,
        catalog: &'a WorkoutCatalog,
        goal_m: f64,
        running_type: RunningType,
        paces: &TrainingPaces,
    ) -> LibResult<(&'a WorkoutTemplate, f64)> {
        let mut best: Option<(&WorkoutTemplate, f64)> = None;

        for template in catalog.templates_for(running_type) {
            let total = total_distance_of(template, paces)?;
            if total <= 0.0 {
                continue;
            }
            let closer = match best {
                Some((_, best_total)) => (total - goal_m).abs() < (best_total - goal_m).abs(),
                None => true,
            };
            if closer {
                best = Some((template, total));
            }
        }

        best.ok_or_else(|| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_MISSING_TEMPLATE,
                format!("no usable {} template in the workout catalog", running_type.name()),
            )
        })
    }

    /// Pick the nearest template and scale a copy of its sets to the goal
    pub fn select(
        &self,
        catalog: &WorkoutCatalog,
        goal_m: f64,
        running_type: RunningType,
        paces: &TrainingPaces,
    ) -> LibResult<SelectedWorkout> {
        if !goal_m.is_finite() || goal_m <= 0.0 {
            return Err(PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!("goal distance must be positive, got {} m", goal_m),
                Some("goalKm".to_string()),
            ));
        }

        let (template, total) = self.nearest(catalog, goal_m, running_type, paces)?;
        let scale = goal_m / total;

        let sets = template
            .sets
            .iter()
            .map(|set| {
                let mut copy = set.clone();
                if distance_of(set, paces)? > 0.0 {
                    copy.value *= scale;
                }
                Ok(copy)
            })
            .collect::<LibResult<Vec<_>>>()?;

        debug!(
            "Selected template {} ({:.0} m) for {:.0} m goal, scale {:.3}",
            template.id, total, goal_m, scale
        );

        Ok(SelectedWorkout {
            template_id: template.id.clone(),
            template_distance_m: total,
            scale,
            sets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pace::Pace;
    use crate::workout::convert::total_distance_of_sets;
    use crate::workout::WorkoutType;

    fn paces() -> TrainingPaces {
        TrainingPaces::new(
            40,
            [
                (RunningType::Easy, Pace::from_seconds(360)),
                (RunningType::Threshold, Pace::from_seconds(300)),
            ],
        )
    }

    fn template(id: &str, sets: Vec<WorkoutSet>) -> WorkoutTemplate {
        WorkoutTemplate {
            id: id.into(),
            primary_type: RunningType::Threshold,
            sets,
            repetitions: None,
        }
    }

    fn catalog() -> WorkoutCatalog {
        WorkoutCatalog::from_templates(vec![
            template("SHORT", vec![WorkoutSet::distance(1, WorkoutType::T, 5000.0)]),
            template(
                "MEDIUM",
                vec![
                    WorkoutSet::distance(1, WorkoutType::E, 2000.0),
                    WorkoutSet::duration(2, WorkoutType::T, 30.0),
                    WorkoutSet::duration(3, WorkoutType::Rest, 2.0),
                    WorkoutSet::distance(4, WorkoutType::E, 2000.0),
                ],
            ),
            template("LONG", vec![WorkoutSet::distance(1, WorkoutType::T, 15000.0)]),
        ])
    }

    #[test]
    fn test_nearest_total_wins() {
        let catalog = catalog();
        // MEDIUM totals 2000 + 6000 + 2000 = 10 km
        let (chosen, total) = TemplateSelector
            .nearest(&catalog, 9000.0, RunningType::Threshold, &paces())
            .unwrap();
        assert_eq!(chosen.id, "MEDIUM");
        assert!((total - 10000.0).abs() < 1e-6);

        let (chosen, _) = TemplateSelector
            .nearest(&catalog, 4000.0, RunningType::Threshold, &paces())
            .unwrap();
        assert_eq!(chosen.id, "SHORT");
    }

    #[test]
    fn test_tie_keeps_catalog_order() {
        let catalog = catalog();
        // 7.5 km is 2.5 km from both SHORT and MEDIUM
        let (chosen, _) = TemplateSelector
            .nearest(&catalog, 7500.0, RunningType::Threshold, &paces())
            .unwrap();
        assert_eq!(chosen.id, "SHORT");
    }

    #[test]
    fn test_missing_type_is_configuration_error() {
        let err = TemplateSelector
            .select(&catalog(), 5000.0, RunningType::Interval, &paces())
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_TEMPLATE);
    }

    #[test]
    fn test_zero_distance_templates_skipped() {
        let catalog = WorkoutCatalog::from_templates(vec![template(
            "REST-ONLY",
            vec![WorkoutSet::duration(1, WorkoutType::Rest, 5.0)],
        )]);
        assert!(TemplateSelector
            .select(&catalog, 5000.0, RunningType::Threshold, &paces())
            .is_err());
    }

    #[test]
    fn test_scaled_copy_hits_goal() {
        let catalog = catalog();
        let selected = TemplateSelector
            .select(&catalog, 11000.0, RunningType::Threshold, &paces())
            .unwrap();

        assert_eq!(selected.template_id, "MEDIUM");
        assert!((selected.scale - 1.1).abs() < 1e-9);

        let total = total_distance_of_sets(&selected.sets, &paces()).unwrap();
        assert!((total - 11000.0).abs() < 1e-6);

        // Timed rest is not stretched
        assert_eq!(selected.sets[2].value, 2.0);

        // The catalog copy is untouched
        assert_eq!(catalog.get("MEDIUM").unwrap().sets[0].value, 2000.0);
    }

    #[test]
    fn test_non_positive_goal_rejected() {
        let err = TemplateSelector
            .select(&catalog(), 0.0, RunningType::Threshold, &paces())
            .unwrap_err();
        assert!(err.is_user_facing());
    }
}
