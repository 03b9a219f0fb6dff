//! Set distances in meters

use super::{SetUnit, WorkoutSet, WorkoutTemplate};
use crate::error::LibResult;
use crate::pace::TrainingPaces;

/// Distance covered by one set, in meters.
///
/// Distance sets count as authored whatever their type. Timed rest covers
/// nothing. Timed running covers `minutes / pace_minutes_per_km * 1000`; a
/// missing pace for the set's type is a configuration error.
pub fn distance_of(set: &WorkoutSet, paces: &TrainingPaces) -> LibResult<f64> {
    match (set.unit, set.kind.running_type()) {
        (SetUnit::Distance, _) => Ok(set.value),
        (SetUnit::Duration, None) => Ok(0.0),
        (SetUnit::Duration, Some(kind)) => {
            let pace = paces.pace(kind)?;
            Ok(set.value / pace.minutes() * 1000.0)
        }
    }
}

/// Sum of `distance_of` over the sets in document order
pub fn total_distance_of(template: &WorkoutTemplate, paces: &TrainingPaces) -> LibResult<f64> {
    total_distance_of_sets(&template.sets, paces)
}

pub fn total_distance_of_sets(sets: &[WorkoutSet], paces: &TrainingPaces) -> LibResult<f64> {
    sets.iter().map(|set| distance_of(set, paces)).sum()
}

impl WorkoutTemplate {
    pub fn total_distance(&self, paces: &TrainingPaces) -> LibResult<f64> {
        total_distance_of(self, paces)
    }
}
