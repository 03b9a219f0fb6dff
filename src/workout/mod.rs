//! Workout templates and the arithmetic that turns them into distances
//!
//! - `catalog` - loads per-type template skeletons and expands repetition blocks
//! - `convert` - set and template distances in meters
//! - `selector` - nearest-distance template choice and scaling to a goal

pub mod catalog;
pub mod convert;
pub mod selector;

pub use catalog::WorkoutCatalog;
pub use convert::{distance_of, total_distance_of};
pub use selector::{SelectedWorkout, TemplateSelector};

use crate::pace::RunningType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Intensity of a single set; `Rest` marks recovery between efforts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkoutType {
    E,
    M,
    T,
    I,
    R,
    Rest,
}

impl WorkoutType {
    /// The running type whose pace applies, `None` for rest
    pub fn running_type(self) -> Option<RunningType> {
        match self {
            WorkoutType::E => Some(RunningType::Easy),
            WorkoutType::M => Some(RunningType::Marathon),
            WorkoutType::T => Some(RunningType::Threshold),
            WorkoutType::I => Some(RunningType::Interval),
            WorkoutType::R => Some(RunningType::Repetition),
            WorkoutType::Rest => None,
        }
    }
}

impl From<RunningType> for WorkoutType {
    fn from(kind: RunningType) -> Self {
        match kind {
            RunningType::Easy => WorkoutType::E,
            RunningType::Marathon => WorkoutType::M,
            RunningType::Threshold => WorkoutType::T,
            RunningType::Interval => WorkoutType::I,
            RunningType::Repetition => WorkoutType::R,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.running_type() {
            Some(kind) => f.write_str(kind.code()),
            None => f.write_str("REST"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SetUnit {
    /// `value` is minutes
    Duration,
    /// `value` is meters
    Distance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub set_num: u32,
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub unit: SetUnit,
    pub value: f64,
}

impl WorkoutSet {
    pub fn distance(set_num: u32, kind: WorkoutType, meters: f64) -> Self {
        Self {
            set_num,
            kind,
            unit: SetUnit::Distance,
            value: meters,
        }
    }

    pub fn duration(set_num: u32, kind: WorkoutType, minutes: f64) -> Self {
        Self {
            set_num,
            kind,
            unit: SetUnit::Duration,
            value: minutes,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.kind == WorkoutType::Rest
    }
}

/// Catalog data describing one workout.
///
/// Templates are shared reference data. Plans copy the sets they use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub primary_type: RunningType,
    pub sets: Vec<WorkoutSet>,
    /// Present until the repetition block has been expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<u32>,
}

impl WorkoutTemplate {
    /// Replace the base block with `repetitions` copies of it.
    ///
    /// Every set cloned for repetition `r` (0-based) gets `set_num = r + 1`, so
    /// all sub-sets of one repetition share a number and the set `kind` tells
    /// work from recovery. The count is cleared, making a second call a no-op.
    pub fn expand_repetitions(&mut self) {
        let Some(count) = self.repetitions.take() else {
            return;
        };

        let base = std::mem::take(&mut self.sets);
        self.sets = (0..count)
            .flat_map(|rep| {
                base.iter().cloned().map(move |mut set| {
                    set.set_num = rep + 1;
                    set
                })
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn interval_template(repetitions: Option<u32>) -> WorkoutTemplate {
        WorkoutTemplate {
            id: "I-TEST".into(),
            primary_type: RunningType::Interval,
            sets: vec![
                WorkoutSet::distance(1, WorkoutType::I, 1000.0),
                WorkoutSet::duration(1, WorkoutType::Rest, 3.0),
            ],
            repetitions,
        }
    }

    #[test]
    fn test_expansion_groups_set_numbers_by_repetition() {
        let mut template = interval_template(Some(3));
        template.expand_repetitions();

        let numbers: Vec<u32> = template.sets.iter().map(|s| s.set_num).collect();
        assert_eq!(numbers, vec![1, 1, 2, 2, 3, 3]);

        let kinds: Vec<WorkoutType> = template.sets.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WorkoutType::I,
                WorkoutType::Rest,
                WorkoutType::I,
                WorkoutType::Rest,
                WorkoutType::I,
                WorkoutType::Rest
            ]
        );
        assert_eq!(template.repetitions, None);
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let mut template = interval_template(Some(4));
        template.expand_repetitions();
        let once = template.clone();
        template.expand_repetitions();
        assert_eq!(template, once);
    }

    #[test]
    fn test_no_repetitions_leaves_sets_alone() {
        let mut template = interval_template(None);
        let before = template.clone();
        template.expand_repetitions();
        assert_eq!(template, before);
    }

    #[test]
    fn test_workout_type_serde() {
        let json = serde_json::to_string(&WorkoutType::Rest).unwrap();
        assert_eq!(json, "\"REST\"");
        let kind: WorkoutType = serde_json::from_str("\"T\"").unwrap();
        assert_eq!(kind.running_type(), Some(RunningType::Threshold));
    }

    proptest! {
        #[test]
        fn test_expansion_shape(base_len in 1usize..6, reps in 1u32..20) {
            let mut template = WorkoutTemplate {
                id: "P".into(),
                primary_type: RunningType::Repetition,
                sets: (0..base_len)
                    .map(|i| WorkoutSet::distance(99, WorkoutType::R, 100.0 * (i as f64 + 1.0)))
                    .collect(),
                repetitions: Some(reps),
            };
            template.expand_repetitions();

            prop_assert_eq!(template.sets.len(), base_len * reps as usize);
            for (index, set) in template.sets.iter().enumerate() {
                let rep = (index / base_len) as u32;
                prop_assert_eq!(set.set_num, rep + 1);
                prop_assert_eq!(set.value, 100.0 * ((index % base_len) as f64 + 1.0));
            }
        }
    }
}
