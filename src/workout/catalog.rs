//! Workout template catalog
//!
//! Template definitions are read once, validated, expanded, and then only ever
//! read. Lookups hand out slices into the catalog; callers copy sets before
//! changing them.

use super::{SetUnit, WorkoutSet, WorkoutTemplate, WorkoutType};
use crate::error::{ErrorCode, LibResult, PacemakerError};
use crate::pace::RunningType;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

const BUILTIN_WORKOUTS: &str = include_str!("../../data/workouts.yaml");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSet {
    set_num: u32,
    #[serde(rename = "type")]
    kind: WorkoutType,
    duration: Option<f64>,
    distance: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTemplate {
    id: String,
    sets: Vec<RawSet>,
    repetitions: Option<u32>,
}

impl RawSet {
    fn into_set(self, template_id: &str) -> LibResult<WorkoutSet> {
        let (unit, value) = match (self.duration, self.distance) {
            (Some(minutes), None) => (SetUnit::Duration, minutes),
            (None, Some(meters)) => (SetUnit::Distance, meters),
            _ => {
                return Err(PacemakerError::validation_with_code(
                    ErrorCode::VALIDATION_MALFORMED_SET,
                    format!(
                        "set {} of template {} needs exactly one of duration or distance",
                        self.set_num, template_id
                    ),
                    Some("sets".to_string()),
                ))
            }
        };

        if !value.is_finite() || value < 0.0 {
            return Err(PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!(
                    "set {} of template {} has negative or non-finite value {}",
                    self.set_num, template_id, value
                ),
                Some("sets".to_string()),
            ));
        }

        Ok(WorkoutSet {
            set_num: self.set_num,
            kind: self.kind,
            unit,
            value,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkoutCatalog {
    templates: HashMap<RunningType, Vec<WorkoutTemplate>>,
}

impl WorkoutCatalog {
    /// Build a catalog from already-typed templates, expanding repetition blocks
    pub fn from_templates(templates: impl IntoIterator<Item = WorkoutTemplate>) -> Self {
        let mut grouped: HashMap<RunningType, Vec<WorkoutTemplate>> = HashMap::new();

        for mut template in templates {
            if template.primary_type.is_repetition_based() {
                template.expand_repetitions();
            } else if template.repetitions.is_some() {
                warn!(
                    "Ignoring repetitions on {} template {}",
                    template.primary_type, template.id
                );
                template.repetitions = None;
            }
            grouped
                .entry(template.primary_type)
                .or_default()
                .push(template);
        }

        Self { templates: grouped }
    }

    /// Parse the YAML layout: a map from running type to its template list
    pub fn from_yaml_str(yaml: &str) -> LibResult<Self> {
        let raw: BTreeMap<RunningType, Vec<RawTemplate>> =
            serde_yaml::from_str(yaml).map_err(|e| {
                PacemakerError::config_with_code(
                    ErrorCode::CONFIG_CATALOG_PARSE,
                    format!("workout catalog is not valid YAML: {}", e),
                )
            })?;

        let mut templates = Vec::new();
        for (primary_type, entries) in raw {
            for entry in entries {
                let sets = entry
                    .sets
                    .into_iter()
                    .map(|set| set.into_set(&entry.id))
                    .collect::<LibResult<Vec<_>>>()?;
                templates.push(WorkoutTemplate {
                    id: entry.id,
                    primary_type,
                    sets,
                    repetitions: entry.repetitions,
                });
            }
        }

        let catalog = Self::from_templates(templates);
        debug!("Workout catalog loaded with {} templates", catalog.len());
        Ok(catalog)
    }

    pub fn from_path(path: &Path) -> LibResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("cannot read workout catalog {}", path.display()),
            )
            .with_source(e)
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn builtin() -> LibResult<Self> {
        Self::from_yaml_str(BUILTIN_WORKOUTS)
    }

    /// Templates for a type in catalog order; empty when none exist
    pub fn templates_for(&self, running_type: RunningType) -> &[WorkoutTemplate] {
        self.templates
            .get(&running_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Option<&WorkoutTemplate> {
        self.templates.values().flatten().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
T:
  - id: T-A
    sets:
      - { setNum: 1, type: E, duration: 10 }
      - { setNum: 2, type: T, distance: 3000 }
I:
  - id: I-A
    repetitions: 3
    sets:
      - { setNum: 1, type: I, distance: 800 }
      - { setNum: 1, type: REST, duration: 2 }
"#;

    #[test]
    fn test_yaml_layout() {
        let catalog = WorkoutCatalog::from_yaml_str(SMALL).unwrap();
        assert_eq!(catalog.len(), 2);

        let threshold = catalog.templates_for(RunningType::Threshold);
        assert_eq!(threshold.len(), 1);
        assert_eq!(threshold[0].sets[0].unit, SetUnit::Duration);
        assert_eq!(threshold[0].sets[1].unit, SetUnit::Distance);
        assert_eq!(threshold[0].sets[1].value, 3000.0);

        assert!(catalog.templates_for(RunningType::Marathon).is_empty());
    }

    #[test]
    fn test_interval_templates_expand_on_load() {
        let catalog = WorkoutCatalog::from_yaml_str(SMALL).unwrap();
        let interval = catalog.get("I-A").unwrap();
        assert_eq!(interval.sets.len(), 6);
        assert_eq!(interval.repetitions, None);
        assert_eq!(
            interval.sets.iter().map(|s| s.set_num).collect::<Vec<_>>(),
            vec![1, 1, 2, 2, 3, 3]
        );
    }

    #[test]
    fn test_set_with_both_units_rejected() {
        let yaml = r#"
E:
  - id: E-BAD
    sets:
      - { setNum: 1, type: E, duration: 10, distance: 2000 }
"#;
        let err = WorkoutCatalog::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_MALFORMED_SET);
    }

    #[test]
    fn test_negative_value_rejected() {
        let yaml = r#"
E:
  - id: E-NEG
    sets:
      - { setNum: 1, type: E, distance: -5 }
"#;
        assert!(WorkoutCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let yaml = "X:\n  - id: nope\n    sets: []\n";
        let err = WorkoutCatalog::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_CATALOG_PARSE);
    }

    #[test]
    fn test_builtin_catalog_covers_every_type() {
        let catalog = WorkoutCatalog::builtin().unwrap();
        for kind in RunningType::ALL {
            assert!(!catalog.templates_for(kind).is_empty(), "no {} templates", kind);
        }
        let reps = catalog.get("R-10X400").unwrap();
        assert_eq!(reps.sets.len(), 20);
        assert_eq!(reps.sets[19].set_num, 10);
    }
}
