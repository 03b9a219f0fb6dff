//! One-mile pace to VDOT estimation

use super::{validate_vdot, Pace, MAX_VDOT, MIN_VDOT};
use crate::error::{ErrorCode, LibResult, PacemakerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_MILE_REFERENCE: &str = include_str!("../../data/mile_reference.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MileReferenceRow {
    pub vdot: u8,
    /// "mm:ss"
    pub mile_pace: String,
}

/// Maps an observed one-mile pace to a VDOT score.
///
/// The estimator is conservative: a time between two reference points gets
/// the lower VDOT of the pair.
#[derive(Debug, Clone)]
pub struct VdotEstimator {
    /// Sorted by ascending VDOT, so by strictly descending pace
    points: Vec<(u8, Pace)>,
}

impl VdotEstimator {
    pub fn from_rows(rows: impl IntoIterator<Item = MileReferenceRow>) -> LibResult<Self> {
        let mut points = rows
            .into_iter()
            .map(|row| {
                let vdot = validate_vdot(row.vdot)?;
                Ok((vdot, Pace::from_clock(&row.mile_pace)?))
            })
            .collect::<LibResult<Vec<_>>>()?;

        if points.is_empty() {
            return Err(PacemakerError::config_with_code(
                ErrorCode::CONFIG_MISSING_REFERENCE,
                "mile reference table has no rows",
            ));
        }

        points.sort_by_key(|(vdot, _)| *vdot);

        for pair in points.windows(2) {
            let ((slower_vdot, slower), (faster_vdot, faster)) = (pair[0], pair[1]);
            if slower_vdot == faster_vdot || faster >= slower {
                return Err(PacemakerError::config_with_code(
                    ErrorCode::CONFIG_CATALOG_PARSE,
                    format!(
                        "mile reference must get strictly faster with VDOT (vdot {} {} vs vdot {} {})",
                        slower_vdot,
                        slower.clock(),
                        faster_vdot,
                        faster.clock()
                    ),
                ));
            }
        }

        Ok(Self { points })
    }

    pub fn from_json_str(json: &str) -> LibResult<Self> {
        let rows: Vec<MileReferenceRow> = serde_json::from_str(json).map_err(|e| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_CATALOG_PARSE,
                format!("mile reference is not valid JSON: {}", e),
            )
        })?;
        Self::from_rows(rows)
    }

    pub fn from_path(path: &Path) -> LibResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("cannot read mile reference {}", path.display()),
            )
            .with_source(e)
        })?;
        Self::from_json_str(&json)
    }

    pub fn builtin() -> LibResult<Self> {
        Self::from_json_str(BUILTIN_MILE_REFERENCE)
    }

    /// Estimate VDOT from a one-mile pace.
    ///
    /// Picks the highest VDOT whose reference time is not faster than the
    /// observed one. Slower than every point clamps to `MIN_VDOT`; faster than
    /// every point clamps to `MAX_VDOT`.
    pub fn estimate(&self, mile_pace: Pace) -> u8 {
        if let Some(&(_, fastest)) = self.points.last() {
            if mile_pace < fastest {
                return MAX_VDOT;
            }
        }

        self.points
            .iter()
            .rev()
            .find(|(_, reference)| *reference >= mile_pace)
            .map(|(vdot, _)| *vdot)
            .unwrap_or(MIN_VDOT)
    }

    /// Estimate from the "minutes.seconds" encoding, e.g. `7.49`
    pub fn estimate_encoded(&self, mile_pace: f64) -> LibResult<u8> {
        Ok(self.estimate(Pace::from_encoded(mile_pace)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn estimator() -> VdotEstimator {
        VdotEstimator::builtin().unwrap()
    }

    #[test]
    fn test_exact_reference_point() {
        assert_eq!(estimator().estimate_encoded(7.49).unwrap(), 36);
        assert_eq!(estimator().estimate_encoded(7.38).unwrap(), 37);
    }

    #[test]
    fn test_between_points_takes_lower_vdot() {
        // 7:40 lies between 7:38 (37) and 7:49 (36)
        assert_eq!(estimator().estimate_encoded(7.40).unwrap(), 36);
    }

    #[test]
    fn test_slower_than_table_clamps_to_min() {
        assert_eq!(estimator().estimate_encoded(20.00).unwrap(), MIN_VDOT);
        assert_eq!(estimator().estimate(Pace::from_seconds(3600)), 20);
    }

    #[test]
    fn test_faster_than_table_clamps_to_max() {
        assert_eq!(estimator().estimate_encoded(3.00).unwrap(), MAX_VDOT);
        assert_eq!(estimator().estimate(Pace::from_seconds(1)), 85);
    }

    #[test]
    fn test_malformed_encoded_pace() {
        assert!(estimator().estimate_encoded(7.75).is_err());
    }

    #[test]
    fn test_unsorted_rows_are_sorted() {
        let estimator = VdotEstimator::from_rows(vec![
            MileReferenceRow {
                vdot: 37,
                mile_pace: "7:38".into(),
            },
            MileReferenceRow {
                vdot: 36,
                mile_pace: "7:49".into(),
            },
        ])
        .unwrap();
        assert_eq!(estimator.estimate(Pace::from_seconds(465)), 36);
        assert_eq!(estimator.estimate(Pace::from_seconds(400)), 85);
        assert_eq!(estimator.estimate(Pace::from_seconds(500)), 20);
    }

    #[test]
    fn test_non_monotonic_reference_rejected() {
        let result = VdotEstimator::from_rows(vec![
            MileReferenceRow {
                vdot: 36,
                mile_pace: "7:38".into(),
            },
            MileReferenceRow {
                vdot: 37,
                mile_pace: "7:49".into(),
            },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_reference_rejected() {
        let err = VdotEstimator::from_rows(Vec::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REFERENCE);
    }

    proptest! {
        #[test]
        fn test_estimate_is_monotonic(a in 60u32..1200, b in 60u32..1200) {
            let estimator = estimator();
            let (slow, fast) = if a >= b { (a, b) } else { (b, a) };
            let slow_vdot = estimator.estimate(Pace::from_seconds(slow));
            let fast_vdot = estimator.estimate(Pace::from_seconds(fast));
            prop_assert!(slow_vdot <= fast_vdot);
            prop_assert!((MIN_VDOT..=MAX_VDOT).contains(&slow_vdot));
        }
    }
}
