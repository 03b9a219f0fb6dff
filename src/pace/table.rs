//! VDOT x running type pace lookup
//!
//! The table is built once from `(vdot, type, paceSpec)` rows and never mutated
//! afterwards, so it is shared behind an `Arc` without locking.

use super::{validate_vdot, Pace, RunningType};
use crate::error::{ErrorCode, LibResult, PacemakerError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

const BUILTIN_PACE_TABLE: &str = include_str!("../../data/pace_table.json");

/// One row of the pace dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceRow {
    pub vdot: u8,
    #[serde(rename = "type")]
    pub running_type: RunningType,
    /// Either "mm:ss" or a range "mm:ss-mm:ss"
    pub pace_per_km: String,
}

/// Resolve a pace spec to a single per-km pace.
///
/// A range resolves to the mean of its endpoints, rounded up to the next whole
/// second.
pub fn parse_pace_spec(spec: &str) -> LibResult<Pace> {
    match spec.split_once('-') {
        Some((low, high)) => {
            let low = Pace::from_clock(low)?.seconds();
            let high = Pace::from_clock(high)?.seconds();
            let mean = (low + high).div_ceil(2);
            Ok(Pace::from_seconds(mean))
        }
        None => Pace::from_clock(spec),
    }
}

#[derive(Debug, Clone)]
pub struct PaceTable {
    entries: HashMap<(u8, RunningType), Pace>,
}

impl PaceTable {
    pub fn from_rows(rows: impl IntoIterator<Item = PaceRow>) -> LibResult<Self> {
        let mut entries = HashMap::new();

        for row in rows {
            let vdot = validate_vdot(row.vdot)?;
            let pace = parse_pace_spec(&row.pace_per_km)
                .map_err(|e| e.with_context(format!("vdot {} {}", vdot, row.running_type)))?;

            if entries.insert((vdot, row.running_type), pace).is_some() {
                return Err(PacemakerError::config_with_code(
                    ErrorCode::CONFIG_CATALOG_PARSE,
                    format!("duplicate pace row for vdot {} {}", vdot, row.running_type),
                ));
            }
        }

        debug!("Pace table loaded with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn from_json_str(json: &str) -> LibResult<Self> {
        let rows: Vec<PaceRow> = serde_json::from_str(json).map_err(|e| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_CATALOG_PARSE,
                format!("pace table is not valid JSON: {}", e),
            )
        })?;
        Self::from_rows(rows)
    }

    pub fn from_path(path: &Path) -> LibResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("cannot read pace table {}", path.display()),
            )
            .with_source(e)
        })?;
        Self::from_json_str(&json)
    }

    /// The dataset compiled into the binary
    pub fn builtin() -> LibResult<Self> {
        Self::from_json_str(BUILTIN_PACE_TABLE)
    }

    /// Look up a per-km pace. A miss means the reference data is incomplete.
    pub fn pace(&self, vdot: u8, running_type: RunningType) -> LibResult<Pace> {
        self.entries
            .get(&(vdot, running_type))
            .copied()
            .ok_or_else(|| {
                PacemakerError::config_with_code(
                    ErrorCode::CONFIG_MISSING_PACE,
                    format!("no pace for vdot {} type {}", vdot, running_type),
                )
            })
    }

    /// Every training pace for one VDOT
    pub fn paces_for(&self, vdot: u8) -> LibResult<TrainingPaces> {
        let paces = RunningType::ALL
            .iter()
            .map(|kind| self.pace(vdot, *kind).map(|pace| (*kind, pace)))
            .collect::<LibResult<BTreeMap<_, _>>>()?;
        Ok(TrainingPaces { vdot, paces })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The per-type paces of a single runner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingPaces {
    pub vdot: u8,
    pub paces: BTreeMap<RunningType, Pace>,
}

impl TrainingPaces {
    pub fn new(vdot: u8, paces: impl IntoIterator<Item = (RunningType, Pace)>) -> Self {
        Self {
            vdot,
            paces: paces.into_iter().collect(),
        }
    }

    pub fn pace(&self, running_type: RunningType) -> LibResult<Pace> {
        self.paces.get(&running_type).copied().ok_or_else(|| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_MISSING_PACE,
                format!("no {} pace for vdot {}", running_type, self.vdot),
            )
        })
    }
}
