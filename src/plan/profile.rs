//! Runner profiles and plan requests

use crate::error::{ErrorCode, LibResult, PacemakerError};
use crate::pace::{validate_vdot, Pace, RunningType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subjective condition on the day, ordinal 1 (very poor) to 5 (very good)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Condition {
    VeryPoor = 1,
    Poor = 2,
    Normal = 3,
    Good = 4,
    VeryGood = 5,
}

impl Condition {
    pub fn label(self) -> &'static str {
        match self {
            Condition::VeryPoor => "very-poor",
            Condition::Poor => "poor",
            Condition::Normal => "normal",
            Condition::Good => "good",
            Condition::VeryGood => "very-good",
        }
    }
}

impl TryFrom<u8> for Condition {
    type Error = PacemakerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Condition::VeryPoor),
            2 => Ok(Condition::Poor),
            3 => Ok(Condition::Normal),
            4 => Ok(Condition::Good),
            5 => Ok(Condition::VeryGood),
            other => Err(PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_INVALID_CONDITION,
                format!("condition {} is not between 1 and 5", other),
                Some("condition".to_string()),
            )),
        }
    }
}

impl From<Condition> for u8 {
    fn from(condition: Condition) -> Self {
        condition as u8
    }
}

impl FromStr for Condition {
    type Err = PacemakerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "very-poor" => Ok(Condition::VeryPoor),
            "poor" => Ok(Condition::Poor),
            "normal" => Ok(Condition::Normal),
            "good" => Ok(Condition::Good),
            "very-good" => Ok(Condition::VeryGood),
            other => {
                let ordinal: u8 = other.parse().map_err(|_| {
                    PacemakerError::validation_with_code(
                        ErrorCode::VALIDATION_INVALID_CONDITION,
                        format!("unknown condition '{}'", s),
                        Some("condition".to_string()),
                    )
                })?;
                Condition::try_from(ordinal)
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = PacemakerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Gender::Male),
            "f" | "female" => Ok(Gender::Female),
            "o" | "other" => Ok(Gender::Other),
            other => Err(PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_GENERIC,
                format!("unknown gender '{}'", other),
                Some("gender".to_string()),
            )),
        }
    }
}

/// Runner data the engine reads but never changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerProfile {
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub vdot: u8,
    pub condition: Condition,
}

impl RunnerProfile {
    pub fn validate(&self) -> LibResult<()> {
        validate_vdot(self.vdot)?;
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!("weight {} kg is not positive", self.weight_kg),
                Some("weightKg".to_string()),
            ));
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!("height {} cm is not positive", self.height_cm),
                Some("heightCm".to_string()),
            ));
        }
        Ok(())
    }
}

/// A runner's request for a pacemaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub runner_id: String,
    #[serde(default)]
    pub running_id: Option<String>,
    pub running_type: RunningType,
    pub goal_km: f64,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    /// A recent one-mile time; when present the VDOT is re-estimated from it
    #[serde(default)]
    pub recent_mile_pace: Option<Pace>,
}

impl PlanRequest {
    pub fn new(runner_id: impl Into<String>, running_type: RunningType, goal_km: f64) -> Self {
        Self {
            runner_id: runner_id.into(),
            running_id: None,
            running_type,
            goal_km,
            temperature_c: None,
            recent_mile_pace: None,
        }
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature_c = Some(celsius);
        self
    }

    pub fn with_running_id(mut self, running_id: impl Into<String>) -> Self {
        self.running_id = Some(running_id.into());
        self
    }

    pub fn with_recent_mile_pace(mut self, pace: Pace) -> Self {
        self.recent_mile_pace = Some(pace);
        self
    }

    pub fn validate(&self) -> LibResult<()> {
        let invalid = |message: String, field: &str| {
            PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_INVALID_REQUEST,
                message,
                Some(field.to_string()),
            )
        };

        if self.runner_id.trim().is_empty() {
            return Err(invalid("runner id is empty".into(), "runnerId"));
        }
        if !(self.goal_km.is_finite() && self.goal_km > 0.0 && self.goal_km <= 100.0) {
            return Err(invalid(
                format!("goal {} km must be within (0, 100]", self.goal_km),
                "goalKm",
            ));
        }
        if let Some(celsius) = self.temperature_c {
            if !(celsius.is_finite() && (-40.0..=60.0).contains(&celsius)) {
                return Err(invalid(
                    format!("temperature {} C is not plausible", celsius),
                    "temperatureC",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_ordinals() {
        assert_eq!(Condition::try_from(5).unwrap(), Condition::VeryGood);
        assert_eq!(u8::from(Condition::VeryPoor), 1);
        let err = Condition::try_from(6).unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_INVALID_CONDITION);
        assert!(Condition::try_from(0).is_err());
    }

    #[test]
    fn test_condition_from_names() {
        assert_eq!("very good".parse::<Condition>().unwrap(), Condition::VeryGood);
        assert_eq!("VERY_POOR".parse::<Condition>().unwrap(), Condition::VeryPoor);
        assert_eq!("3".parse::<Condition>().unwrap(), Condition::Normal);
        assert!("great".parse::<Condition>().is_err());
        assert!("9".parse::<Condition>().is_err());
    }

    #[test]
    fn test_condition_serde_is_ordinal() {
        assert_eq!(serde_json::to_string(&Condition::Good).unwrap(), "4");
        assert!(serde_json::from_str::<Condition>("7").is_err());
    }

    #[test]
    fn test_profile_validation() {
        let mut profile = RunnerProfile {
            age: 31,
            gender: Gender::Female,
            weight_kg: 55.0,
            height_cm: 165.0,
            vdot: 40,
            condition: Condition::Good,
        };
        assert!(profile.validate().is_ok());

        profile.vdot = 90;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_request_validation() {
        let request = PlanRequest::new("runner-1", RunningType::Threshold, 10.0).with_temperature(32.0);
        assert!(request.validate().is_ok());

        let request = PlanRequest::new("runner-1", RunningType::Threshold, 0.0);
        assert!(request.validate().unwrap_err().is_user_facing());

        let request = PlanRequest::new("", RunningType::Threshold, 5.0);
        assert!(request.validate().is_err());

        let request = PlanRequest::new("runner-1", RunningType::Easy, 5.0).with_temperature(80.0);
        assert!(request.validate().is_err());
    }
}
