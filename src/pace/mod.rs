//! Running paces and the VDOT fitness index
//!
//! Paces are held as whole seconds. The historical "minutes.seconds" encoding
//! (`7.49` meaning 7 min 49 s) only appears at parsing and serialization
//! boundaries, never in arithmetic.
//!
//! - `table` - VDOT x running type pace lookup built from the static dataset
//! - `vdot` - one-mile pace to VDOT estimation

pub mod table;
pub mod vdot;

pub use table::{PaceTable, TrainingPaces};
pub use vdot::VdotEstimator;

use crate::error::{ErrorCode, LibResult, PacemakerError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Lowest VDOT the engine understands
pub const MIN_VDOT: u8 = 20;
/// Highest VDOT the engine understands
pub const MAX_VDOT: u8 = 85;

/// Check that a VDOT lies in the supported range
pub fn validate_vdot(vdot: u8) -> LibResult<u8> {
    if (MIN_VDOT..=MAX_VDOT).contains(&vdot) {
        Ok(vdot)
    } else {
        Err(PacemakerError::validation_with_code(
            ErrorCode::VALIDATION_OUT_OF_RANGE,
            format!("VDOT {} outside [{}, {}]", vdot, MIN_VDOT, MAX_VDOT),
            Some("vdot".to_string()),
        ))
    }
}

/// Training intensity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunningType {
    #[serde(rename = "E")]
    Easy,
    #[serde(rename = "M")]
    Marathon,
    #[serde(rename = "T")]
    Threshold,
    #[serde(rename = "I")]
    Interval,
    #[serde(rename = "R")]
    Repetition,
}

impl RunningType {
    pub const ALL: [RunningType; 5] = [
        RunningType::Easy,
        RunningType::Marathon,
        RunningType::Threshold,
        RunningType::Interval,
        RunningType::Repetition,
    ];

    /// Single-letter code used in catalog data
    pub fn code(self) -> &'static str {
        match self {
            RunningType::Easy => "E",
            RunningType::Marathon => "M",
            RunningType::Threshold => "T",
            RunningType::Interval => "I",
            RunningType::Repetition => "R",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RunningType::Easy => "Easy",
            RunningType::Marathon => "Marathon",
            RunningType::Threshold => "Threshold",
            RunningType::Interval => "Interval",
            RunningType::Repetition => "Repetition",
        }
    }

    /// Interval and repetition workouts are authored as a repeated block
    pub fn is_repetition_based(self) -> bool {
        matches!(self, RunningType::Interval | RunningType::Repetition)
    }
}

impl fmt::Display for RunningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RunningType {
    type Err = PacemakerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "e" | "easy" => Ok(RunningType::Easy),
            "m" | "marathon" => Ok(RunningType::Marathon),
            "t" | "threshold" => Ok(RunningType::Threshold),
            "i" | "interval" => Ok(RunningType::Interval),
            "r" | "repetition" => Ok(RunningType::Repetition),
            other => Err(PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_GENERIC,
                format!("unknown running type '{}'", other),
                Some("type".to_string()),
            )),
        }
    }
}

/// A pace in whole seconds per unit distance (per km or per mile, by context)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pace {
    seconds: u32,
}

impl Pace {
    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub fn seconds(self) -> u32 {
        self.seconds
    }

    /// Decimal minutes (5:30 is 5.5)
    pub fn minutes(self) -> f64 {
        f64::from(self.seconds) / 60.0
    }

    /// Parse a clock-style "mm:ss" value
    pub fn from_clock(text: &str) -> LibResult<Self> {
        let malformed = || {
            PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_MALFORMED_PACE,
                format!("'{}' is not an mm:ss pace", text),
                Some("pace".to_string()),
            )
        };

        let (minutes, seconds) = text.trim().split_once(':').ok_or_else(malformed)?;
        let minutes: u32 = minutes.trim().parse().map_err(|_| malformed())?;
        let seconds: u32 = seconds.trim().parse().map_err(|_| malformed())?;
        if seconds >= 60 {
            return Err(malformed());
        }

        minutes
            .checked_mul(60)
            .and_then(|total| total.checked_add(seconds))
            .map(Self::from_seconds)
            .ok_or_else(malformed)
    }

    /// Decode the "minutes.seconds" encoding (`7.49` is 7 min 49 s)
    pub fn from_encoded(value: f64) -> LibResult<Self> {
        let malformed = || {
            PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_MALFORMED_PACE,
                format!("{} is not a minutes.seconds pace", value),
                Some("pace".to_string()),
            )
        };

        if !value.is_finite() || value < 0.0 {
            return Err(malformed());
        }

        let hundredths = (value * 100.0).round();
        if hundredths > f64::from(u32::MAX) {
            return Err(malformed());
        }
        let hundredths = hundredths as u32;
        let (minutes, seconds) = (hundredths / 100, hundredths % 100);
        if seconds >= 60 {
            return Err(malformed());
        }

        minutes
            .checked_mul(60)
            .and_then(|total| total.checked_add(seconds))
            .map(Self::from_seconds)
            .ok_or_else(malformed)
    }

    /// Encode as "minutes.seconds" (330 s is 5.30, 305 s is 5.05)
    pub fn encoded(self) -> f64 {
        let seconds = u64::from(self.seconds);
        (seconds / 60 * 100 + seconds % 60) as f64 / 100.0
    }

    /// Clock rendering, e.g. "5:05"
    pub fn clock(self) -> String {
        format!("{}:{:02}", self.seconds / 60, self.seconds % 60)
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.seconds / 60, self.seconds % 60)
    }
}

impl FromStr for Pace {
    type Err = PacemakerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.contains(':') {
            return Self::from_clock(trimmed);
        }
        let value: f64 = trimmed.parse().map_err(|_| {
            PacemakerError::validation_with_code(
                ErrorCode::VALIDATION_MALFORMED_PACE,
                format!("'{}' is not a pace", s),
                Some("pace".to_string()),
            )
        })?;
        Self::from_encoded(value)
    }
}

impl Serialize for Pace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.encoded())
    }
}

impl<'de> Deserialize<'de> for Pace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Encoded(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Encoded(value) => Pace::from_encoded(value).map_err(serde::de::Error::custom),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_pads_seconds() {
        assert_eq!(Pace::from_seconds(330).to_string(), "5.30");
        assert_eq!(Pace::from_seconds(305).to_string(), "5.05");
        assert_eq!(Pace::from_seconds(360).to_string(), "6.00");
    }

    #[test]
    fn test_encoded_value_is_not_decimal_minutes() {
        let pace = Pace::from_seconds(330);
        assert!((pace.encoded() - 5.30).abs() < 1e-9);
        assert!((pace.minutes() - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_from_encoded() {
        assert_eq!(Pace::from_encoded(7.49).unwrap().seconds(), 469);
        assert_eq!(Pace::from_encoded(7.40).unwrap().seconds(), 460);
        assert_eq!(Pace::from_encoded(6.0).unwrap().seconds(), 360);
        assert_eq!(Pace::from_encoded(5.05).unwrap().seconds(), 305);
    }

    #[test]
    fn test_from_encoded_rejects_sixty_seconds() {
        let err = Pace::from_encoded(7.60).unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_MALFORMED_PACE);
        assert!(Pace::from_encoded(-1.0).is_err());
        assert!(Pace::from_encoded(f64::NAN).is_err());
    }

    #[test]
    fn test_from_clock() {
        assert_eq!(Pace::from_clock("5:30").unwrap().seconds(), 330);
        assert_eq!(Pace::from_clock(" 13:09 ").unwrap().seconds(), 789);
        assert!(Pace::from_clock("5:75").is_err());
        assert!(Pace::from_clock("530").is_err());
        assert!(Pace::from_clock("a:30").is_err());
    }

    #[test]
    fn test_oversized_pace_is_malformed() {
        let err = Pace::from_clock("99999999:00").unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_MALFORMED_PACE);
        let err = "99999999:00".parse::<Pace>().unwrap_err();
        assert_eq!(err.code(), ErrorCode::VALIDATION_MALFORMED_PACE);
        assert!(Pace::from_encoded(1e12).is_err());

        // The largest representable pace still encodes
        let slowest = Pace::from_clock("71582788:15").unwrap();
        assert_eq!(slowest.seconds(), u32::MAX);
        assert!((slowest.encoded() - 71_582_788.15).abs() < 1e-3);
    }

    #[test]
    fn test_from_str_accepts_both_forms() {
        assert_eq!("7:49".parse::<Pace>().unwrap(), Pace::from_seconds(469));
        assert_eq!("7.49".parse::<Pace>().unwrap(), Pace::from_seconds(469));
        assert!("fast".parse::<Pace>().is_err());
    }

    #[test]
    fn test_serde_uses_encoded_number() {
        let json = serde_json::to_string(&Pace::from_seconds(305)).unwrap();
        assert_eq!(json, "5.05");

        let pace: Pace = serde_json::from_str("5.3").unwrap();
        assert_eq!(pace.seconds(), 330);
        let pace: Pace = serde_json::from_str("\"4:59\"").unwrap();
        assert_eq!(pace.seconds(), 299);
    }

    #[test]
    fn test_running_type_parsing() {
        assert_eq!("T".parse::<RunningType>().unwrap(), RunningType::Threshold);
        assert_eq!(
            "repetition".parse::<RunningType>().unwrap(),
            RunningType::Repetition
        );
        assert!("X".parse::<RunningType>().is_err());
        assert!(RunningType::Interval.is_repetition_based());
        assert!(!RunningType::Threshold.is_repetition_based());
    }

    #[test]
    fn test_validate_vdot_bounds() {
        assert!(validate_vdot(20).is_ok());
        assert!(validate_vdot(85).is_ok());
        assert!(validate_vdot(19).is_err());
        assert!(validate_vdot(86).is_err());
    }
}
