//! Engine configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! `PACEMAKER_*` environment variables (plus `ANTHROPIC_API_KEY`). Durations
//! use humantime notation such as `"30s"` or `"24h"`.

use crate::error::{ErrorCode, LibResult, PacemakerError};
use crate::pace::{PaceTable, VdotEstimator};
use crate::storage::StorageConfig;
use crate::workout::WorkoutCatalog;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub plan: PlanConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Plan requests allowed per runner per calendar day
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(with = "humantime_serde", default = "default_quota_ttl")]
    pub ttl: Duration,
    /// Fixed offset from UTC that defines the calendar day
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            ttl: default_quota_ttl(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl QuotaConfig {
    pub fn offset(&self) -> LibResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("UTC offset {}h is out of range", self.utc_offset_hours),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub adjust_model: String,
    #[serde(default = "default_model")]
    pub narrate_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound for each stage, including any client retries
    #[serde(with = "humantime_serde", default = "default_stage_timeout")]
    pub stage_timeout: Duration,
    /// Client-level retries on rate limits and transport errors
    #[serde(default)]
    pub max_retries: u32,
    #[serde(with = "humantime_serde", default = "default_retry_delay")]
    pub retry_delay: Duration,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            adjust_model: default_model(),
            narrate_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            stage_timeout: default_stage_timeout(),
            max_retries: 0,
            retry_delay: default_retry_delay(),
        }
    }
}

/// Reference data locations; unset entries use the embedded datasets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub pace_table: Option<PathBuf>,
    #[serde(default)]
    pub mile_reference: Option<PathBuf>,
    #[serde(default)]
    pub workouts: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn load_pace_table(&self) -> LibResult<PaceTable> {
        match &self.pace_table {
            Some(path) => PaceTable::from_path(path),
            None => PaceTable::builtin(),
        }
    }

    pub fn load_estimator(&self) -> LibResult<VdotEstimator> {
        match &self.mile_reference {
            Some(path) => VdotEstimator::from_path(path),
            None => VdotEstimator::builtin(),
        }
    }

    pub fn load_workouts(&self) -> LibResult<WorkoutCatalog> {
        match &self.workouts {
            Some(path) => WorkoutCatalog::from_path(path),
            None => WorkoutCatalog::builtin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// How far the adjusted plan may end from the goal distance
    #[serde(default = "default_distance_tolerance_km")]
    pub distance_tolerance_km: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            distance_tolerance_km: default_distance_tolerance_km(),
        }
    }
}

impl EngineConfig {
    /// Load from an optional file, apply process environment overrides, validate
    pub fn load(path: Option<&Path>) -> LibResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> LibResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("cannot read config {}", path.display()),
            )
            .with_source(e)
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> LibResult<Self> {
        toml::from_str(content).map_err(|e| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_INVALID_TOML,
                format!("invalid configuration: {}", e),
            )
        })
    }

    /// Apply overrides read through `lookup`, typically the process environment
    pub fn apply_env<F>(&mut self, lookup: F) -> LibResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PACEMAKER_DAILY_LIMIT") {
            self.quota.daily_limit = parse_var("PACEMAKER_DAILY_LIMIT", &value)?;
        }
        if let Some(value) = lookup("PACEMAKER_UTC_OFFSET_HOURS") {
            self.quota.utc_offset_hours = parse_var("PACEMAKER_UTC_OFFSET_HOURS", &value)?;
        }
        if let Some(value) = lookup("PACEMAKER_STAGE_TIMEOUT") {
            self.reasoning.stage_timeout = parse_duration("PACEMAKER_STAGE_TIMEOUT", &value)?;
        }
        if let Some(value) = lookup("PACEMAKER_ADJUST_MODEL") {
            self.reasoning.adjust_model = value;
        }
        if let Some(value) = lookup("PACEMAKER_NARRATE_MODEL") {
            self.reasoning.narrate_model = value;
        }
        if let Some(key) = lookup("PACEMAKER_API_KEY").or_else(|| lookup("ANTHROPIC_API_KEY")) {
            self.reasoning.api_key = Some(key);
        }
        if let Some(value) = lookup("PACEMAKER_DISTANCE_TOLERANCE_KM") {
            self.plan.distance_tolerance_km =
                parse_var("PACEMAKER_DISTANCE_TOLERANCE_KM", &value)?;
        }

        self.storage.apply_env(&lookup).map_err(|e| {
            PacemakerError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, e.to_string())
        })?;
        Ok(())
    }

    pub fn validate(&self) -> LibResult<()> {
        let invalid =
            |message: String| PacemakerError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, message);

        if self.quota.daily_limit == 0 {
            return Err(invalid("quota.daily_limit must be at least 1".into()));
        }
        if self.quota.ttl.is_zero() {
            return Err(invalid("quota.ttl must be positive".into()));
        }
        if !(-14..=14).contains(&self.quota.utc_offset_hours) {
            return Err(invalid(format!(
                "quota.utc_offset_hours {} is outside [-14, 14]",
                self.quota.utc_offset_hours
            )));
        }
        if self.reasoning.stage_timeout.is_zero() {
            return Err(invalid("reasoning.stage_timeout must be positive".into()));
        }
        if self.reasoning.max_tokens == 0 {
            return Err(invalid("reasoning.max_tokens must be positive".into()));
        }
        let tolerance = self.plan.distance_tolerance_km;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(invalid(format!(
                "plan.distance_tolerance_km {} must be positive",
                tolerance
            )));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> LibResult<T> {
    value.trim().parse().map_err(|_| {
        PacemakerError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("{}='{}' is not valid", name, value),
        )
    })
}

fn parse_duration(name: &str, value: &str) -> LibResult<Duration> {
    humantime_serde::re::humantime::parse_duration(value.trim()).map_err(|e| {
        PacemakerError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("{}='{}' is not a duration: {}", name, value, e),
        )
    })
}

fn default_daily_limit() -> u32 {
    3
}

fn default_quota_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_utc_offset_hours() -> i32 {
    9
}

fn default_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-latest".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.4
}

fn default_stage_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_distance_tolerance_km() -> f64 {
    0.25
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BackendType;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.quota.daily_limit, 3);
        assert_eq!(config.quota.ttl, Duration::from_secs(86_400));
        assert_eq!(config.quota.offset().unwrap().local_minus_utc(), 9 * 3600);
        assert_eq!(config.reasoning.stage_timeout, Duration::from_secs(30));
        assert_eq!(config.reasoning.max_retries, 0);
        assert_eq!(config.plan.distance_tolerance_km, 0.25);
        assert_eq!(config.storage.backend, BackendType::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [quota]
            daily_limit = 5
            ttl = "12h"

            [reasoning]
            stage_timeout = "45s"
            narrate_model = "narrator"

            [storage]
            backend = "file"
            "#,
        )
        .unwrap();

        assert_eq!(config.quota.daily_limit, 5);
        assert_eq!(config.quota.ttl, Duration::from_secs(12 * 3600));
        assert_eq!(config.quota.utc_offset_hours, 9);
        assert_eq!(config.reasoning.stage_timeout, Duration::from_secs(45));
        assert_eq!(config.reasoning.narrate_model, "narrator");
        assert_eq!(config.reasoning.adjust_model, default_model());
        assert_eq!(config.storage.backend, BackendType::File);
    }

    #[test]
    fn test_invalid_toml_has_code() {
        let err = EngineConfig::from_toml_str("[quota\ndaily_limit = ").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EngineConfig::default();
        config
            .apply_env(env(&[
                ("PACEMAKER_DAILY_LIMIT", "10"),
                ("PACEMAKER_STAGE_TIMEOUT", "2m"),
                ("ANTHROPIC_API_KEY", "sk-test"),
                ("PACEMAKER_STORAGE_BACKEND", "file"),
            ]))
            .unwrap();

        assert_eq!(config.quota.daily_limit, 10);
        assert_eq!(config.reasoning.stage_timeout, Duration::from_secs(120));
        assert_eq!(config.reasoning.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.storage.backend, BackendType::File);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_env(env(&[("PACEMAKER_DAILY_LIMIT", "many")]))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    }

    #[test]
    fn test_validation() {
        let mut config = EngineConfig::default();
        config.quota.daily_limit = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.quota.utc_offset_hours = 15;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.plan.distance_tolerance_km = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.reasoning.stage_timeout = Duration::ZERO;
        assert!(config.validate().unwrap_err().is_fatal());
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let mut config = EngineConfig::default();
        config.reasoning.api_key = Some("secret".into());
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_builtin_catalogs_load() {
        let catalog = CatalogConfig::default();
        assert!(!catalog.load_pace_table().unwrap().is_empty());
        assert!(!catalog.load_workouts().unwrap().is_empty());
        assert_eq!(catalog.load_estimator().unwrap().estimate(crate::pace::Pace::from_seconds(469)), 36);
    }
}
