//! Storage configuration types

use super::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Storage backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Process-local maps; plans and counters vanish on exit
    #[default]
    Memory,
    /// One JSON document per plan; counters stay in memory
    File,
    /// Shared Redis instance for plans and counters
    Redis,
}

impl FromStr for BackendType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(BackendType::Memory),
            "file" => Ok(BackendType::File),
            "redis" => Ok(BackendType::Redis),
            other => Err(StorageError::configuration(format!(
                "unknown storage backend '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendType,

    #[serde(default)]
    pub file: FileConfig,

    #[serde(default)]
    pub redis: RedisConfig,

    /// Upper bound for a single storage operation
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            file: FileConfig::default(),
            redis: RedisConfig::default(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Defaults to the platform data directory
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn resolve_base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "pacemaker")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| std::env::temp_dir().join("pacemaker"))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,

    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Prefix for plan keys; counter keys arrive already namespaced
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_pool_size(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl StorageConfig {
    /// Apply `PACEMAKER_STORAGE_*` and `PACEMAKER_REDIS_URL` overrides
    pub fn apply_env<F>(&mut self, lookup: F) -> StorageResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("PACEMAKER_STORAGE_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("PACEMAKER_STORAGE_DIR") {
            self.file.base_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = lookup("PACEMAKER_REDIS_URL") {
            self.redis.url = url;
        }
        Ok(())
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_pool_size() -> usize {
    16
}

fn default_key_prefix() -> String {
    "pacemaker:".to_string()
}
