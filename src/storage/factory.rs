//! Storage factory for creating plan and counter stores

use std::sync::Arc;
use tracing::info;

use super::backends::{FileBackend, MemoryBackend};
#[cfg(feature = "redis")]
use super::backends::RedisBackend;
use super::config::{BackendType, StorageConfig};
use super::error::StorageResult;
use super::traits::{CounterStore, PlanStore};

/// The pair of stores the engine runs against
#[derive(Clone)]
pub struct Storage {
    pub plans: Arc<dyn PlanStore>,
    pub counters: Arc<dyn CounterStore>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn from_config(config: &StorageConfig) -> StorageResult<Storage> {
        info!("Using {:?} storage backend", config.backend);
        match config.backend {
            BackendType::Memory => Ok(Self::memory()),
            BackendType::File => {
                // Counters only matter within one process when plans live on disk
                let plans = FileBackend::new(config.file.resolve_base_dir()).await?;
                Ok(Storage {
                    plans: Arc::new(plans),
                    counters: Arc::new(MemoryBackend::new()),
                })
            }
            #[cfg(feature = "redis")]
            BackendType::Redis => {
                let backend = Arc::new(RedisBackend::new(&config.redis, config.timeout).await?);
                Ok(Storage {
                    plans: backend.clone(),
                    counters: backend,
                })
            }
            #[cfg(not(feature = "redis"))]
            BackendType::Redis => Err(super::error::StorageError::configuration(
                "Redis backend not enabled. Enable with --features redis",
            )),
        }
    }

    /// Both stores backed by one in-memory backend
    pub fn memory() -> Storage {
        let backend = Arc::new(MemoryBackend::new());
        Storage {
            plans: backend.clone(),
            counters: backend,
        }
    }
}
