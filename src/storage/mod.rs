//! Persistence for pacemaker plans and quota counters
//!
//! Two narrow traits cover everything the engine persists: `PlanStore` for
//! the plan aggregate and `CounterStore` for expiring atomic counters. The
//! memory backend implements both, the file backend stores plans only, and
//! the Redis backend (feature `redis`) implements both against a shared
//! server.

pub mod backends;
pub mod config;
pub mod error;
pub mod factory;
pub mod traits;

pub use backends::{FileBackend, MemoryBackend};
#[cfg(feature = "redis")]
pub use backends::RedisBackend;
pub use config::{BackendType, FileConfig, RedisConfig, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use factory::{Storage, StorageFactory};
pub use traits::{CounterStore, PlanStore};
