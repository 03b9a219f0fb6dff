//! Core trait definitions for plan and counter storage

use async_trait::async_trait;
use std::time::Duration;

use super::error::StorageResult;
use crate::plan::Pacemaker;

/// Repository for the pacemaker aggregate.
///
/// `save` writes the record and all of its segments as one unit: readers see
/// either the previous version or the new one, never a mix.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Insert or replace a plan
    async fn save(&self, plan: &Pacemaker) -> StorageResult<()>;

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Pacemaker>>;

    /// Delete every plan attached to one of `running_ids`, returning how many went
    async fn delete_by_running_ids(&self, running_ids: &[String]) -> StorageResult<usize>;
}

/// Expiring integer counters with atomic bounded updates
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` unless it already holds `limit` or more.
    ///
    /// Returns the new value, or `None` when the limit was reached and nothing
    /// changed. A newly created key expires after `ttl`. Check and increment
    /// happen as one atomic step.
    async fn increment_within(
        &self,
        key: &str,
        limit: u32,
        ttl: Duration,
    ) -> StorageResult<Option<i64>>;

    /// Decrement `key`, deleting it when the result is zero or below.
    ///
    /// Returns the decremented value, even when the key was removed.
    async fn decrement_or_delete(&self, key: &str) -> StorageResult<i64>;

    /// Current value, `None` when absent or expired
    async fn get(&self, key: &str) -> StorageResult<Option<i64>>;
}
