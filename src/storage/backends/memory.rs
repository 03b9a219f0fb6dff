//! In-memory storage backend
//!
//! Serves as the default backend for single-process use and for tests.
//! Expired counters are dropped whenever any counter is incremented.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::plan::Pacemaker;
use crate::storage::{
    error::StorageResult,
    traits::{CounterStore, PlanStore},
};

#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Instant,
}

impl Counter {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    plans: Arc<RwLock<HashMap<String, Pacemaker>>>,
    counters: Arc<RwLock<HashMap<String, Counter>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn plan_count(&self) -> usize {
        self.plans.read().await.len()
    }
}

#[async_trait]
impl PlanStore for MemoryBackend {
    async fn save(&self, plan: &Pacemaker) -> StorageResult<()> {
        self.plans
            .write()
            .await
            .insert(plan.id.clone(), plan.clone());
        debug!("Saved pacemaker {} ({})", plan.id, plan.processing_status);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Pacemaker>> {
        Ok(self.plans.read().await.get(id).cloned())
    }

    async fn delete_by_running_ids(&self, running_ids: &[String]) -> StorageResult<usize> {
        let mut plans = self.plans.write().await;
        let before = plans.len();
        plans.retain(|_, plan| {
            plan.running_id
                .as_ref()
                .map_or(true, |running_id| !running_ids.contains(running_id))
        });
        Ok(before - plans.len())
    }
}

#[async_trait]
impl CounterStore for MemoryBackend {
    async fn increment_within(
        &self,
        key: &str,
        limit: u32,
        ttl: Duration,
    ) -> StorageResult<Option<i64>> {
        let now = Instant::now();
        let mut counters = self.counters.write().await;
        counters.retain(|_, counter| !counter.is_expired(now));

        let current = counters.get(key).copied();

        match current {
            Some(counter) if counter.value >= i64::from(limit) => Ok(None),
            Some(counter) => {
                let value = counter.value + 1;
                counters.insert(key.to_string(), Counter { value, ..counter });
                Ok(Some(value))
            }
            None if limit == 0 => Ok(None),
            None => {
                counters.insert(
                    key.to_string(),
                    Counter {
                        value: 1,
                        expires_at: now + ttl,
                    },
                );
                Ok(Some(1))
            }
        }
    }

    async fn decrement_or_delete(&self, key: &str) -> StorageResult<i64> {
        let now = Instant::now();
        let mut counters = self.counters.write().await;

        let value = match counters.get_mut(key) {
            Some(counter) if !counter.is_expired(now) => {
                counter.value -= 1;
                counter.value
            }
            _ => -1,
        };

        if value <= 0 {
            counters.remove(key);
        }
        Ok(value)
    }

    async fn get(&self, key: &str) -> StorageResult<Option<i64>> {
        let now = Instant::now();
        Ok(self
            .counters
            .read()
            .await
            .get(key)
            .filter(|counter| !counter.is_expired(now))
            .map(|counter| counter.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pace::RunningType;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[tokio::test]
    async fn test_plan_round_trip() {
        let backend = MemoryBackend::new();
        let plan = Pacemaker::new("runner-1", Some("run-1".into()), RunningType::Easy, 5.0);

        backend.save(&plan).await.unwrap();
        let found = backend.find_by_id(&plan.id).await.unwrap();
        assert_eq!(found, Some(plan));
        assert_eq!(backend.find_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_by_running_ids() {
        let backend = MemoryBackend::new();
        let attached = Pacemaker::new("runner-1", Some("run-1".into()), RunningType::Easy, 5.0);
        let other = Pacemaker::new("runner-1", Some("run-2".into()), RunningType::Easy, 5.0);
        let detached = Pacemaker::new("runner-1", None, RunningType::Easy, 5.0);
        for plan in [&attached, &other, &detached] {
            backend.save(plan).await.unwrap();
        }

        let removed = backend
            .delete_by_running_ids(&["run-1".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(backend.find_by_id(&attached.id).await.unwrap().is_none());
        assert_eq!(backend.plan_count().await, 2);
    }

    #[tokio::test]
    async fn test_counter_stops_at_limit() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.increment_within("k", 2, DAY).await.unwrap(), Some(1));
        assert_eq!(backend.increment_within("k", 2, DAY).await.unwrap(), Some(2));
        assert_eq!(backend.increment_within("k", 2, DAY).await.unwrap(), None);
        assert_eq!(backend.get("k").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_decrement_deletes_at_zero() {
        let backend = MemoryBackend::new();
        backend.increment_within("k", 3, DAY).await.unwrap();
        backend.increment_within("k", 3, DAY).await.unwrap();

        assert_eq!(backend.decrement_or_delete("k").await.unwrap(), 1);
        assert_eq!(backend.get("k").await.unwrap(), Some(1));
        assert_eq!(backend.decrement_or_delete("k").await.unwrap(), 0);
        assert_eq!(backend.get("k").await.unwrap(), None);
        assert_eq!(backend.decrement_or_delete("k").await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_counter_expires() {
        let backend = MemoryBackend::new();
        let ttl = Duration::from_millis(20);
        backend.increment_within("k", 1, ttl).await.unwrap();
        assert_eq!(backend.increment_within("k", 1, ttl).await.unwrap(), None);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(backend.get("k").await.unwrap(), None);
        assert_eq!(backend.increment_within("k", 1, ttl).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_increment_purges_expired_days() {
        let backend = MemoryBackend::new();
        let short = Duration::from_millis(20);
        backend.increment_within("runner:2024-05-01", 3, short).await.unwrap();
        backend.increment_within("runner:2024-05-02", 3, short).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        backend.increment_within("runner:2024-05-03", 3, DAY).await.unwrap();

        let counters = backend.counters.read().await;
        assert_eq!(counters.len(), 1);
        assert!(counters.contains_key("runner:2024-05-03"));
    }
}
