//! Per-runner daily request quota
//!
//! A counter per runner and calendar day lives in a `CounterStore`. The day
//! is computed in a fixed UTC offset so every process agrees on when it
//! rolls over, independent of host timezone.

use crate::error::{LibResult, PacemakerError};
use crate::storage::CounterStore;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Returned by `try_acquire` when the limit has been reached
pub const QUOTA_EXCEEDED: i64 = -1;

/// Counter key for one runner on the calendar day containing `now`
pub fn daily_key(runner_id: &str, now: DateTime<Utc>, offset: FixedOffset) -> String {
    let day = offset.from_utc_datetime(&now.naive_utc()).format("%Y-%m-%d");
    format!("pacemaker:quota:{}:{}", runner_id, day)
}

#[derive(Clone)]
pub struct QuotaGuard {
    counters: Arc<dyn CounterStore>,
}

impl std::fmt::Debug for QuotaGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaGuard").finish_non_exhaustive()
    }
}

impl QuotaGuard {
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self { counters }
    }

    /// Take one unit of `key`'s daily allowance.
    ///
    /// Returns the count after the increment, or `QUOTA_EXCEEDED` with the
    /// stored value untouched once `daily_limit` units are in use.
    pub async fn try_acquire(&self, key: &str, daily_limit: u32, ttl: Duration) -> LibResult<i64> {
        match self.counters.increment_within(key, daily_limit, ttl).await? {
            Some(count) => {
                debug!("Quota {} acquired ({}/{})", key, count, daily_limit);
                Ok(count)
            }
            None => {
                info!("Quota {} exhausted at {}", key, daily_limit);
                Ok(QUOTA_EXCEEDED)
            }
        }
    }

    /// Like `try_acquire` but turns exhaustion into `QuotaExceeded`
    pub async fn acquire_for(
        &self,
        runner_id: &str,
        key: &str,
        daily_limit: u32,
        ttl: Duration,
    ) -> LibResult<i64> {
        match self.try_acquire(key, daily_limit, ttl).await? {
            QUOTA_EXCEEDED => Err(PacemakerError::QuotaExceeded {
                runner_id: runner_id.to_string(),
                limit: daily_limit,
            }),
            count => Ok(count),
        }
    }

    /// Give one unit back; the key is removed once nothing is in use
    pub async fn release(&self, key: &str) -> LibResult<i64> {
        let remaining = self.counters.decrement_or_delete(key).await?;
        if remaining < 0 {
            warn!("Released quota {} that held no units", key);
        } else {
            debug!("Quota {} released, {} in use", key, remaining.max(0));
        }
        Ok(remaining)
    }

    /// Units in use, zero when the key is absent
    pub async fn current(&self, key: &str) -> LibResult<i64> {
        Ok(self.counters.get(key).await?.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::storage::MemoryBackend;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn guard() -> QuotaGuard {
        QuotaGuard::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_daily_key_uses_fixed_offset() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        // 15:30 UTC is already the next day at +09:00
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 15, 30, 0).unwrap();
        assert_eq!(
            daily_key("runner-1", now, offset),
            "pacemaker:quota:runner-1:2024-03-10"
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            daily_key("runner-1", now, utc),
            "pacemaker:quota:runner-1:2024-03-09"
        );
    }

    #[tokio::test]
    async fn test_fourth_request_is_rejected() {
        let guard = guard();
        for expected in 1..=3 {
            assert_eq!(guard.try_acquire("k", 3, DAY).await.unwrap(), expected);
        }
        assert_eq!(guard.try_acquire("k", 3, DAY).await.unwrap(), QUOTA_EXCEEDED);
        assert_eq!(guard.current("k").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_release_at_one_deletes_key() {
        let guard = guard();
        guard.try_acquire("k", 3, DAY).await.unwrap();
        assert_eq!(guard.release("k").await.unwrap(), 0);
        assert_eq!(guard.current("k").await.unwrap(), 0);

        // A fresh window starts from one again
        assert_eq!(guard.try_acquire("k", 3, DAY).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_release_restores_allowance() {
        let guard = guard();
        for _ in 0..3 {
            guard.try_acquire("k", 3, DAY).await.unwrap();
        }
        guard.release("k").await.unwrap();
        assert_eq!(guard.try_acquire("k", 3, DAY).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_acquire_for_reports_runner() {
        let guard = guard();
        guard.acquire_for("runner-1", "k", 1, DAY).await.unwrap();
        let err = guard.acquire_for("runner-1", "k", 1, DAY).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::QUOTA_EXCEEDED);
        assert!(err.is_user_facing());
        assert!(err.to_string().contains("runner-1"));
    }
}
