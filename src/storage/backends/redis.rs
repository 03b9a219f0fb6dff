//! Redis storage backend implementation
//!
//! Plans are stored as one JSON value per key plus a set per running id that
//! indexes the plans attached to it. Counters are updated exclusively through
//! Lua scripts, so each acquire or release is a single server-side operation.

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use redis::{AsyncCommands, Script};
use std::time::Duration;
use tracing::{debug, info};

use crate::plan::Pacemaker;
use crate::storage::{
    config::RedisConfig,
    error::{StorageError, StorageResult},
    traits::{CounterStore, PlanStore},
};

/// Increment unless already at `ARGV[1]`; set the TTL (`ARGV[2]` seconds) on creation
const ACQUIRE_SCRIPT: &str = r#"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
if current >= tonumber(ARGV[1]) then
  return -1
end
local value = redis.call('INCR', KEYS[1])
if value == 1 then
  redis.call('EXPIRE', KEYS[1], ARGV[2])
end
return value
"#;

/// Decrement and drop the key once it reaches zero
const RELEASE_SCRIPT: &str = r#"
local value = redis.call('DECR', KEYS[1])
if value <= 0 then
  redis.call('DEL', KEYS[1])
end
return value
"#;

pub struct RedisBackend {
    pool: Pool,
    key_prefix: String,
    acquire: Script,
    release: Script,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisBackend {
    pub async fn new(config: &RedisConfig, timeout: Duration) -> StorageResult<Self> {
        info!("Initializing Redis backend");

        let mut pool_config = Config::from_url(&config.url);
        let mut pool = PoolConfig::new(config.pool_size);
        pool.timeouts.wait = Some(timeout);
        pool.timeouts.create = Some(timeout);
        pool.timeouts.recycle = Some(timeout);
        pool_config.pool = Some(pool);

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StorageError::connection(format!("Failed to create Redis pool: {}", e)))?;

        let backend = Self {
            pool,
            key_prefix: config.key_prefix.clone(),
            acquire: Script::new(ACQUIRE_SCRIPT),
            release: Script::new(RELEASE_SCRIPT),
        };

        // Fail at startup rather than on the first request
        let mut conn = backend.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StorageError::connection(format!("Failed to reach Redis: {}", e)))?;

        Ok(backend)
    }

    async fn connection(&self) -> StorageResult<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::unavailable(e.to_string()))
    }

    fn plan_key(&self, id: &str) -> String {
        plan_key(&self.key_prefix, id)
    }

    fn run_index_key(&self, running_id: &str) -> String {
        run_index_key(&self.key_prefix, running_id)
    }
}

fn plan_key(prefix: &str, id: &str) -> String {
    format!("{}plan:{}", prefix, id)
}

fn run_index_key(prefix: &str, running_id: &str) -> String {
    format!("{}run:{}:plans", prefix, running_id)
}

#[async_trait]
impl PlanStore for RedisBackend {
    async fn save(&self, plan: &Pacemaker) -> StorageResult<()> {
        let value = serde_json::to_string(plan)?;
        let mut conn = self.connection().await?;

        let mut pipe = redis::pipe();
        pipe.atomic().set(self.plan_key(&plan.id), value).ignore();
        if let Some(running_id) = &plan.running_id {
            pipe.sadd(self.run_index_key(running_id), &plan.id).ignore();
        }
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(StorageError::backend)?;

        debug!("Saved pacemaker {} to Redis", plan.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Pacemaker>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(self.plan_key(id))
            .await
            .map_err(StorageError::backend)?;

        value
            .map(|json| serde_json::from_str(&json).map_err(StorageError::from))
            .transpose()
    }

    async fn delete_by_running_ids(&self, running_ids: &[String]) -> StorageResult<usize> {
        let mut conn = self.connection().await?;
        let mut removed = 0;

        for running_id in running_ids {
            let index_key = self.run_index_key(running_id);
            let plan_ids: Vec<String> = conn
                .smembers(&index_key)
                .await
                .map_err(StorageError::backend)?;
            if plan_ids.is_empty() {
                continue;
            }

            let plan_keys: Vec<String> = plan_ids.iter().map(|id| self.plan_key(id)).collect();
            let (deleted, _): (usize, usize) = redis::pipe()
                .atomic()
                .del(plan_keys)
                .del(&index_key)
                .query_async(&mut conn)
                .await
                .map_err(StorageError::backend)?;
            removed += deleted;
        }

        debug!("Removed {} plans for {} runs", removed, running_ids.len());
        Ok(removed)
    }
}

#[async_trait]
impl CounterStore for RedisBackend {
    async fn increment_within(
        &self,
        key: &str,
        limit: u32,
        ttl: Duration,
    ) -> StorageResult<Option<i64>> {
        let mut conn = self.connection().await?;
        let value: i64 = self
            .acquire
            .key(key)
            .arg(limit)
            .arg(ttl.as_secs().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(StorageError::backend)?;

        Ok((value >= 0).then_some(value))
    }

    async fn decrement_or_delete(&self, key: &str) -> StorageResult<i64> {
        let mut conn = self.connection().await?;
        let value: i64 = self
            .release
            .key(key)
            .invoke_async(&mut conn)
            .await
            .map_err(StorageError::backend)?;
        Ok(value)
    }

    async fn get(&self, key: &str) -> StorageResult<Option<i64>> {
        let mut conn = self.connection().await?;
        let value: Option<i64> = conn.get(key).await.map_err(StorageError::backend)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(plan_key("pacemaker:", "abc"), "pacemaker:plan:abc");
        assert_eq!(
            run_index_key("pacemaker:", "run-7"),
            "pacemaker:run:run-7:plans"
        );
    }

    #[test]
    fn test_scripts_touch_a_single_key() {
        assert!(ACQUIRE_SCRIPT.contains("INCR"));
        assert!(!ACQUIRE_SCRIPT.contains("KEYS[2]"));
        assert!(RELEASE_SCRIPT.contains("DEL"));
    }
}
