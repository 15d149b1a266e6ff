//! Redis-backed job store: one hash per job.

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use tracing::debug;

use visum_core::error::AppError;
use visum_core::result::AppResult;
use visum_core::traits::store::{CasOutcome, JobStore, Record};

use super::client::{RedisClient, map_redis_error};

/// Check-and-merge executed server-side so that no writer can interleave
/// between reading the guard field and writing.
///
/// `ARGV` layout: guard field, number of expected values, the expected
/// values, then field/value pairs to merge.
const COMPARE_AND_PUT: &str = r"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if not current then
  return {-1, ''}
end
local n = tonumber(ARGV[2])
local allowed = false
for i = 3, 2 + n do
  if ARGV[i] == current then
    allowed = true
    break
  end
end
if not allowed then
  return {0, current}
end
if #ARGV > 2 + n then
  redis.call('HSET', KEYS[1], unpack(ARGV, 3 + n))
end
return {1, current}
";

/// Redis-backed job store.
#[derive(Debug, Clone)]
pub struct RedisJobStore {
    /// Redis client.
    client: RedisClient,
    /// Loaded once; invoked via `EVALSHA` with transparent `EVAL` fallback.
    cas_script: Script,
}

impl RedisJobStore {
    /// Create a new Redis job store.
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            cas_script: Script::new(COMPARE_AND_PUT),
        }
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    fn provider_type(&self) -> &str {
        "redis"
    }

    async fn put(&self, key: &str, fields: &Record) -> AppResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let full_key = self.client.prefixed_key(key);
        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let mut conn = self.client.conn_mut();
        let _: () = conn
            .hset_multiple(&full_key, items.as_slice())
            .await
            .map_err(|e| map_redis_error("HSET failed", e))?;

        debug!(key = %full_key, fields = items.len(), "Stored job fields");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Record> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        conn.hgetall(&full_key)
            .await
            .map_err(|e| map_redis_error("HGETALL failed", e))
    }

    async fn compare_and_put(
        &self,
        key: &str,
        guard_field: &str,
        expected: &[&str],
        fields: &Record,
    ) -> AppResult<CasOutcome> {
        let full_key = self.client.prefixed_key(key);

        let mut invocation = self.cas_script.key(&full_key);
        invocation.arg(guard_field).arg(expected.len());
        for value in expected {
            invocation.arg(*value);
        }
        for (field, value) in fields {
            invocation.arg(field).arg(value);
        }

        let mut conn = self.client.conn_mut();
        let (code, current): (i64, String) = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("compare-and-put script failed", e))?;

        match code {
            1 => Ok(CasOutcome::Applied),
            0 => Ok(CasOutcome::Rejected { current }),
            -1 => Ok(CasOutcome::Missing),
            other => Err(AppError::store(format!(
                "Unexpected compare-and-put reply code {other}"
            ))),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        conn.exists(&full_key)
            .await
            .map_err(|e| map_redis_error("EXISTS failed", e))
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("PING failed", e))?;
        Ok(pong == "PONG")
    }
}
