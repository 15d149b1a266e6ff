//! Redis Streams dispatch channel.
//!
//! Each publish is one `XADD` entry carrying the JSON payload in a single
//! `payload` field. Workers read through a consumer group; an entry stays
//! in the group's pending list until `XACK`.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::{StreamMaxlen, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Client, RedisError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use visum_core::config::DispatchConfig;
use visum_core::error::{AppError, ErrorKind};
use visum_core::result::AppResult;
use visum_core::traits::dispatch::{Delivery, DispatchChannel, DispatchConsumer};

/// Stream entry field holding the message body.
const PAYLOAD_FIELD: &str = "payload";

/// How often an idle `receive` re-checks the stream.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Dispatch channel backed by one Redis Stream and one consumer group.
#[derive(Clone)]
pub struct RedisStreamChannel {
    conn: ConnectionManager,
    /// Stream key: `<exchange>:<routing_key>`.
    stream: String,
    /// Consumer group: the queue name.
    group: String,
    /// Approximate cap on stream length.
    max_len: usize,
}

impl std::fmt::Debug for RedisStreamChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStreamChannel")
            .field("stream", &self.stream)
            .field("group", &self.group)
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

impl RedisStreamChannel {
    /// Connect and make sure the stream and its consumer group exist.
    pub async fn connect(config: &DispatchConfig) -> AppResult<Self> {
        let client = Client::open(config.redis.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid Redis dispatch URL", e)
        })?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| map_redis_error("Failed to connect to Redis", e))?;

        let channel = Self {
            conn,
            stream: config.stream_name(),
            group: config.queue.clone(),
            max_len: usize::try_from(config.redis.max_len).unwrap_or(usize::MAX),
        };
        channel.ensure_group().await?;

        info!(stream = %channel.stream, group = %channel.group, "Dispatch channel ready");
        Ok(channel)
    }

    /// Stream key this channel publishes to.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Create the consumer group (and the stream) if missing. The group
    /// starts at the beginning of the stream so entries published before
    /// any worker started are still delivered.
    async fn ensure_group(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let created: Result<(), RedisError> = conn
            .xgroup_create_mkstream(&self.stream, &self.group, "0")
            .await;
        match created {
            Ok(()) => {
                info!(stream = %self.stream, group = %self.group, "Created consumer group");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(map_redis_error("XGROUP CREATE failed", e)),
        }
    }

    async fn read_group(
        &self,
        consumer: &str,
        max: usize,
        from_id: &str,
    ) -> AppResult<Vec<Delivery>> {
        let options = StreamReadOptions::default()
            .group(&self.group, consumer)
            .count(max);

        let mut conn = self.conn.clone();
        let reply: Option<StreamReadReply> = conn
            .xread_options(&[&self.stream], &[from_id], &options)
            .await
            .map_err(|e| map_redis_error("XREADGROUP failed", e))?;

        let redelivered = from_id != ">";
        let mut deliveries = Vec::new();
        for key in reply.map(|r| r.keys).unwrap_or_default() {
            for entry in key.ids {
                match entry.get::<String>(PAYLOAD_FIELD) {
                    Some(payload) => deliveries.push(Delivery {
                        id: entry.id,
                        payload,
                        redelivered,
                    }),
                    None => {
                        // Trimmed or foreign entry: nothing to process, drop it from the PEL.
                        warn!(id = %entry.id, stream = %self.stream, "Stream entry has no payload, acknowledging");
                        self.ack(&entry.id).await?;
                    }
                }
            }
        }
        Ok(deliveries)
    }
}

#[async_trait]
impl DispatchChannel for RedisStreamChannel {
    fn provider_type(&self) -> &str {
        "redis"
    }

    async fn publish(&self, payload: &str) -> AppResult<String> {
        let mut conn = self.conn.clone();
        let id: String = conn
            .xadd_maxlen(
                &self.stream,
                StreamMaxlen::Approx(self.max_len),
                "*",
                &[(PAYLOAD_FIELD, payload)],
            )
            .await
            .map_err(|e| map_redis_error("XADD failed", e))?;

        debug!(stream = %self.stream, id = %id, "Published dispatch message");
        Ok(id)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("PING failed", e))?;
        Ok(pong == "PONG")
    }
}

#[async_trait]
impl DispatchConsumer for RedisStreamChannel {
    async fn receive(
        &self,
        consumer: &str,
        max: usize,
        block: Duration,
    ) -> AppResult<Vec<Delivery>> {
        let deadline = Instant::now() + block;
        loop {
            let deliveries = self.read_group(consumer, max, ">").await?;
            let now = Instant::now();
            if !deliveries.is_empty() || now >= deadline {
                return Ok(deliveries);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn claim_pending(&self, consumer: &str, max: usize) -> AppResult<Vec<Delivery>> {
        self.read_group(consumer, max, "0").await
    }

    async fn ack(&self, delivery_id: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .xack(&self.stream, &self.group, &[delivery_id])
            .await
            .map_err(|e| map_redis_error("XACK failed", e))?;
        Ok(())
    }
}

/// Map a Redis error: connection-level failures become
/// [`ErrorKind::DispatchUnavailable`].
fn map_redis_error(context: &str, e: RedisError) -> AppError {
    let kind = if e.is_io_error()
        || e.is_connection_refusal()
        || e.is_connection_dropped()
        || e.is_timeout()
    {
        ErrorKind::DispatchUnavailable
    } else {
        ErrorKind::Dispatch
    };
    AppError::with_source(kind, format!("{context}: {e}"), e)
}
