//! Redis Streams bus backend.
//!
//! Log streams are implemented with `XADD`/`XREADGROUP`/`XACK`/`XCLAIM`;
//! broadcast channels use plain Redis pub/sub. One [`RedisBus`] instance
//! holds a `ConnectionManager`, which transparently reconnects on drop.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use crate::consumer::{BusConsumer, BusHealth, BusMessage};
use crate::error::BusError;
use crate::producer::BusProducer;

/// Field name under which the raw payload is stored in each stream entry.
const FIELD_PAYLOAD: &str = "payload";

/// Redis-backed bus implementation.
#[derive(Clone)]
pub struct RedisBus {
    conn: ConnectionManager,
}

impl RedisBus {
    /// Connect to Redis at `redis://host:port` and wrap it in a
    /// `ConnectionManager` for automatic reconnection.
    pub async fn connect(host: &str, port: u16) -> Result<Self, BusError> {
        let url = format!("redis://{host}:{port}");
        let client = redis::Client::open(url).map_err(BusError::from)?;
        let conn = client.get_connection_manager().await.map_err(BusError::from)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl BusConsumer for RedisBus {
    async fn poll_batch(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        max_messages: u32,
    ) -> Result<Vec<BusMessage>, BusError> {
        let mut conn = self.conn.clone();
        let opts = redis::streams::StreamReadOptions::default()
            .group(group, consumer)
            .count(max_messages as usize)
            .block(5_000);

        let reply: redis::streams::StreamReadReply = conn
            .xread_options(&[stream], &[">"], &opts)
            .await
            .map_err(BusError::from)?;

        Ok(reply_to_messages(reply))
    }

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), BusError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .xack(stream, group, &[id])
            .await
            .map_err(|e| BusError::Ack(e.to_string()))?;
        Ok(())
    }

    async fn claim_stale(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        min_idle_ms: u64,
        max_messages: u32,
    ) -> Result<Vec<BusMessage>, BusError> {
        let mut conn = self.conn.clone();

        let pending: redis::streams::StreamPendingCountReply = conn
            .xpending_count(stream, group, "-", "+", max_messages as usize)
            .await
            .map_err(BusError::from)?;

        let stale_ids: Vec<String> = pending
            .ids
            .into_iter()
            .filter(|p| p.time_since_delivered as u64 >= min_idle_ms)
            .map(|p| p.id)
            .collect();

        if stale_ids.is_empty() {
            return Ok(Vec::new());
        }

        let reply: redis::streams::StreamClaimReply = conn
            .xclaim(stream, group, consumer, min_idle_ms as usize, &stale_ids)
            .await
            .map_err(BusError::from)?;

        Ok(reply
            .ids
            .into_iter()
            .map(|entry| stream_id_to_message(stream, entry))
            .collect())
    }

    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), BusError> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = conn
            .xgroup_create_mkstream(stream, group, "0")
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("BUSYGROUP") => Ok(()),
            Err(e) => Err(BusError::from(e)),
        }
    }

    async fn health_check(&self, stream: &str) -> Result<BusHealth, BusError> {
        let mut conn = self.conn.clone();
        let pong: Result<String, redis::RedisError> = redis::cmd("PING").query_async(&mut conn).await;

        let connected = pong.is_ok();
        let depth: Option<u64> = conn.xlen(stream).await.ok();

        Ok(BusHealth {
            connected,
            approximate_depth: depth,
            provider: "redis".to_string(),
        })
    }
}

#[async_trait]
impl BusProducer for RedisBus {
    async fn publish_log(&self, stream: &str, payload: &str, maxlen: usize) -> Result<String, BusError> {
        let mut conn = self.conn.clone();
        let id: String = conn
            .xadd_maxlen(
                stream,
                redis::streams::StreamMaxlen::Approx(maxlen),
                "*",
                &[(FIELD_PAYLOAD, payload)],
            )
            .await
            .map_err(BusError::from)?;
        debug!(stream, id = %id, "published to log stream");
        Ok(id)
    }

    async fn publish_broadcast(&self, channel: &str, payload: &str) -> Result<(), BusError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.publish(channel, payload).await.map_err(BusError::from)?;
        Ok(())
    }
}

fn reply_to_messages(reply: redis::streams::StreamReadReply) -> Vec<BusMessage> {
    let mut out = Vec::new();
    for key in reply.keys {
        for entry in key.ids {
            out.push(stream_id_to_message(&key.key, entry));
        }
    }
    out
}

fn stream_id_to_message(stream: &str, entry: redis::streams::StreamId) -> BusMessage {
    let payload = entry
        .map
        .get(FIELD_PAYLOAD)
        .and_then(|v| match v {
            redis::Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
            redis::Value::SimpleString(s) => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_default();

    BusMessage {
        id: entry.id,
        data: payload,
        stream: stream.to_string(),
        delivered_at: chrono::Utc::now(),
        delivery_count: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_id_to_message_extracts_payload() {
        let mut map = std::collections::HashMap::new();
        map.insert(
            FIELD_PAYLOAD.to_string(),
            redis::Value::BulkString(b"hello".to_vec()),
        );
        let entry = redis::streams::StreamId {
            id: "1-0".to_string(),
            map,
        };
        let msg = stream_id_to_message("stocks", entry);
        assert_eq!(msg.data, "hello");
        assert_eq!(msg.stream, "stocks");
        assert_eq!(msg.id, "1-0");
    }
}
