//! Bus consumer trait and message types.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BusError;

/// A message received from a log stream via a consumer group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    /// Broker-assigned ID, monotonic within the stream (spec §3.1).
    pub id: String,
    /// Raw message body — JSON-serialized entity.
    pub data: String,
    /// Stream this message was read from.
    pub stream: String,
    /// When the message was delivered to this consumer.
    pub delivered_at: DateTime<Utc>,
    /// Number of times this message has been delivered (1 on first read).
    pub delivery_count: u32,
}

/// Health status of a bus connection.
#[derive(Debug, Clone, Serialize)]
pub struct BusHealth {
    pub connected: bool,
    pub approximate_depth: Option<u64>,
    pub provider: String,
}

impl fmt::Display for BusHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BusHealth {{ connected: {}, depth: {:?}, provider: {} }}",
            self.connected, self.approximate_depth, self.provider
        )
    }
}

/// Trait for a consumer-group member reading a persistent log stream.
///
/// Implementations handle the specifics of blocking reads, acknowledgement,
/// and redelivery for a particular bus backend (Redis Streams today).
#[async_trait]
pub trait BusConsumer: Send + Sync {
    /// Block-read up to `max_messages` for this consumer within `group`,
    /// waiting up to the provider's configured block timeout. Returns an
    /// empty vec if nothing is available within that window.
    async fn poll_batch(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        max_messages: u32,
    ) -> Result<Vec<BusMessage>, BusError>;

    /// Acknowledge successful processing — retires the message from the
    /// group's pending-entries list.
    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), BusError>;

    /// Claim messages that have been pending longer than `min_idle_ms`
    /// without acknowledgement, making them available for redelivery to
    /// this consumer (spec §4.3 "visibility window").
    async fn claim_stale(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        min_idle_ms: u64,
        max_messages: u32,
    ) -> Result<Vec<BusMessage>, BusError>;

    /// Ensure the consumer group exists for `stream`, creating the stream if
    /// necessary. Idempotent.
    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), BusError>;

    /// Check connectivity and return health status.
    async fn health_check(&self, stream: &str) -> Result<BusHealth, BusError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_message_serde_roundtrip() {
        let msg = BusMessage {
            id: "1700000000000-0".to_string(),
            data: r#"{"symbol":"AAPL"}"#.to_string(),
            stream: "stocks".to_string(),
            delivered_at: Utc::now(),
            delivery_count: 1,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: BusMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg.id, back.id);
        assert_eq!(msg.data, back.data);
    }

    #[test]
    fn test_bus_health_display() {
        let health = BusHealth {
            connected: true,
            approximate_depth: Some(42),
            provider: "redis".to_string(),
        };
        let display = format!("{health}");
        assert!(display.contains("connected: true"));
        assert!(display.contains("42"));
    }
}
