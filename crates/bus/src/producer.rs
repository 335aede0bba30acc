//! Bus producer trait for appending to log streams and broadcasting.

use async_trait::async_trait;

use crate::error::BusError;

/// Trait for publishing onto the bus.
///
/// `publish_log` appends durable, replayable entries to a log stream
/// (consumed via [`crate::consumer::BusConsumer`]); `publish_broadcast`
/// sends a best-effort, non-durable notification to any subscribers
/// currently listening on a channel.
#[async_trait]
pub trait BusProducer: Send + Sync {
    /// Append `payload` to `stream`, trimming the stream to approximately
    /// `maxlen` entries (spec §3.1 bounded retention).
    async fn publish_log(&self, stream: &str, payload: &str, maxlen: usize) -> Result<String, BusError>;

    /// Publish `payload` to `channel`. Delivered only to consumers
    /// subscribed at the moment of publish; dropped silently otherwise.
    async fn publish_broadcast(&self, channel: &str, payload: &str) -> Result<(), BusError>;
}
