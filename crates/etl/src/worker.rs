//! Consumer-group worker loop (spec §4.5).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use quotron_bus::{BusConsumer, BusMessage, RedisBus};
use quotron_core::{MarketIndex, Quote};
use sqlx::PgPool;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Messages read per poll (small, spec §4.5 step 1).
const BATCH_SIZE: u32 = 10;
const CLAIM_MIN_IDLE_MS: u64 = 30_000;
const BACKOFF_ON_STORE_FAILURE: Duration = Duration::from_millis(500);

/// Per-source "bad message" counters (spec §4.5 step 4), keyed by the
/// stream the message originated from.
#[derive(Default)]
pub struct BadMessageCounters {
    counts: std::sync::Mutex<HashMap<String, u64>>,
}

impl BadMessageCounters {
    pub fn increment(&self, stream: &str) {
        let mut counts = self.counts.lock().unwrap();
        *counts.entry(stream.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, stream: &str) -> u64 {
        self.counts.lock().unwrap().get(stream).copied().unwrap_or(0)
    }
}

pub struct Worker {
    id: String,
    bus: Arc<RedisBus>,
    store: PgPool,
    group: String,
    bad_messages: Arc<BadMessageCounters>,
    processed: AtomicU64,
}

impl Worker {
    pub fn new(id: String, bus: Arc<RedisBus>, store: PgPool, group: String, bad_messages: Arc<BadMessageCounters>) -> Self {
        Self {
            id,
            bus,
            store,
            group,
            bad_messages,
            processed: AtomicU64::new(0),
        }
    }

    /// Run the consume loop for a single stream until cancelled.
    pub async fn run(&self, stream: &str) {
        if let Err(e) = self.bus.ensure_group(stream, &self.group).await {
            warn!(stream, error = %e, "failed to ensure consumer group");
            return;
        }

        loop {
            self.run_batch(stream).await;
        }
    }

    #[instrument(skip(self), fields(stream, worker_id = %self.id))]
    async fn run_batch(&self, stream: &str) {
        let claimed = self
            .bus
            .claim_stale(stream, &self.group, &self.id, CLAIM_MIN_IDLE_MS, BATCH_SIZE)
            .await
            .unwrap_or_default();
        for message in claimed {
            self.handle(stream, message).await;
        }

        let messages = match self.bus.poll_batch(stream, &self.group, &self.id, BATCH_SIZE).await {
            Ok(m) => m,
            Err(e) => {
                warn!(stream, worker = %self.id, error = %e, "poll failed");
                sleep(BACKOFF_ON_STORE_FAILURE).await;
                return;
            }
        };

        for message in messages {
            self.handle(stream, message).await;
        }
    }

    #[instrument(skip(self, message), fields(stream, worker_id = %self.id, message_id = %message.id))]
    async fn handle(&self, stream: &str, message: BusMessage) {
        match stream {
            "crypto" | "stocks" => self.handle_quote(stream, message).await,
            "indices" => self.handle_index(stream, message).await,
            other => {
                warn!(stream = other, "unknown stream — acking to drop");
                let _ = self.bus.ack(stream, &self.group, &message.id).await;
            }
        }
    }

    async fn handle_quote(&self, stream: &str, message: BusMessage) {
        let quote: Quote = match serde_json::from_str(&message.data) {
            Ok(q) => q,
            Err(e) => {
                debug!(stream, error = %e, "malformed message — acking to drop");
                self.bad_messages.increment(stream);
                let _ = self.bus.ack(stream, &self.group, &message.id).await;
                return;
            }
        };

        if let Err(e) = quotron_core::validation::validate_quote(&quote) {
            debug!(stream, symbol = %quote.symbol, error = %e, "validation failed — acking to drop");
            self.bad_messages.increment(stream);
            let _ = self.bus.ack(stream, &self.group, &message.id).await;
            return;
        }

        match quotron_store::quotes::insert_quote(&self.store, &quote).await {
            Ok(()) => {
                self.processed.fetch_add(1, Ordering::Relaxed);
                let _ = self.bus.ack(stream, &self.group, &message.id).await;
            }
            Err(e) => {
                warn!(stream, symbol = %quote.symbol, error = %e, "store insert failed — leaving unacknowledged");
            }
        }
    }

    async fn handle_index(&self, stream: &str, message: BusMessage) {
        let index: MarketIndex = match serde_json::from_str(&message.data) {
            Ok(i) => i,
            Err(e) => {
                debug!(stream, error = %e, "malformed message — acking to drop");
                self.bad_messages.increment(stream);
                let _ = self.bus.ack(stream, &self.group, &message.id).await;
                return;
            }
        };

        if let Err(e) = quotron_core::validation::validate_index(&index) {
            debug!(stream, name = %index.name, error = %e, "validation failed — acking to drop");
            self.bad_messages.increment(stream);
            let _ = self.bus.ack(stream, &self.group, &message.id).await;
            return;
        }

        match quotron_store::indices::insert_index(&self.store, &index).await {
            Ok(()) => {
                self.processed.fetch_add(1, Ordering::Relaxed);
                let _ = self.bus.ack(stream, &self.group, &message.id).await;
            }
            Err(e) => {
                warn!(stream, name = %index.name, error = %e, "store insert failed — leaving unacknowledged");
            }
        }
    }

    pub fn processed_count(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_message_counters_increment_per_stream() {
        let counters = BadMessageCounters::default();
        counters.increment("stocks");
        counters.increment("stocks");
        counters.increment("crypto");

        assert_eq!(counters.get("stocks"), 2);
        assert_eq!(counters.get("crypto"), 1);
        assert_eq!(counters.get("indices"), 0);
    }
}
