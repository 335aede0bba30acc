//! Plain counters for `GET /metrics` (spec §4.2.1). Not a Prometheus
//! exporter — ad hoc `serde_json::json!` rendering, same style as the
//! teacher's `queue_status`/`scheduler_metrics` handlers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Default)]
pub struct Metrics {
    requests_by_route: RwLock<HashMap<&'static str, AtomicU64>>,
    store_write_failures: AtomicU64,
}

impl Metrics {
    pub fn record_request(&self, route: &'static str) {
        if let Some(counter) = self.requests_by_route.read().unwrap().get(route) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.requests_by_route
            .write()
            .unwrap()
            .entry(route)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_write_failure(&self) {
        self.store_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> serde_json::Value {
        let requests = self
            .requests_by_route
            .read()
            .unwrap()
            .iter()
            .map(|(route, count)| (route.to_string(), count.load(Ordering::Relaxed)))
            .collect::<HashMap<_, _>>();

        serde_json::json!({
            "requests_by_route": requests,
            "store_write_failures": self.store_write_failures.load(Ordering::Relaxed),
        })
    }
}
