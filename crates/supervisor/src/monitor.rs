//! Monitor-mode ticker (spec §4.6: "a ticker (default 30s) rechecks every
//! managed service; failed services are restarted with the same dependency
//! closure").

use std::time::Duration;

use tracing::error;

use crate::supervisor::Supervisor;

pub async fn run(supervisor: &mut Supervisor) {
    let interval = Duration::from_secs(supervisor.config.monitor_interval_secs);
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        if let Err(e) = supervisor.monitor_tick().await {
            error!(error = %e, "monitor tick failed");
        }
    }
}
