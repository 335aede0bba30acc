//! Heartbeat file updates around each job tick (spec §4.4).

use std::path::Path;

pub fn beat(path: &Path) {
    if let Err(e) = quotron_core::heartbeat::touch(path) {
        tracing::warn!(error = %e, path = %path.display(), "failed to write heartbeat");
    }
}
