//! Port-responsiveness probe (spec §4.6: "idempotent: if a target is
//! already running and responsive — TCP open + HTTP 2xx/3xx/4xx at `/` or
//! `/health` — it is left alone").

use std::time::Duration;

use crate::config::ServiceSpec;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// True if the service is reachable: TCP connect succeeds, and if a
/// `health_path` is configured, an HTTP GET against it returns any status
/// (2xx/3xx/4xx all count as "responsive" — only a connection failure or
/// 5xx counts as down).
pub async fn is_responsive(spec: &ServiceSpec) -> bool {
    let addr = format!("{}:{}", spec.host, spec.port);
    if tokio::net::TcpStream::connect(&addr).await.is_err() {
        return false;
    }

    if spec.health_path.is_empty() {
        return true;
    }

    let url = format!("http://{}:{}{}", spec.host, spec.port, spec.health_path);
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(c) => c,
        Err(_) => return true,
    };

    match client.get(&url).send().await {
        Ok(resp) => resp.status().as_u16() < 500,
        Err(_) => false,
    }
}
