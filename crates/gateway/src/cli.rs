//! CLI flags (spec §6.4 — `api_host`/`api_port` overrides).

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "quotron-gateway", about = "Quote gateway with primary/secondary failover")]
pub struct Cli {
    /// Override the bind host (falls back to config/env).
    #[arg(long)]
    pub host: Option<String>,

    /// Override the bind port (falls back to config/env).
    #[arg(long)]
    pub port: Option<u16>,
}

impl Cli {
    pub fn apply(&self, config: &mut quotron_core::Config) {
        if let Some(host) = &self.host {
            config.gateway.host = host.clone();
        }
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
    }
}
