use std::sync::Arc;

use clap::Parser;
use quotron_core::{Config, StreamCategory};
use quotron_etl::{BadMessageCounters, Worker};
use tracing::{error, info};

/// ETL worker pool: consumes quote/index messages off the bus and persists them.
#[derive(Parser, Debug)]
#[command(name = "quotron-etl")]
struct Cli {
    /// Consumer group name shared by all workers in this pool.
    #[arg(long, default_value = "etl")]
    group: String,

    /// Number of worker tasks per stream.
    #[arg(long, default_value_t = 2)]
    workers_per_stream: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).with_level(true).init();
    quotron_core::config::load_dotenv();

    let cli = Cli::parse();
    let config = Config::from_env();

    if !config.postgres.is_configured() {
        anyhow::bail!("postgres is not configured — set DB_USER/DB_PASSWORD (or profiled equivalents)");
    }
    let url = quotron_store::database_url(
        &config.postgres.host,
        config.postgres.port,
        config.postgres.username.as_deref().unwrap_or("postgres"),
        config.postgres.password.as_deref().unwrap_or(""),
        &config.postgres.database,
    );
    let store = quotron_store::init_pg_pool(&url)
        .await
        .ok_or_else(|| anyhow::anyhow!("failed to connect to postgres"))?;

    let bus = Arc::new(quotron_bus::RedisBus::connect(&config.bus.redis_host, config.bus.redis_port).await?);
    let bad_messages = Arc::new(BadMessageCounters::default());

    let streams = [
        StreamCategory::Stocks.stream_name(),
        StreamCategory::Crypto.stream_name(),
        StreamCategory::Indices.stream_name(),
    ];

    info!(group = %cli.group, workers_per_stream = cli.workers_per_stream, "starting etl worker pool");

    let mut handles = Vec::new();
    for stream in streams {
        for i in 0..cli.workers_per_stream {
            let worker = Worker::new(
                format!("{stream}-{i}"),
                bus.clone(),
                store.clone(),
                cli.group.clone(),
                bad_messages.clone(),
            );
            handles.push(tokio::spawn(async move {
                worker.run(stream).await;
            }));
        }
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "worker task panicked");
        }
    }

    Ok(())
}
