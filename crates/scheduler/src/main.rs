use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use quotron_bus::RedisBus;
use quotron_core::Config;
use quotron_scheduler::{heartbeat, JobRunner, JobScheduler, MonitorJob, JOB_DEADLINE};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Cron-driven job scheduler that feeds the gateway's quote endpoints onto the bus.
#[derive(Parser, Debug)]
#[command(name = "quotron-scheduler")]
struct Cli {
    /// YAML file of job definitions.
    #[arg(long, default_value = "jobs.yaml")]
    jobs_file: PathBuf,

    /// Base URL of the gateway to poll.
    #[arg(long, default_value = "http://localhost:3001")]
    gateway_url: String,

    /// Symbol watched by the monitor job.
    #[arg(long, default_value = "SPY")]
    monitor_symbol: String,

    /// Absolute change-percent threshold that triggers an alert.
    #[arg(long, default_value = "3.0")]
    monitor_threshold: Decimal,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).with_level(true).init();
    quotron_core::config::load_dotenv();

    let cli = Cli::parse();
    let config = Config::from_env();

    let jobs = quotron_scheduler::loader::load_jobs(&cli.jobs_file)?;
    info!(count = jobs.len(), "loaded job definitions");

    let mut scheduler = JobScheduler::new();
    scheduler.sync_jobs(&jobs);
    let scheduler = Arc::new(Mutex::new(scheduler));

    let bus = Arc::new(RedisBus::connect(&config.bus.redis_host, config.bus.redis_port).await?);
    let runner = Arc::new(JobRunner::new(
        cli.gateway_url.clone(),
        bus.clone(),
        config.bus.stream_maxlen,
    ));
    let monitor = Arc::new(MonitorJob::new(
        cli.gateway_url.clone(),
        bus.clone(),
        cli.monitor_symbol.clone(),
        cli.monitor_threshold,
    ));
    let heartbeat_path = config.process.heartbeat_file("scheduler");

    let mut tick = tokio::time::interval(Duration::from_secs(1));
    let mut monitor_tick = tokio::time::interval(Duration::from_secs(60));

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let due: Vec<String> = {
                    let guard = scheduler.lock().await;
                    guard.due_jobs(chrono::Utc::now()).into_iter().map(String::from).collect()
                };
                for name in due {
                    let Some(job) = jobs.iter().find(|j| j.name == name).cloned() else { continue };
                    let runner = runner.clone();
                    let scheduler = scheduler.clone();
                    let heartbeat_path = heartbeat_path.clone();
                    scheduler.lock().await.mark_running(&name);
                    heartbeat::beat(&heartbeat_path);
                    tokio::spawn(async move {
                        match tokio::time::timeout(JOB_DEADLINE, runner.run(&job)).await {
                            Ok(outcome) => info!(job = %job.name, ok = outcome.ok, failed = outcome.failed, "job tick complete"),
                            Err(_) => error!(job = %job.name, "job tick exceeded 5-minute deadline"),
                        }
                        scheduler.lock().await.mark_finished(&job.name);
                        heartbeat::beat(&heartbeat_path);
                    });
                }
            }
            _ = monitor_tick.tick() => {
                monitor.tick().await;
            }
        }
    }
}
