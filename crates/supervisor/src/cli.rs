//! Supervisor CLI (spec §6.4).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "quotron-supervisor", about = "Lifecycle manager for the Quotron service fleet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Emit a default service-registry config to stdout and exit.
    #[arg(long)]
    pub gen_config: bool,

    /// Path to a JSON service-registry config (defaults to the built-in
    /// registry derived from env configuration).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start one or more services (default: all), dependency-closed.
    Start { services: Vec<String> },
    /// Stop one or more services (default: all), reverse-dependency order.
    Stop { services: Vec<String> },
    /// Report combined liveness/responsiveness/heartbeat status.
    Status,
    /// Enter monitor mode: periodically recheck and restart failed services.
    Monitor,
    /// Query health, either for the whole system or one named service.
    Health {
        #[arg(long, default_value = "system")]
        action: String,
        /// `<type>/<name>`, e.g. `service/gateway`. Required when `--action service`.
        target: Option<String>,
    },
    /// Run a smoke test.
    Test {
        #[command(subcommand)]
        what: TestTarget,
    },
    /// Scheduler-specific queries (reads the job file directly — does not
    /// require the scheduler process to be reachable).
    Scheduler {
        #[command(subcommand)]
        what: SchedulerTarget,
    },
}

#[derive(Subcommand, Debug)]
pub enum TestTarget {
    /// GET /health on the gateway.
    Api,
    /// A small end-to-end smoke test: gateway health, then a live quote fetch.
    Integration,
    /// Exercise a single scheduled job by name.
    Job { name: String },
}

#[derive(Subcommand, Debug)]
pub enum SchedulerTarget {
    /// List configured jobs.
    Jobs {
        #[arg(long, default_value = "jobs.yaml")]
        jobs_file: PathBuf,
    },
    /// Trigger a job immediately (requires IPC to the running scheduler).
    RunJob { name: String },
    /// Print each job's next scheduled occurrence.
    NextRuns {
        #[arg(long, default_value = "jobs.yaml")]
        jobs_file: PathBuf,
    },
    /// Report whether the scheduler process is alive and its heartbeat is fresh.
    Status,
}
