mod cli;

use std::time::Duration;

use clap::Parser;
use cli::{Cli, Command, SchedulerTarget, TestTarget};
use quotron_core::Config;
use quotron_supervisor::config::SupervisorConfig;
use quotron_supervisor::error::SupervisorError;
use quotron_supervisor::{monitor, status, supervisor};
use tracing::{error, info};

const USAGE_ERROR: i32 = 1;
const PARTIAL_FAILURE: i32 = 2;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).with_level(true).init();
    quotron_core::config::load_dotenv();

    let cli = Cli::parse();
    let core_config = Config::from_env();

    if cli.gen_config {
        let registry = SupervisorConfig::from_core(&core_config);
        match registry.to_json_pretty() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "failed to render config");
                std::process::exit(USAGE_ERROR);
            }
        }
        return;
    }

    let registry = match &cli.config {
        Some(path) => match SupervisorConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "failed to load config");
                std::process::exit(USAGE_ERROR);
            }
        },
        None => SupervisorConfig::from_core(&core_config),
    };

    let Some(command) = cli.command else {
        eprintln!("no subcommand given — try `quotron-supervisor --help`");
        std::process::exit(USAGE_ERROR);
    };

    let exit_code = match command {
        Command::Start { services } => run_start(registry, core_config, services).await,
        Command::Stop { services } => run_stop(registry, core_config, services).await,
        Command::Status => run_status(registry, core_config).await,
        Command::Monitor => run_monitor(registry, core_config).await,
        Command::Health { action, target } => run_health(registry, core_config, action, target).await,
        Command::Test { what } => run_test(core_config, what).await,
        Command::Scheduler { what } => run_scheduler(registry, core_config, what).await,
    };

    std::process::exit(exit_code);
}

async fn run_start(registry: SupervisorConfig, core_config: Config, services: Vec<String>) -> i32 {
    let mut sup = supervisor::Supervisor::new(registry, core_config.process);
    match sup.start(&services).await {
        Ok(()) => {
            info!("start complete");
            0
        }
        Err(SupervisorError::UnknownService(name)) => {
            error!(service = %name, "unknown service");
            USAGE_ERROR
        }
        Err(e) => {
            error!(error = %e, "one or more services failed to start");
            PARTIAL_FAILURE
        }
    }
}

async fn run_stop(registry: SupervisorConfig, core_config: Config, services: Vec<String>) -> i32 {
    let mut sup = supervisor::Supervisor::new(registry, core_config.process);
    match sup.stop(&services).await {
        Ok(()) => {
            info!("stop complete");
            0
        }
        Err(SupervisorError::UnknownService(name)) => {
            error!(service = %name, "unknown service");
            USAGE_ERROR
        }
        Err(e) => {
            error!(error = %e, "one or more services failed to stop cleanly");
            PARTIAL_FAILURE
        }
    }
}

async fn run_status(registry: SupervisorConfig, core_config: Config) -> i32 {
    let sup = supervisor::Supervisor::new(registry, core_config.process);
    let statuses = sup.status().await;
    println!("{}", serde_json::to_string_pretty(&statuses).unwrap_or_default());
    if statuses.iter().all(|s| s.is_healthy()) { 0 } else { PARTIAL_FAILURE }
}

async fn run_monitor(registry: SupervisorConfig, core_config: Config) -> i32 {
    let mut sup = supervisor::Supervisor::new(registry, core_config.process);
    monitor::run(&mut sup).await;
    0
}

async fn run_health(
    registry: SupervisorConfig,
    core_config: Config,
    action: String,
    target: Option<String>,
) -> i32 {
    match action.as_str() {
        "system" => run_status(registry, core_config).await,
        "service" => {
            let Some(target) = target else {
                eprintln!("--action service requires a <type>/<name> target");
                return USAGE_ERROR;
            };
            let name = target.split('/').next_back().unwrap_or(&target);
            let Ok(spec) = registry.get(name) else {
                error!(service = %name, "unknown service");
                return USAGE_ERROR;
            };
            let pid_file = registry.pid_file(&core_config.process, name);
            let heartbeat_file = (name == "scheduler").then(|| core_config.process.heartbeat_file(name));
            let one = status::check_one(name, spec, &pid_file, heartbeat_file.as_deref(), 0).await;
            println!("{}", serde_json::to_string_pretty(&one).unwrap_or_default());
            if one.is_healthy() { 0 } else { PARTIAL_FAILURE }
        }
        other => {
            eprintln!("unknown health action: {other}");
            USAGE_ERROR
        }
    }
}

async fn run_test(core_config: Config, what: TestTarget) -> i32 {
    let base = format!("http://{}:{}", core_config.gateway.host, core_config.gateway.port);
    let client = match reqwest::Client::builder().timeout(Duration::from_secs(5)).build() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to build http client");
            return USAGE_ERROR;
        }
    };

    match what {
        TestTarget::Api => probe(&client, &format!("{base}/health")).await,
        TestTarget::Integration => {
            let health = probe(&client, &format!("{base}/health")).await;
            if health != 0 {
                return health;
            }
            probe(&client, &format!("{base}/quote/AAPL")).await
        }
        TestTarget::Job { name } => {
            error!(job = %name, "no IPC path to the running scheduler yet — cannot trigger a job remotely");
            USAGE_ERROR
        }
    }
}

async fn probe(client: &reqwest::Client, url: &str) -> i32 {
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => {
            info!(url, status = %resp.status(), "ok");
            0
        }
        Ok(resp) => {
            error!(url, status = %resp.status(), "non-success response");
            PARTIAL_FAILURE
        }
        Err(e) => {
            error!(url, error = %e, "request failed");
            PARTIAL_FAILURE
        }
    }
}

async fn run_scheduler(registry: SupervisorConfig, core_config: Config, what: SchedulerTarget) -> i32 {
    match what {
        SchedulerTarget::Jobs { jobs_file } => match quotron_scheduler::loader::load_jobs(&jobs_file) {
            Ok(jobs) => {
                for job in jobs {
                    println!("{}\t{}\tenabled={}", job.name, job.cron, job.enabled);
                }
                0
            }
            Err(e) => {
                error!(error = %e, "failed to load jobs file");
                USAGE_ERROR
            }
        },
        SchedulerTarget::NextRuns { jobs_file } => match quotron_scheduler::loader::load_jobs(&jobs_file) {
            Ok(jobs) => {
                for job in jobs {
                    let expr = normalize_cron_display(&job.cron);
                    match expr.parse::<cron::Schedule>() {
                        Ok(schedule) => match schedule.upcoming(chrono::Utc).next() {
                            Some(next) => println!("{}\t{}", job.name, next.to_rfc3339()),
                            None => println!("{}\t(no upcoming occurrence)", job.name),
                        },
                        Err(e) => println!("{}\t(invalid cron: {e})", job.name),
                    }
                }
                0
            }
            Err(e) => {
                error!(error = %e, "failed to load jobs file");
                USAGE_ERROR
            }
        },
        SchedulerTarget::RunJob { name } => {
            error!(job = %name, "no IPC path to the running scheduler yet — cannot trigger a job remotely");
            USAGE_ERROR
        }
        SchedulerTarget::Status => run_health(registry, core_config, "service".to_string(), Some("scheduler".to_string())).await,
    }
}

fn normalize_cron_display(expr: &str) -> String {
    let field_count = expr.split_whitespace().count();
    if field_count == 5 { format!("0 {expr}") } else { expr.to_string() }
}
