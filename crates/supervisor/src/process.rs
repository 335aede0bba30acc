//! Child-process spawn/kill (spec §4.6). Grounded on `eisenbahn-launcher`'s
//! `spawn_process`/`kill_all`: colored-prefix piped output, SIGTERM then a
//! 5s grace period then SIGKILL.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::error::SupervisorError;

/// How long to wait for SIGTERM to take effect before SIGKILL (spec §4.6).
const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ManagedProcess {
    pub name: String,
    child: Child,
}

impl ManagedProcess {
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn try_wait(&mut self) -> std::io::Result<Option<std::process::ExitStatus>> {
        self.child.try_wait()
    }

    /// Send SIGTERM, wait up to [`GRACEFUL_SHUTDOWN_TIMEOUT`], then SIGKILL.
    pub async fn stop(&mut self) {
        if let Some(pid) = self.child.id() {
            send_sigterm(pid);
        }

        let deadline = tokio::time::sleep(GRACEFUL_SHUTDOWN_TIMEOUT);
        tokio::pin!(deadline);

        loop {
            if let Ok(Some(_)) = self.child.try_wait() {
                tracing::info!(service = %self.name, "exited gracefully");
                return;
            }
            tokio::select! {
                _ = &mut deadline => {
                    tracing::warn!(service = %self.name, "graceful shutdown timed out — sending SIGKILL");
                    let _ = self.child.kill().await;
                    return;
                }
                _ = tokio::time::sleep(Duration::from_millis(100)) => {}
            }
        }
    }
}

/// Spawn `binary` via `cargo run --bin`, piping stdout/stderr through
/// name-prefixed tracing lines (development launcher convention).
pub fn spawn(
    name: &str,
    binary: &str,
    args: &[String],
    env: &HashMap<String, String>,
) -> Result<ManagedProcess, SupervisorError> {
    let mut cmd = Command::new("cargo");
    cmd.arg("run").arg("--bin").arg(binary).arg("--");
    cmd.args(args);
    cmd.envs(env);
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| SupervisorError::Spawn {
        service: name.to_string(),
        source,
    })?;

    let prefix = name.to_string();
    if let Some(stdout) = child.stdout.take() {
        let prefix = prefix.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                println!("[{prefix}] {line}");
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        let prefix = prefix.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                eprintln!("[{prefix}] {line}");
            }
        });
    }

    Ok(ManagedProcess { name: name.to_string(), child })
}

#[cfg(unix)]
fn send_sigterm(pid: u32) {
    let _ = std::process::Command::new("kill").args(["-TERM", &pid.to_string()]).output();
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32) {}
