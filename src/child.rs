//! Spawning the command given with `--cmd`.
//!
//! The child's stdout is discarded and it is killed with SIGKILL when pmon
//! exits. A background task reaps it so that, once it exits on its own, its
//! `/proc` entry disappears and the sampler drops it.

use anyhow::{anyhow, Context, Result};
use std::process::Stdio;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct SpawnedChild {
    pid: u32,
    reaper: JoinHandle<()>,
}

impl SpawnedChild {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Kills the child if it is still running.
    pub fn shutdown(self) {
        // Dropping the reaper's future drops the Child, and kill_on_drop
        // sends SIGKILL.
        self.reaper.abort();
        debug!("Child {} released", self.pid);
    }
}

/// Splits `cmdline` on whitespace and spawns it.
pub fn spawn_command(cmdline: &str) -> Result<SpawnedChild> {
    let mut parts = cmdline.split_whitespace();
    let program = parts.next().ok_or_else(|| anyhow!("cmd is empty"))?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("error with command: {cmdline}"))?;

    let pid = child
        .id()
        .ok_or_else(|| anyhow!("command exited before its pid could be read: {cmdline}"))?;
    info!("Spawned '{}' with pid {}", cmdline, pid);

    let reaper = tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => info!("Child {} exited: {}", pid, status),
            Err(e) => warn!("Failed to wait for child {}: {}", pid, e),
        }
    });

    Ok(SpawnedChild { pid, reaper })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawn_reports_live_pid() {
        let child = spawn_command("sleep 5").unwrap();
        let statm = format!("/proc/{}/statm", child.pid());
        assert!(std::path::Path::new(&statm).exists());

        child.shutdown();
    }

    #[tokio::test]
    async fn test_exited_child_is_reaped() {
        let child = spawn_command("true").unwrap();
        let pid = child.pid();

        let mut gone = false;
        for _ in 0..100 {
            if !std::path::Path::new(&format!("/proc/{pid}")).exists() {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(gone, "pid {pid} still present after exit");
    }

    #[tokio::test]
    async fn test_spawn_unknown_program_fails() {
        assert!(spawn_command("/definitely/not/a/program").is_err());
        assert!(spawn_command("   ").is_err());
    }
}
