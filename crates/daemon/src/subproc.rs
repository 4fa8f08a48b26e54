// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess spawning and failure categorization.
//!
//! Terminals and tools (git, lazygit) are spawned detached in their own
//! process group; the pid is retained for liveness checks. Non-zero
//! exits are categorized by stderr into a user-facing message that the
//! control plane returns verbatim.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tracing::{debug, info};

/// Failure categories derived from stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Validation,
    Permission,
    Git,
    Timeout,
    Unknown,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Validation => "validation",
            FailureCategory::Permission => "permission",
            FailureCategory::Git => "git",
            FailureCategory::Timeout => "timeout",
            FailureCategory::Unknown => "unknown",
        }
    }
}

/// Errors from subprocess management.
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Failed {
        category: FailureCategory,
        message: String,
        stderr: String,
    },

    #[error("{command} timed out")]
    Timeout { command: String },
}

/// Categorize a failed command's stderr.
pub fn categorize_stderr(stderr: &str) -> (FailureCategory, String) {
    let lower = stderr.to_lowercase();
    if lower.contains("permission denied") || lower.contains("access denied") {
        (
            FailureCategory::Permission,
            "Permission denied. Check repository and directory access.".to_string(),
        )
    } else if lower.contains("not a git repository")
        || lower.contains("fatal:")
        || lower.contains("branch") && lower.contains("already exists")
    {
        (FailureCategory::Git, first_line(stderr))
    } else if lower.contains("timed out") || lower.contains("timeout") {
        (FailureCategory::Timeout, "The operation timed out. Try again.".to_string())
    } else if lower.contains("invalid") || lower.contains("usage:") {
        (FailureCategory::Validation, first_line(stderr))
    } else {
        (FailureCategory::Unknown, first_line(stderr))
    }
}

fn first_line(stderr: &str) -> String {
    stderr.lines().next().unwrap_or("command failed").trim().to_string()
}

/// Seam for spawning detached processes, faked in tests.
#[async_trait]
pub trait Spawner: Send + Sync + 'static {
    /// Spawn detached; returns the child pid.
    fn spawn_detached(
        &self,
        command: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: Option<&Path>,
    ) -> Result<u32, SubprocessError>;

    /// Run to completion, capturing output.
    async fn run(
        &self,
        command: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<String, SubprocessError>;

    /// Best-effort liveness check by pid.
    fn is_alive(&self, pid: u32) -> bool;
}

/// The real spawner.
#[derive(Clone, Default)]
pub struct ProcessSpawner;

#[async_trait]
impl Spawner for ProcessSpawner {
    fn spawn_detached(
        &self,
        command: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: Option<&Path>,
    ) -> Result<u32, SubprocessError> {
        let mut cmd = std::process::Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        for (key, value) in env {
            cmd.env(key, value);
        }
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        // New process group: the child outlives the daemon and never
        // receives its terminal signals.
        std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

        let child = cmd.spawn().map_err(|source| SubprocessError::Spawn {
            command: command.to_string(),
            source,
        })?;
        let pid = child.id();
        info!(command, pid, "spawned detached process");
        Ok(pid)
    }

    async fn run(
        &self,
        command: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<String, SubprocessError> {
        let mut cmd = tokio::process::Command::new(command);
        cmd.args(args).stdin(Stdio::null());
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        let output = cmd.output().await.map_err(|source| SubprocessError::Spawn {
            command: command.to_string(),
            source,
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            let (category, message) = categorize_stderr(&stderr);
            debug!(command, category = category.as_str(), "subprocess failed");
            Err(SubprocessError::Failed { category, message, stderr })
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        // Signal 0 probes existence without delivering anything.
        nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
    }
}

/// Build and spawn a lazygit invocation for a worktree.
pub fn launch_lazygit<S: Spawner>(
    spawner: &S,
    terminal: &str,
    worktree_path: &Path,
    flags: &[String],
) -> Result<(u32, String), SubprocessError> {
    let mut args: Vec<String> = vec!["-e".to_string(), "lazygit".to_string()];
    args.extend(flags.iter().cloned());

    let command_line = format!(
        "{terminal} {} (cwd: {})",
        args.join(" "),
        worktree_path.display()
    );
    let pid = spawner.spawn_detached(terminal, &args, &[], Some(worktree_path))?;
    Ok((pid, command_line))
}

/// Recorded spawn for assertions.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct RecordedSpawn {
    pub command: String,
    pub args: Vec<String>,
    pub env: std::collections::HashMap<String, String>,
    pub cwd: Option<std::path::PathBuf>,
    pub pid: u32,
}

/// Fake spawner for tests: hands out sequential pids and records calls.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeSpawner {
    state: parking_lot::Mutex<FakeSpawnerState>,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
struct FakeSpawnerState {
    next_pid: u32,
    spawns: Vec<RecordedSpawn>,
    dead_pids: Vec<u32>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeSpawner {
    pub fn new() -> Self {
        Self { state: parking_lot::Mutex::new(FakeSpawnerState { next_pid: 10_000, ..Default::default() }) }
    }

    pub fn spawns(&self) -> Vec<RecordedSpawn> {
        self.state.lock().spawns.clone()
    }

    pub fn kill(&self, pid: u32) {
        self.state.lock().dead_pids.push(pid);
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Spawner for FakeSpawner {
    fn spawn_detached(
        &self,
        command: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: Option<&Path>,
    ) -> Result<u32, SubprocessError> {
        let mut state = self.state.lock();
        state.next_pid += 1;
        let pid = state.next_pid;
        state.spawns.push(RecordedSpawn {
            command: command.to_string(),
            args: args.to_vec(),
            env: env.iter().cloned().collect(),
            cwd: cwd.map(Path::to_path_buf),
            pid,
        });
        Ok(pid)
    }

    async fn run(
        &self,
        command: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<String, SubprocessError> {
        self.spawn_detached(command, args, &[], cwd)?;
        Ok(String::new())
    }

    fn is_alive(&self, pid: u32) -> bool {
        let state = self.state.lock();
        pid <= state.next_pid && !state.dead_pids.contains(&pid)
    }
}

#[cfg(test)]
#[path = "subproc_tests.rs"]
mod subproc_tests;
