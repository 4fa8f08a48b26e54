// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project scratchpad terminals.
//!
//! One terminal per project, identified by the mark
//! `scratchpad:<project>` plus an `I3PM_APP_ID` stamped on the child
//! process. Launch spawns detached, polls the tree for the child's pid,
//! then marks the window. Validation repairs a lost mark in place and
//! drops entries whose process or window is gone.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use i3pm_core::Clock;

use crate::env;
use crate::ipc::{IpcError, SwayApi};
use crate::subproc::{Spawner, SubprocessError};

/// Poll cadence while waiting for the terminal window.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A tracked terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchpadTerminal {
    pub project_name: String,
    pub pid: u32,
    pub window_id: i64,
    pub mark: String,
    pub working_dir: PathBuf,
    /// Epoch ms of the last `scratchpad show`.
    pub last_shown_at: Option<u64>,
}

/// Visible on a workspace or hidden in the scratchpad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Visible,
    Hidden,
}

#[derive(Debug, Error)]
pub enum ScratchpadError {
    #[error("working directory does not exist: {0}")]
    MissingWorkingDir(PathBuf),

    #[error("project '{0}' already has a terminal")]
    AlreadyRunning(String),

    #[error("no terminal tracked for project '{0}'")]
    NotFound(String),

    #[error("terminal window did not appear within {0:?}")]
    WindowTimeout(Duration),

    #[error(transparent)]
    Spawn(#[from] SubprocessError),

    #[error(transparent)]
    Ipc(#[from] IpcError),
}

pub fn scratchpad_mark(project: &str) -> String {
    format!("scratchpad:{project}")
}

/// The manager.
pub struct ScratchpadManager<S, P, C> {
    sway: Arc<S>,
    spawner: Arc<P>,
    clock: C,
    terminals: HashMap<String, ScratchpadTerminal>,
    window_wait: Duration,
}

impl<S, P, C> ScratchpadManager<S, P, C>
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    pub fn new(sway: Arc<S>, spawner: Arc<P>, clock: C) -> Self {
        Self {
            sway,
            spawner,
            clock,
            terminals: HashMap::new(),
            window_wait: env::scratchpad_wait(),
        }
    }

    pub fn get(&self, project: &str) -> Option<&ScratchpadTerminal> {
        self.terminals.get(project)
    }

    pub fn remove_by_window(&mut self, window_id: i64) -> Option<ScratchpadTerminal> {
        let project = self
            .terminals
            .values()
            .find(|t| t.window_id == window_id)
            .map(|t| t.project_name.clone())?;
        self.terminals.remove(&project)
    }

    /// Launch a terminal for a project.
    pub async fn launch(
        &mut self,
        project: &str,
        working_dir: &Path,
    ) -> Result<&ScratchpadTerminal, ScratchpadError> {
        if !working_dir.is_dir() {
            return Err(ScratchpadError::MissingWorkingDir(working_dir.to_path_buf()));
        }
        if self.terminals.contains_key(project) {
            return Err(ScratchpadError::AlreadyRunning(project.to_string()));
        }

        let app_id = format!("scratchpad-{project}-{}", self.clock.epoch_ms() / 1000);
        let child_env = vec![
            ("I3PM_SCRATCHPAD".to_string(), "true".to_string()),
            ("I3PM_PROJECT_NAME".to_string(), project.to_string()),
            ("I3PM_WORKING_DIR".to_string(), working_dir.to_string_lossy().into_owned()),
            ("I3PM_APP_NAME".to_string(), "scratchpad-terminal".to_string()),
            ("I3PM_SCOPE".to_string(), "scoped".to_string()),
            ("I3PM_APP_ID".to_string(), app_id),
        ];

        let terminal_cmd = env::terminal_command();
        let pid = self.spawner.spawn_detached(&terminal_cmd, &[], &child_env, Some(working_dir))?;

        let window_id = self.wait_for_window(pid).await?;

        let mark = scratchpad_mark(project);
        self.sway
            .run_command(&format!("[con_id={window_id}] mark --add \"{mark}\""))
            .await?;

        info!(project, pid, window_id, "scratchpad terminal launched");
        let terminal = ScratchpadTerminal {
            project_name: project.to_string(),
            pid,
            window_id,
            mark,
            working_dir: working_dir.to_path_buf(),
            last_shown_at: Some(self.clock.epoch_ms()),
        };
        Ok(self.terminals.entry(project.to_string()).or_insert(terminal))
    }

    /// Poll the tree until a window owned by `pid` appears.
    async fn wait_for_window(&self, pid: u32) -> Result<i64, ScratchpadError> {
        let attempts = (self.window_wait.as_millis() / POLL_INTERVAL.as_millis()).max(1);
        for attempt in 0..attempts {
            let tree = self.sway.get_tree().await?;
            if let Some(location) = tree.find_window_by_pid(pid as i32) {
                return Ok(location.node.id);
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
        Err(ScratchpadError::WindowTimeout(self.window_wait))
    }

    /// True iff pid alive ∧ window present ∧ mark intact (repairing a
    /// missing mark in place). Invalid entries are dropped.
    pub async fn validate(&mut self, project: &str) -> bool {
        let Some(terminal) = self.terminals.get(project) else {
            return false;
        };

        if !self.spawner.is_alive(terminal.pid) {
            warn!(project, pid = terminal.pid, "scratchpad process is gone");
            self.terminals.remove(project);
            return false;
        }

        let Ok(tree) = self.sway.get_tree().await else {
            // WM unreachable; keep the entry, we cannot say it is dead.
            return true;
        };
        let Some(location) = tree.find_window(terminal.window_id) else {
            warn!(project, window_id = terminal.window_id, "scratchpad window is gone");
            self.terminals.remove(project);
            return false;
        };

        if !location.node.marks.iter().any(|m| m == &terminal.mark) {
            let command = format!(
                "[con_id={}] mark --add \"{}\"",
                terminal.window_id, terminal.mark
            );
            if let Err(e) = self.sway.run_command(&command).await {
                warn!(project, error = %e, "failed to repair scratchpad mark");
            } else {
                info!(project, "repaired missing scratchpad mark");
            }
        }
        true
    }

    /// Where the terminal currently is.
    pub async fn get_state(&self, project: &str) -> Result<TerminalState, ScratchpadError> {
        let terminal = self
            .terminals
            .get(project)
            .ok_or_else(|| ScratchpadError::NotFound(project.to_string()))?;
        let tree = self.sway.get_tree().await?;
        let location = tree
            .find_window(terminal.window_id)
            .ok_or_else(|| ScratchpadError::NotFound(project.to_string()))?;
        Ok(if location.in_scratchpad { TerminalState::Hidden } else { TerminalState::Visible })
    }

    /// Hide a visible terminal, show a hidden one.
    pub async fn toggle(&mut self, project: &str) -> Result<TerminalState, ScratchpadError> {
        let state = self.get_state(project).await?;
        let Some(terminal) = self.terminals.get_mut(project) else {
            return Err(ScratchpadError::NotFound(project.to_string()));
        };

        match state {
            TerminalState::Visible => {
                self.sway
                    .run_command(&format!("[con_id={}] move scratchpad", terminal.window_id))
                    .await?;
                Ok(TerminalState::Hidden)
            }
            TerminalState::Hidden => {
                self.sway
                    .run_command(&format!("[con_mark=\"{}\"] scratchpad show", terminal.mark))
                    .await?;
                terminal.last_shown_at = Some(self.clock.epoch_ms());
                Ok(TerminalState::Visible)
            }
        }
    }

    /// Drop every invalid entry; returns how many were removed.
    /// Idempotent: a second pass removes nothing.
    pub async fn cleanup_invalid(&mut self) -> usize {
        let projects: Vec<String> = self.terminals.keys().cloned().collect();
        let mut removed = 0;
        for project in projects {
            if !self.validate(&project).await {
                removed += 1;
            }
        }
        removed
    }

    pub fn tracked_projects(&self) -> Vec<String> {
        self.terminals.keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "scratchpad_tests.rs"]
mod scratchpad_tests;
