// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project switching and bulk window operations.

use std::time::Instant;
use tracing::{info, warn};

use i3pm_core::{Clock, Scope};
use i3pm_wire::{ProjectSwitchResult, RpcError};

use super::Engine;
use crate::ipc::SwayApi;
use crate::subproc::Spawner;
use crate::telemetry::EventRecord;

impl<S, P, C> Engine<S, P, C>
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    /// Switch the active project (`None` = global mode).
    ///
    /// The pointer is persisted first, then every scoped window's
    /// visibility is recomputed in one pass. The engine processes no
    /// events in between, so the switch is atomic from the event
    /// loop's perspective.
    pub async fn switch_project(
        &mut self,
        target: Option<String>,
    ) -> Result<ProjectSwitchResult, RpcError> {
        let start = Instant::now();

        if let Some(name) = &target {
            if !self.projects.contains_key(name) {
                return Err(RpcError::invalid_params(format!("unknown project: {name}")));
            }
        }

        let previous = self.active.project_name.clone();
        self.persist_active(target.clone())
            .map_err(|e| RpcError::internal(format!("persist active project: {e}")))?;

        let new_active = self.active.project_name.clone();
        let mut shown = 0usize;
        let mut hidden = 0usize;

        let scoped_ids: Vec<i64> = self
            .windows
            .values()
            .filter(|w| w.scope == Scope::Scoped)
            .map(|w| w.id)
            .collect();

        for id in scoped_ids {
            let Some(window) = self.windows.get(&id) else { continue };
            let should_show = window.project_name.as_deref() == new_active.as_deref();

            if should_show && window.hidden {
                let mark = window.unified_mark().map(|m| m.to_string());
                let command = match mark {
                    Some(mark) => format!("[con_mark=\"{mark}\"] scratchpad show"),
                    None => format!("[con_id={id}] scratchpad show"),
                };
                match self.sway.run_command(&command).await {
                    Ok(()) => {
                        if let Some(window) = self.windows.get_mut(&id) {
                            window.hidden = false;
                            window.workspace_number = Some(self.current_workspace);
                        }
                        shown += 1;
                    }
                    Err(e) => {
                        warn!(window_id = id, error = %e, "scratchpad show failed");
                        self.health.record_error(format!("show window {id}: {e}"));
                    }
                }
            } else if !should_show && !window.hidden {
                match self.sway.run_command(&format!("[con_id={id}] move scratchpad")).await {
                    Ok(()) => {
                        if let Some(window) = self.windows.get_mut(&id) {
                            window.hidden = true;
                        }
                        hidden += 1;
                    }
                    Err(e) => {
                        warn!(window_id = id, error = %e, "move scratchpad failed");
                        self.health.record_error(format!("hide window {id}: {e}"));
                    }
                }
            }
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.perf.record("project_switch", duration_ms);
        self.health.record_project_switch();

        let mut record = EventRecord::new("project::switch");
        record.duration_ms = duration_ms;
        self.ring.push(record);

        info!(
            previous = previous.as_deref().unwrap_or("-"),
            current = new_active.as_deref().unwrap_or("-"),
            shown,
            hidden,
            "project switched"
        );

        Ok(ProjectSwitchResult { previous, current: new_active, windows_shown: shown, windows_hidden: hidden })
    }

    /// Close every window of a project. Without `force`, windows get a
    /// polite `kill`; with it, the owning processes are killed too.
    pub async fn close_all(&mut self, project: &str, force: bool) -> Result<usize, RpcError> {
        let targets: Vec<(i64, Option<i32>)> = self
            .windows
            .values()
            .filter(|w| w.project_name.as_deref() == Some(project))
            .map(|w| (w.id, w.pid))
            .collect();

        let mut closed = 0usize;
        for (id, pid) in targets {
            if let Err(e) = self.sway.run_command(&format!("[con_id={id}] kill")).await {
                warn!(window_id = id, error = %e, "kill failed");
                continue;
            }
            if force {
                if let Some(pid) = pid {
                    let _ = nix::sys::signal::kill(
                        nix::unistd::Pid::from_raw(pid),
                        nix::sys::signal::Signal::SIGTERM,
                    );
                }
            }
            self.windows.remove(&id);
            closed += 1;
        }
        info!(project, closed, force, "close_all finished");
        Ok(closed)
    }
}
