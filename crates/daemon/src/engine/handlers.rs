// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-event state transitions.

use serde_json::json;
use std::time::Instant;
use tracing::{debug, info, warn};

use i3pm_core::{
    classify, Clock, LaunchWindowInfo, Mark, Scope, TrackedWindow, WindowChange, WindowEvent,
    WmEvent,
};

use super::Engine;
use crate::assign::{app_hook, AssignInput};
use crate::ipc::SwayApi;
use crate::procenv;
use crate::subproc::Spawner;
use crate::telemetry::EventRecord;

impl<S, P, C> Engine<S, P, C>
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    /// Dispatch one WM event.
    pub async fn handle_event(&mut self, event: WmEvent) {
        let start = Instant::now();
        let mut record = EventRecord::new(event.label());

        match event {
            WmEvent::Window(window_event) => {
                record.window_id = Some(window_event.container.id);
                record.window_class = Some(window_event.container.class().to_string());
                record.window_title = Some(window_event.container.title().to_string());
                self.handle_window_event(window_event, &mut record).await;
            }
            WmEvent::Workspace(workspace_event) => {
                if workspace_event.change == "focus" {
                    if let Some(num) = workspace_event.current.and_then(|w| w.num) {
                        self.current_workspace = num;
                        debug!(workspace = num, "focused workspace updated");
                    }
                }
            }
            WmEvent::Output(output_event) => {
                info!(change = output_event.change.as_str(), "output changed; invalidating cache");
                self.outputs_stale = true;
            }
            WmEvent::Tick(_) => {}
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        record.duration_ms = duration_ms;
        self.perf.record("event_process", duration_ms);
        self.health.record_event();
        self.health.windows_tracked = self.windows.len();
        self.ring.push(record);
    }

    async fn handle_window_event(&mut self, event: WindowEvent, record: &mut EventRecord) {
        let id = event.container.id;
        match event.change {
            WindowChange::New => self.on_window_new(event, record).await,
            WindowChange::Close => {
                self.windows.remove(&id);
                self.scratchpads.remove_by_window(id);
                debug!(window_id = id, "window closed");
            }
            WindowChange::Focus => {
                for window in self.windows.values_mut() {
                    window.focused = window.id == id;
                }
            }
            WindowChange::Title => self.on_window_title(event).await,
            WindowChange::Move => {
                let before = self.snapshot(id);
                let crossed = self.refresh_location(&event).await;
                if crossed {
                    self.trace_window(id, "window::move", "crossed scratchpad boundary", before);
                }
            }
            WindowChange::Floating => {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.floating = !window.floating;
                }
                self.refresh_location(&event).await;
            }
            WindowChange::FullscreenMode => {
                // Tracked only as a field refresh; no visibility change.
                self.refresh_location(&event).await;
            }
            WindowChange::Urgent => {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.urgent = event.container.urgent;
                }
            }
            WindowChange::Mark => {
                let before = self.snapshot(id);
                if let Some(window) = self.windows.get_mut(&id) {
                    window.apply_marks(event.container.marks.clone());
                }
                self.repair_marks(id).await;
                self.trace_window(id, "window::mark", "marks changed", before);
            }
        }
    }

    /// The window::new pipeline: env → correlation → classification →
    /// workspace → visibility → unified mark → index.
    async fn on_window_new(&mut self, event: WindowEvent, record: &mut EventRecord) {
        let node = event.container;
        let id = node.id;
        let mut window = TrackedWindow::from_node(&node);
        window.workspace_number = Some(self.current_workspace);

        // A monitor change invalidated the output list; refresh it so
        // preferred-workspace selection sees current outputs.
        if self.outputs_stale {
            if let Ok(outputs) = self.sway.get_outputs().await {
                debug!(outputs = outputs.len(), "output list refreshed");
            }
            self.outputs_stale = false;
        }

        // Phase 1: environment from /proc.
        let phase_start = Instant::now();
        if let Some(pid) = node.pid {
            window.env_vars = procenv::read_i3pm_env_with_parents(pid);
        }
        record.phases.push(("proc_env".to_string(), phase_ms(phase_start)));

        // Phase 2: launch correlation.
        let phase_start = Instant::now();
        let launch_info = LaunchWindowInfo {
            window_id: id,
            window_class: node.class().to_string(),
            window_instance: node.instance().to_string(),
            window_pid: node.pid,
            workspace_number: Some(self.current_workspace),
            timestamp: self.clock.epoch_secs_f64(),
        };
        let matched = self.registry.find_match(&launch_info).await;
        record.phases.push(("correlation".to_string(), phase_ms(phase_start)));

        // Phase 3: classification (or adoption of the launch's fields).
        let phase_start = Instant::now();
        let mut workspace_hint: Option<i32> = None;
        if let Some(launch) = &matched {
            window.scope = match window.env_vars.get("I3PM_SCOPE").map(String::as_str) {
                Some("global") => Scope::Global,
                _ => Scope::Scoped,
            };
            window.project_name = Some(launch.project_name.clone());
            window.app_name = Some(launch.app_name.clone());
            workspace_hint = launch.workspace_number;
        } else {
            let ctx = self.classify_ctx();
            let classification = classify(node.class(), node.title(), &ctx);
            window.scope = classification.scope;
            workspace_hint = workspace_hint.or(classification.workspace.map(i32::from));
            if window.scope == Scope::Scoped {
                window.project_name = window
                    .env_vars
                    .get("I3PM_PROJECT_NAME")
                    .cloned()
                    .or_else(|| self.active.project_name.clone());
            }
            window.app_name = window.env_vars.get("I3PM_APP_NAME").cloned();
            debug!(
                window_id = id,
                class = node.class(),
                scope = %window.scope,
                source = ?classification.source,
                "window classified"
            );
        }
        record.phases.push(("classify".to_string(), phase_ms(phase_start)));

        // Phase 4: workspace assignment.
        let phase_start = Instant::now();
        let target_workspace = match workspace_hint {
            Some(ws) if (1..=10).contains(&ws) => ws,
            _ => {
                let input = AssignInput {
                    window_id: id,
                    class: node.class(),
                    instance: node.instance(),
                    title: node.title(),
                    env: &window.env_vars,
                    registry: &self.app_registry,
                    current_workspace: self.current_workspace,
                };
                let assignment = self.assigner.assign(&input, &mut self.perf);
                if let Some(project) = assignment.project_override {
                    if window.scope == Scope::Scoped && self.projects.contains_key(&project) {
                        window.project_name = Some(project);
                    }
                }
                assignment.workspace
            }
        };
        record.phases.push(("assign".to_string(), phase_ms(phase_start)));

        // Phase 5: visibility + placement.
        let phase_start = Instant::now();
        let visible = window.should_be_visible(self.active_project());
        if !visible {
            if let Err(e) = self.sway.run_command(&format!("[con_id={id}] move scratchpad")).await {
                warn!(window_id = id, error = %e, "failed to hide inactive-project window");
                self.health.record_error(format!("hide window {id}: {e}"));
                record.error = Some(e.to_string());
            } else {
                window.hidden = true;
            }
        } else if target_workspace != self.current_workspace {
            let command =
                format!("[con_id={id}] move container to workspace number {target_workspace}");
            if let Err(e) = self.sway.run_command(&command).await {
                warn!(window_id = id, error = %e, "workspace move failed");
                self.health.record_error(format!("move window {id}: {e}"));
                record.error = Some(e.to_string());
            } else {
                window.workspace_number = Some(target_workspace);
                record.workspace_assigned = Some(target_workspace);
            }
        } else {
            record.workspace_assigned = Some(target_workspace);
        }
        record.phases.push(("visibility".to_string(), phase_ms(phase_start)));

        // Phase 6: unified mark.
        let phase_start = Instant::now();
        let mark_start = Instant::now();
        let app = window
            .app_name
            .clone()
            .unwrap_or_else(|| i3pm_core::normalize_class(node.class()));
        let project = window.project_name.clone().unwrap_or_else(|| "global".to_string());
        let mark = Mark::new(window.scope, app, project, id).to_string();
        match self
            .sway
            .run_command(&format!("[con_id={id}] mark --add \"{mark}\""))
            .await
        {
            Ok(()) => {
                window.marks.push(mark.clone());
                record.marks_applied.push(mark);
                self.health.record_operation("window_mark");
            }
            Err(e) => {
                warn!(window_id = id, error = %e, "mark injection failed");
                self.health.record_error(format!("mark window {id}: {e}"));
                record.error = Some(e.to_string());
            }
        }
        self.perf.record("window_mark", phase_ms(mark_start));
        record.phases.push(("mark".to_string(), phase_ms(phase_start)));

        info!(
            window_id = id,
            class = node.class(),
            scope = %window.scope,
            project = window.project_name.as_deref().unwrap_or("-"),
            hidden = window.hidden,
            "window tracked"
        );
        let after = json!({
            "scope": window.scope,
            "project": window.project_name,
            "workspace": window.workspace_number,
            "hidden": window.hidden,
        });
        self.windows.insert(id, window);
        if let Some(window) = self.windows.get(&id) {
            self.tracer
                .observe(window, "window::new", "window tracked", json!({}), after, None);
        }
    }

    /// Title change: re-run the app-specific hook for title-driven
    /// apps and remark only when the derived project differs.
    async fn on_window_title(&mut self, event: WindowEvent) {
        let id = event.container.id;
        let new_title = event.container.title().to_string();
        let Some(window) = self.windows.get_mut(&id) else { return };
        window.title = new_title.clone();

        if window.scope != Scope::Scoped {
            return;
        }
        let Some((_, Some(derived))) = app_hook(&window.class, &new_title) else { return };
        if window.project_name.as_deref() == Some(derived.as_str()) {
            return;
        }
        if !self.projects.contains_key(&derived) {
            return;
        }

        info!(window_id = id, project = derived.as_str(), "title-derived project changed");
        let app = window.app_name.clone().unwrap_or_else(|| "code".to_string());
        let old_mark = window.unified_mark().map(|m| m.to_string());
        window.project_name = Some(derived.clone());
        let new_mark = Mark::new(window.scope, app, derived, id).to_string();
        window.marks.retain(|m| Mark::parse(m).is_none());
        window.marks.push(new_mark.clone());

        if let Some(old) = old_mark {
            let _ = self.sway.run_command(&format!("[con_id={id}] unmark \"{old}\"")).await;
        }
        if let Err(e) = self
            .sway
            .run_command(&format!("[con_id={id}] mark --add \"{new_mark}\""))
            .await
        {
            warn!(window_id = id, error = %e, "title remark failed");
        }
    }

    /// Refresh a moved window's location from the tree. Returns true
    /// when the move crossed the scratchpad boundary.
    async fn refresh_location(&mut self, event: &WindowEvent) -> bool {
        let id = event.container.id;
        let Ok(tree) = self.sway.get_tree().await else { return false };
        let Some(location) = tree.find_window(id) else { return false };
        let Some(window) = self.windows.get_mut(&id) else { return false };

        let was_hidden = window.hidden;
        window.workspace_number = location.workspace_number;
        window.workspace_name = location.workspace_name;
        window.output = location.output;
        window.floating = location.floating;
        window.hidden = location.in_scratchpad;
        was_hidden != window.hidden
    }

    pub(crate) fn snapshot(&self, window_id: i64) -> serde_json::Value {
        self.windows
            .get(&window_id)
            .map(|w| {
                json!({
                    "scope": w.scope,
                    "project": w.project_name,
                    "workspace": w.workspace_number,
                    "hidden": w.hidden,
                    "marks": w.marks,
                })
            })
            .unwrap_or(json!({}))
    }

    fn trace_window(&mut self, window_id: i64, event_type: &str, description: &str, before: serde_json::Value) {
        let after = self.snapshot(window_id);
        if let Some(window) = self.windows.get(&window_id) {
            self.tracer.observe(window, event_type, description, before, after, None);
        }
    }
}

fn phase_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
