// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event dispatcher and window state machine.
//!
//! One engine instance owns the tracked-window index, the active
//! project pointer, the launch registry and all telemetry. It runs on a
//! single task draining a mailbox: WM events from the IPC reader and
//! control-plane calls from the listener. Nothing else mutates shared
//! state, which is the whole concurrency story.

mod handlers;
mod ops;
mod switch;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use i3pm_core::{
    ActiveProjectState, AppEntry, Clock, ClassifyCtx, Mark, PendingLaunch, Project, Scope,
    TrackedWindow, WindowRule, WmEvent,
};
use i3pm_config::{
    load_active_project, load_app_registry, load_window_rules, store_active_project, AppClasses,
    ConfigError, ConfigPaths, LayoutStore, ProjectStore, ReposLoader,
};
use i3pm_wire::{RpcError, RpcRequest, RpcResponse, StateMismatch, ValidateStateResult};

use crate::assign::WorkspaceAssigner;
use crate::ipc::{SwayApi, TreeNode};
use crate::launch::LaunchRegistry;
use crate::scratchpad::ScratchpadManager;
use crate::subproc::Spawner;
use crate::telemetry::{EventRing, HealthMetrics, PerformanceMetrics, WindowTracer};

/// Messages the engine drains from its mailbox.
pub enum EngineMsg {
    /// A WM event from the IPC reader.
    Event(WmEvent),
    /// A control-plane request; the reply goes back to the connection.
    Rpc {
        request: RpcRequest,
        reply: oneshot::Sender<RpcResponse>,
    },
    /// The IPC client reconnected; rebuild the index from this tree.
    Reconnected(TreeNode),
    /// The connection dropped.
    ConnectionDown,
    Shutdown,
}

/// Paths and stores the engine works against.
pub struct EngineConfig {
    pub paths: ConfigPaths,
}

/// The engine.
pub struct Engine<S, P, C: Clock> {
    pub(crate) sway: Arc<S>,
    pub(crate) clock: C,
    pub(crate) paths: ConfigPaths,

    pub(crate) windows: HashMap<i64, TrackedWindow>,
    pub(crate) active: ActiveProjectState,
    pub(crate) projects: HashMap<String, Project>,
    pub(crate) quarantined_projects: Vec<String>,

    pub(crate) app_classes: AppClasses,
    pub(crate) window_rules: Vec<WindowRule>,
    pub(crate) app_registry: Vec<AppEntry>,

    pub(crate) registry: Arc<LaunchRegistry<C>>,
    pub(crate) assigner: WorkspaceAssigner,
    pub(crate) scratchpads: ScratchpadManager<S, P, C>,

    pub(crate) project_store: ProjectStore,
    pub(crate) layout_store: LayoutStore,
    pub(crate) repos: ReposLoader,
    pub(crate) spawner: Arc<P>,

    pub(crate) health: HealthMetrics,
    pub(crate) perf: PerformanceMetrics,
    pub(crate) ring: EventRing,
    pub(crate) tracer: WindowTracer,

    /// Focused workspace, the tier-5 assignment fallback.
    pub(crate) current_workspace: i32,
    /// Set by output::change; cleared when outputs are next consulted.
    pub(crate) outputs_stale: bool,
    /// Last config load errors, served by config_validate.
    pub(crate) config_errors: Vec<String>,
}

impl<S, P, C> Engine<S, P, C>
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    pub fn new(
        sway: Arc<S>,
        spawner: Arc<P>,
        clock: C,
        config: EngineConfig,
        registry: Arc<LaunchRegistry<C>>,
    ) -> Self {
        let paths = config.paths;
        let scratchpads =
            ScratchpadManager::new(Arc::clone(&sway), Arc::clone(&spawner), clock.clone());
        Self {
            sway,
            clock,
            windows: HashMap::new(),
            active: ActiveProjectState::default(),
            projects: HashMap::new(),
            quarantined_projects: Vec::new(),
            app_classes: AppClasses::default(),
            window_rules: Vec::new(),
            app_registry: Vec::new(),
            registry,
            assigner: WorkspaceAssigner::new(),
            scratchpads,
            project_store: ProjectStore::new(paths.clone()),
            layout_store: LayoutStore::new(paths.clone()),
            repos: ReposLoader::new(&paths),
            spawner,
            health: HealthMetrics::new(),
            perf: PerformanceMetrics::new(),
            ring: EventRing::default(),
            tracer: WindowTracer::new(),
            current_workspace: 1,
            outputs_stale: false,
            config_errors: Vec::new(),
            paths,
        }
    }

    /// Load every config file, keeping last-known-good state for any
    /// file that fails and recording the error.
    pub fn reload_config(&mut self) {
        self.config_errors.clear();

        match AppClasses::load(&self.paths) {
            Ok(classes) => self.app_classes = classes,
            Err(e) => self.record_config_error("app-classes.json", &e),
        }
        match load_window_rules(&self.paths) {
            Ok(rules) => self.window_rules = rules,
            Err(e) => self.record_config_error("window-rules.json", &e),
        }
        match load_app_registry(&self.paths) {
            Ok(registry) => self.app_registry = registry,
            Err(e) => self.record_config_error("application-registry.json", &e),
        }
        match self.project_store.list() {
            Ok(list) => {
                self.projects = list.projects;
                self.quarantined_projects = list.quarantined;
                self.config_errors.extend(list.errors);
            }
            Err(e) => self.record_config_error("projects/", &e),
        }
        match load_active_project(&self.paths) {
            Ok(active) => {
                // An active pointer naming a dead project degrades to
                // global mode rather than poisoning visibility.
                if let Some(name) = &active.project_name {
                    if self.projects.contains_key(name) {
                        self.active = active;
                    } else {
                        warn!(project = name.as_str(), "active project does not exist; going global");
                        self.active = ActiveProjectState::default();
                    }
                } else {
                    self.active = active;
                }
            }
            Err(e) => self.record_config_error("active-project.json", &e),
        }
        self.repos.invalidate();
        info!(
            projects = self.projects.len(),
            rules = self.window_rules.len(),
            registry = self.app_registry.len(),
            errors = self.config_errors.len(),
            "configuration loaded"
        );
    }

    fn record_config_error(&mut self, file: &str, error: &ConfigError) {
        warn!(file, error = %error, "config load failed; keeping previous state");
        match error {
            ConfigError::Parse(messages) => {
                self.config_errors.extend(messages.iter().map(|m| format!("{file}: {m}")));
            }
            other => self.config_errors.push(format!("{file}: {other}")),
        }
    }

    /// Classification context for the current config + active project.
    pub(crate) fn classify_ctx(&self) -> ClassifyCtx {
        let active_scoped_classes = self
            .active
            .project_name
            .as_ref()
            .and_then(|name| self.projects.get(name))
            .map(|project| project.scoped_classes.iter().cloned().collect())
            .unwrap_or_default();
        ClassifyCtx {
            active_scoped_classes,
            window_rules: self.window_rules.clone(),
            class_patterns: self.app_classes.class_patterns.clone(),
            scoped_classes: self.app_classes.scoped_classes.clone(),
            global_classes: self.app_classes.global_classes.clone(),
        }
    }

    pub fn active_project(&self) -> Option<&str> {
        self.active.project_name.as_deref()
    }

    pub fn window(&self, id: i64) -> Option<&TrackedWindow> {
        self.windows.get(&id)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Register a pending launch. Returns its registry key.
    pub async fn notify_launch(&mut self, mut launch: PendingLaunch) -> String {
        launch.timestamp = self.clock.epoch_secs_f64();
        // The expected class may name a registry entry; pick up its
        // aliases so tiered matching sees them.
        if launch.aliases.is_empty() {
            if let Some(entry) =
                self.app_registry.iter().find(|e| e.name == launch.app_name)
            {
                launch.aliases = entry.aliases.clone();
            }
        }
        self.registry.add(launch).await
    }

    /// Persist the active pointer to disk and memory together.
    pub(crate) fn persist_active(&mut self, project: Option<String>) -> Result<(), ConfigError> {
        let state = store_active_project(&self.paths, project)?;
        self.active = state;
        Ok(())
    }

    /// Rebuild the window index from a full tree (startup, reconnect).
    pub fn rebuild_from_tree(&mut self, tree: &TreeNode) {
        self.windows.clear();
        for location in tree.windows() {
            let mut window = TrackedWindow::from_node(&location.node);
            window.workspace_number = location.workspace_number;
            window.workspace_name = location.workspace_name.clone();
            window.output = location.output.clone();
            window.floating = location.floating;
            window.hidden = location.in_scratchpad;
            window.apply_marks(location.node.marks.clone());
            self.windows.insert(window.id, window);
        }
        self.health.windows_tracked = self.windows.len();
        info!(windows = self.windows.len(), "window index rebuilt from tree");
    }

    /// Projects referenced by marks but absent from config.
    pub fn orphaned_mark_projects(&self) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .windows
            .values()
            .filter(|w| w.scope == Scope::Scoped)
            .filter_map(|w| w.project_name.clone())
            .filter(|name| !self.projects.contains_key(name))
            .collect();
        orphans.sort();
        orphans.dedup();
        orphans
    }

    /// Compare the index against the live tree.
    pub async fn validate_state(&self) -> Result<ValidateStateResult, RpcError> {
        let tree = self
            .sway
            .get_tree()
            .await
            .map_err(|e| RpcError::internal(format!("get_tree: {e}")))?;

        let mut result = ValidateStateResult::default();
        let mut seen = std::collections::HashSet::new();

        for location in tree.windows() {
            seen.insert(location.node.id);
            let Some(tracked) = self.windows.get(&location.node.id) else {
                result.untracked.push(location.node.id);
                continue;
            };
            if tracked.workspace_number != location.workspace_number && !location.in_scratchpad {
                result.mismatches.push(StateMismatch {
                    window_id: tracked.id,
                    field: "workspace_number".to_string(),
                    daemon_value: serde_json::json!(tracked.workspace_number),
                    tree_value: serde_json::json!(location.workspace_number),
                });
            }
            if tracked.hidden != location.in_scratchpad {
                result.mismatches.push(StateMismatch {
                    window_id: tracked.id,
                    field: "hidden".to_string(),
                    daemon_value: serde_json::json!(tracked.hidden),
                    tree_value: serde_json::json!(location.in_scratchpad),
                });
            }
        }
        for id in self.windows.keys() {
            if !seen.contains(id) {
                result.stale.push(*id);
            }
        }
        result.stale.sort_unstable();
        result.untracked.sort_unstable();
        result.consistent =
            result.mismatches.is_empty() && result.untracked.is_empty() && result.stale.is_empty();
        Ok(result)
    }

    /// Enforce the one-unified-mark invariant on a window.
    ///
    /// More than one unified mark: remove them all and re-apply the
    /// canonical one derived from tracked state.
    pub(crate) async fn repair_marks(&mut self, window_id: i64) {
        let Some(window) = self.windows.get(&window_id) else { return };
        let unified: Vec<String> = window
            .marks
            .iter()
            .filter(|m| Mark::parse(m).is_some())
            .cloned()
            .collect();
        if unified.len() <= 1 {
            return;
        }

        warn!(window_id, count = unified.len(), "multiple unified marks; re-applying canonical");
        self.health.record_error(format!("window {window_id} carried {} unified marks", unified.len()));
        for mark in &unified {
            let _ = self
                .sway
                .run_command(&format!("[con_id={window_id}] unmark \"{mark}\""))
                .await;
        }
        let canonical = {
            let window = match self.windows.get_mut(&window_id) {
                Some(w) => w,
                None => return,
            };
            window.marks.retain(|m| Mark::parse(m).is_none());
            let app = window.app_name.clone().unwrap_or_else(|| "unknown".to_string());
            let project = window
                .project_name
                .clone()
                .unwrap_or_else(|| "global".to_string());
            let mark = Mark::new(window.scope, app, project, window_id).to_string();
            window.marks.push(mark.clone());
            mark
        };
        let _ = self
            .sway
            .run_command(&format!("[con_id={window_id}] mark --add \"{canonical}\""))
            .await;
    }

    /// Drain the mailbox until shutdown.
    pub async fn run(mut self, mut mailbox: mpsc::Receiver<EngineMsg>) {
        while let Some(message) = mailbox.recv().await {
            match message {
                EngineMsg::Event(event) => self.handle_event(event).await,
                EngineMsg::Rpc { request, reply } => {
                    let response = crate::listener::methods::dispatch(&mut self, &request).await;
                    let _ = reply.send(response);
                }
                EngineMsg::Reconnected(tree) => {
                    self.health.wm_connected = true;
                    self.rebuild_from_tree(&tree);
                }
                EngineMsg::ConnectionDown => {
                    self.health.wm_connected = false;
                }
                EngineMsg::Shutdown => break,
            }
        }
        info!("engine mailbox closed; stopping");
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
