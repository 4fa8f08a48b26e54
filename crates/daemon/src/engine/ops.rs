// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane support operations on the engine.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use i3pm_core::{validate_name, Clock, Project};
use i3pm_config::{LayoutSnapshot, LayoutStore, LayoutWindow, ReposConfig};
use i3pm_wire::{ConfigShowResult, ProjectEditParams, RegistryStatsSummary, RpcError, RpcRequest, WorktreeCreateParams};

use super::Engine;
use crate::ipc::SwayApi;
use crate::subproc::Spawner;

impl<S, P, C> Engine<S, P, C>
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    pub fn sway_connected(&self) -> bool {
        self.sway.is_connected()
    }

    pub fn paths(&self) -> &i3pm_config::ConfigPaths {
        &self.paths
    }

    pub async fn get_tree(&self) -> Result<crate::ipc::TreeNode, crate::ipc::IpcError> {
        self.sway.get_tree().await
    }

    pub fn ring_len(&self) -> usize {
        self.ring.len()
    }

    pub fn ring_capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub async fn registry_stats(&self) -> RegistryStatsSummary {
        self.registry.stats().await
    }

    pub fn projects_iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// Projects skipped at load time because their directory vanished.
    pub fn quarantined_projects(&self) -> &[String] {
        &self.quarantined_projects
    }

    pub fn config_errors(&self) -> &[String] {
        &self.config_errors
    }

    pub fn layouts(&self) -> &LayoutStore {
        &self.layout_store
    }

    pub fn spawner_ref(&self) -> &P {
        &self.spawner
    }

    pub fn app_classes_conflicts(&self) -> Vec<String> {
        self.app_classes.conflicts()
    }

    pub fn load_repos(&self) -> Result<Arc<ReposConfig>, RpcError> {
        self.repos.load().map_err(|e| RpcError::internal(e.to_string()))
    }

    pub fn create_project(&mut self, params: ProjectEditParams) -> Result<Project, RpcError> {
        validate_name(&params.name).map_err(|e| RpcError::invalid_params(e.to_string()))?;
        if self.projects.contains_key(&params.name) {
            return Err(RpcError::invalid_params(format!(
                "project '{}' already exists",
                params.name
            )));
        }
        let directory = params
            .directory
            .ok_or_else(|| RpcError::invalid_params("directory is required"))?;
        if !directory.is_dir() {
            return Err(RpcError::invalid_params(format!(
                "directory does not exist: {}",
                directory.display()
            )));
        }

        let display_name = params.display_name.unwrap_or_else(|| params.name.clone());
        let mut project = Project::new(params.name.clone(), display_name, directory)
            .map_err(|e| RpcError::invalid_params(e.to_string()))?;
        if let Some(icon) = params.icon {
            project.icon = icon;
        }
        if let Some(scoped_classes) = params.scoped_classes {
            project.scoped_classes = scoped_classes;
        }

        self.project_store
            .save(&project)
            .map_err(|e| RpcError::internal(e.to_string()))?;
        self.projects.insert(project.name.clone(), project.clone());
        info!(project = project.name.as_str(), "project created");
        Ok(project)
    }

    pub fn edit_project(&mut self, params: ProjectEditParams) -> Result<Project, RpcError> {
        let project = self
            .projects
            .get_mut(&params.name)
            .ok_or_else(|| RpcError::invalid_params(format!("unknown project: {}", params.name)))?;

        if let Some(display_name) = params.display_name {
            project.display_name = display_name;
        }
        if let Some(icon) = params.icon {
            project.icon = icon;
        }
        if let Some(directory) = params.directory {
            if !directory.is_dir() {
                return Err(RpcError::invalid_params(format!(
                    "directory does not exist: {}",
                    directory.display()
                )));
            }
            project.directory = directory;
        }
        if let Some(scoped_classes) = params.scoped_classes {
            project.scoped_classes = scoped_classes;
        }

        let project = project.clone();
        self.project_store
            .save(&project)
            .map_err(|e| RpcError::internal(e.to_string()))?;
        Ok(project)
    }

    /// Delete a project. If it was active, fall back to global mode
    /// first so visibility stays consistent.
    pub async fn delete_project(&mut self, name: &str) -> Result<(), RpcError> {
        if !self.projects.contains_key(name) {
            return Err(RpcError::invalid_params(format!("unknown project: {name}")));
        }
        if self.active.is_active(name) {
            self.switch_project(None).await?;
        }
        self.project_store
            .delete(name)
            .map_err(|e| RpcError::internal(e.to_string()))?;
        self.projects.remove(name);
        info!(project = name, "project deleted");
        Ok(())
    }

    /// Worktree lifecycle through git, grounded on repos.json.
    pub async fn worktree_op(
        &mut self,
        method: &str,
        request: &RpcRequest,
    ) -> Result<Value, RpcError> {
        let params: WorktreeCreateParams = request.parse_params()?;
        let repos = self.load_repos()?;
        let repo = repos
            .repositories
            .iter()
            .find(|r| r.account == params.account && r.name == params.repo)
            .ok_or_else(|| {
                RpcError::invalid_params(format!(
                    "unknown repository: {}/{}",
                    params.account, params.repo
                ))
            })?;

        let qualified =
            i3pm_core::join_qualified(&params.account, &params.repo, &params.branch);

        match method {
            "worktree.create" => {
                let worktree_path = repo
                    .path
                    .parent()
                    .unwrap_or(&repo.path)
                    .join(format!("{}-{}", params.repo, params.branch.replace('/', "-")));
                let mut args = vec![
                    "worktree".to_string(),
                    "add".to_string(),
                    worktree_path.to_string_lossy().into_owned(),
                ];
                if let Some(base) = &params.base_branch {
                    args.push("-b".to_string());
                    args.push(params.branch.clone());
                    args.push(base.clone());
                } else {
                    args.push(params.branch.clone());
                }
                self.spawner
                    .run("git", &args, Some(&repo.path))
                    .await
                    .map_err(|e| RpcError::internal(e.to_string()))?;
                self.repos.invalidate();
                Ok(json!({"worktree": qualified, "path": worktree_path}))
            }
            "worktree.delete" => {
                let (_, worktree) = repos
                    .find_worktree(&qualified)
                    .ok_or_else(|| RpcError::invalid_params(format!("unknown worktree: {qualified}")))?;
                let args = vec![
                    "worktree".to_string(),
                    "remove".to_string(),
                    worktree.path.to_string_lossy().into_owned(),
                ];
                self.spawner
                    .run("git", &args, Some(&repo.path))
                    .await
                    .map_err(|e| RpcError::internal(e.to_string()))?;
                self.repos.invalidate();
                Ok(json!({"deleted": qualified}))
            }
            "worktree.edit" => {
                // Editing is a projection update: the per-project file
                // absorbs new branch metadata; repos.json stays owned
                // by the discovery scanner.
                let project = self
                    .projects
                    .get_mut(&qualified)
                    .ok_or_else(|| RpcError::invalid_params(format!("unknown worktree project: {qualified}")))?;
                project.branch_metadata = Some(i3pm_core::BranchMetadata {
                    branch_type: None,
                    number: None,
                    full_name: params.branch.clone(),
                });
                let project = project.clone();
                self.project_store
                    .save(&project)
                    .map_err(|e| RpcError::internal(e.to_string()))?;
                Ok(json!({"worktree": qualified}))
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }

    /// Capture the project's current windows as a named layout.
    pub fn save_layout(&self, project: &str, layout: &str) -> Result<String, RpcError> {
        let windows: Vec<LayoutWindow> = self
            .windows
            .values()
            .filter(|w| w.project_name.as_deref() == Some(project))
            .map(|w| LayoutWindow {
                app_name: w.app_name.clone().unwrap_or_else(|| w.class.to_lowercase()),
                window_class: w.class.clone(),
                workspace: w.workspace_number.unwrap_or(1),
                floating: w.floating,
                title: Some(w.title.clone()),
            })
            .collect();
        if windows.is_empty() {
            return Err(RpcError::invalid_params(format!(
                "no tracked windows for project '{project}'"
            )));
        }

        let snapshot = LayoutSnapshot {
            name: layout.to_string(),
            project: project.to_string(),
            saved_at: chrono::Utc::now(),
            windows,
        };
        let path = self
            .layout_store
            .save(&snapshot)
            .map_err(|e| RpcError::internal(e.to_string()))?;
        Ok(path.to_string_lossy().into_owned())
    }

    /// Move the project's current windows back to their recorded
    /// workspaces. Returns how many windows moved.
    pub async fn restore_layout(&mut self, project: &str, layout: &str) -> Result<usize, RpcError> {
        let snapshot = self
            .layout_store
            .load(project, layout)
            .map_err(|e| RpcError::invalid_params(e.to_string()))?;

        let mut moved = 0usize;
        for placement in &snapshot.windows {
            let target: Option<i64> = self
                .windows
                .values()
                .find(|w| {
                    w.project_name.as_deref() == Some(project)
                        && w.class == placement.window_class
                        && w.workspace_number != Some(placement.workspace)
                })
                .map(|w| w.id);
            let Some(id) = target else { continue };

            let command = format!(
                "[con_id={id}] move container to workspace number {}",
                placement.workspace
            );
            if self.sway.run_command(&command).await.is_ok() {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.workspace_number = Some(placement.workspace);
                }
                moved += 1;
            }
        }
        Ok(moved)
    }

    pub async fn launch_scratchpad(
        &mut self,
        project: &str,
        working_dir: &std::path::Path,
    ) -> Result<(), RpcError> {
        self.scratchpads
            .launch(project, working_dir)
            .await
            .map(|_| ())
            .map_err(|e| RpcError::invalid_params(e.to_string()))
    }

    pub async fn scratchpad_state(&self, project: &str) -> Result<&'static str, RpcError> {
        let state = self
            .scratchpads
            .get_state(project)
            .await
            .map_err(|e| RpcError::invalid_params(e.to_string()))?;
        Ok(match state {
            crate::scratchpad::TerminalState::Visible => "visible",
            crate::scratchpad::TerminalState::Hidden => "hidden",
        })
    }

    pub async fn toggle_scratchpad(&mut self, project: &str) -> Result<&'static str, RpcError> {
        let state = self
            .scratchpads
            .toggle(project)
            .await
            .map_err(|e| RpcError::invalid_params(e.to_string()))?;
        Ok(match state {
            crate::scratchpad::TerminalState::Visible => "visible",
            crate::scratchpad::TerminalState::Hidden => "hidden",
        })
    }

    /// Record a manual snapshot of a window into a trace session.
    pub fn trace_snapshot(&mut self, trace_id: &str, window_id: i64) -> Result<Value, RpcError> {
        if self.tracer.get(trace_id).is_none() {
            return Err(RpcError::invalid_params("unknown trace session"));
        }
        let snapshot = self.snapshot(window_id);
        let Some(window) = self.windows.get(&window_id) else {
            return Err(RpcError::invalid_params(format!("window {window_id} is not tracked")));
        };
        self.tracer.observe(
            window,
            "snapshot",
            "manual snapshot",
            snapshot.clone(),
            snapshot.clone(),
            None,
        );
        Ok(snapshot)
    }

    /// Raw contents of every known config file.
    pub fn config_show(&self) -> ConfigShowResult {
        let mut result = ConfigShowResult::default();
        let files = [
            ("repos.json", self.paths.repos_file()),
            ("accounts.json", self.paths.accounts_file()),
            ("active-project.json", self.paths.active_project_file()),
            ("active-worktree.json", self.paths.active_worktree_file()),
            ("app-classes.json", self.paths.app_classes_file()),
            ("application-registry.json", self.paths.app_registry_file()),
            ("window-rules.json", self.paths.window_rules_file()),
        ];
        for (name, path) in files {
            match std::fs::read(&path) {
                Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                    Ok(value) => {
                        result.files.insert(name.to_string(), value);
                    }
                    Err(e) => result.errors.push(format!("{name}: {e}")),
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => result.errors.push(format!("{name}: {e}")),
            }
        }
        result
    }

    /// Backup generations available per config file.
    pub fn config_versions(&self) -> Result<Value, RpcError> {
        let mut versions = serde_json::Map::new();
        for (name, path) in [
            ("repos.json", self.paths.repos_file()),
            ("active-project.json", self.paths.active_project_file()),
            ("app-classes.json", self.paths.app_classes_file()),
            ("window-rules.json", self.paths.window_rules_file()),
        ] {
            let mut generations = Vec::new();
            for i in 0..i3pm_config::atomic::BACKUP_RETENTION {
                let backup = if i == 0 {
                    path.with_extension("json.backup")
                } else {
                    path.with_extension(format!("json.backup.{i}"))
                };
                if let Ok(meta) = std::fs::metadata(&backup) {
                    let modified = meta
                        .modified()
                        .ok()
                        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                        .map(|d| d.as_secs());
                    generations.push(json!({
                        "path": backup,
                        "modified_epoch": modified,
                    }));
                }
            }
            versions.insert(name.to_string(), Value::Array(generations));
        }
        Ok(Value::Object(versions))
    }

    /// Restore a config file from its newest backup, then reload.
    pub fn config_rollback(&mut self, file: &str) -> Result<Value, RpcError> {
        let path = match file {
            "repos.json" => self.paths.repos_file(),
            "active-project.json" => self.paths.active_project_file(),
            "app-classes.json" => self.paths.app_classes_file(),
            "window-rules.json" => self.paths.window_rules_file(),
            other => {
                return Err(RpcError::invalid_params(format!("unknown config file: {other}")))
            }
        };
        let backup = path.with_extension("json.backup");
        if !backup.is_file() {
            return Err(RpcError::invalid_params(format!("no backup for {file}")));
        }
        std::fs::copy(&backup, &path).map_err(|e| RpcError::internal(e.to_string()))?;
        self.reload_config();
        info!(file, "config rolled back from backup");
        Ok(json!({"rolled_back": file, "errors": self.config_errors}))
    }
}
