// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment injection for launched processes.
//!
//! Launchers and the scratchpad manager pass project context to child
//! processes through `I3PM_*` variables. All values are strings;
//! booleans render as "true"/"false". Absent optional fields are elided
//! rather than exported empty.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classify::Scope;
use crate::project::Project;

/// Worktree context for a launched process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeEnvironment {
    pub is_worktree: bool,
    pub parent_project: Option<String>,
    pub branch_type: Option<String>,
    pub branch_number: Option<u32>,
    pub full_branch_name: Option<String>,
}

impl WorktreeEnvironment {
    pub fn from_project(project: &Project) -> Self {
        let meta = project.branch_metadata.as_ref();
        Self {
            is_worktree: project.is_worktree(),
            parent_project: project.parent_project.clone(),
            branch_type: meta.and_then(|m| m.branch_type.clone()),
            branch_number: meta.and_then(|m| m.number),
            full_branch_name: meta.map(|m| m.full_name.clone()),
        }
    }

    /// Render as env pairs, eliding `None`s.
    pub fn to_env_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "I3PM_IS_WORKTREE".to_string(),
            if self.is_worktree { "true" } else { "false" }.to_string(),
        )];
        if let Some(parent) = &self.parent_project {
            pairs.push(("I3PM_PARENT_PROJECT".to_string(), parent.clone()));
        }
        if let Some(branch_type) = &self.branch_type {
            pairs.push(("I3PM_BRANCH_TYPE".to_string(), branch_type.clone()));
        }
        if let Some(number) = self.branch_number {
            pairs.push(("I3PM_BRANCH_NUMBER".to_string(), number.to_string()));
        }
        if let Some(full) = &self.full_branch_name {
            pairs.push(("I3PM_FULL_BRANCH_NAME".to_string(), full.clone()));
        }
        pairs
    }
}

/// Builder for the full `I3PM_*` injection set.
#[derive(Debug, Clone)]
pub struct LaunchEnv<'a> {
    pub app_id: String,
    pub app_name: &'a str,
    pub scope: Scope,
    pub project: &'a Project,
    pub target_workspace: Option<i32>,
    pub expected_class: Option<&'a str>,
    pub launcher_pid: u32,
    pub launch_time: f64,
}

impl LaunchEnv<'_> {
    pub fn to_env_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("I3PM_APP_ID".to_string(), self.app_id.clone()),
            ("I3PM_APP_NAME".to_string(), self.app_name.to_string()),
            ("I3PM_SCOPE".to_string(), self.scope.to_string()),
            ("I3PM_PROJECT_NAME".to_string(), self.project.name.clone()),
            ("I3PM_PROJECT_DIR".to_string(), path_str(&self.project.directory)),
            ("I3PM_PROJECT_DISPLAY_NAME".to_string(), self.project.display_name.clone()),
            ("I3PM_PROJECT_ICON".to_string(), self.project.icon.clone()),
            ("I3PM_LAUNCH_TIME".to_string(), format!("{:.3}", self.launch_time)),
            ("I3PM_LAUNCHER_PID".to_string(), self.launcher_pid.to_string()),
        ];
        if let Some(ws) = self.target_workspace {
            pairs.push(("I3PM_TARGET_WORKSPACE".to_string(), ws.to_string()));
        }
        if let Some(class) = self.expected_class {
            pairs.push(("I3PM_EXPECTED_CLASS".to_string(), class.to_string()));
        }
        pairs.extend(WorktreeEnvironment::from_project(self.project).to_env_pairs());
        pairs
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod worktree_tests;
