// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory window tracking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::classify::Scope;
use crate::event::WindowNode;
use crate::mark::Mark;

/// Mirror of a window's current state, maintained by the event loop and
/// rebuilt from the tree on reconnect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedWindow {
    pub id: i64,
    pub class: String,
    pub instance: String,
    pub title: String,
    pub pid: Option<i32>,
    pub workspace_number: Option<i32>,
    pub workspace_name: Option<String>,
    pub output: Option<String>,
    pub floating: bool,
    /// True while the window sits in the scratchpad.
    pub hidden: bool,
    pub focused: bool,
    pub urgent: bool,
    pub marks: Vec<String>,
    pub scope: Scope,
    pub project_name: Option<String>,
    pub app_name: Option<String>,
    /// `I3PM_*` variables read from the window's process.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env_vars: HashMap<String, String>,
}

impl TrackedWindow {
    pub fn from_node(node: &WindowNode) -> Self {
        Self {
            id: node.id,
            class: node.class().to_string(),
            instance: node.instance().to_string(),
            title: node.title().to_string(),
            pid: node.pid,
            workspace_number: None,
            workspace_name: None,
            output: None,
            floating: false,
            hidden: false,
            focused: node.focused,
            urgent: node.urgent,
            marks: node.marks.clone(),
            scope: Scope::Global,
            project_name: None,
            app_name: None,
            env_vars: HashMap::new(),
        }
    }

    /// The window's unified mark, if it carries one.
    pub fn unified_mark(&self) -> Option<Mark> {
        Mark::from_marks(&self.marks)
    }

    /// Re-derive scope/project/app from the current mark list.
    pub fn apply_marks(&mut self, marks: Vec<String>) {
        self.marks = marks;
        if let Some(mark) = self.unified_mark() {
            self.scope = mark.scope;
            self.project_name = Some(mark.project);
            self.app_name = Some(mark.app);
        }
    }

    /// Whether this window should be visible under the given active
    /// project: global always, scoped only when its project is active.
    pub fn should_be_visible(&self, active_project: Option<&str>) -> bool {
        match self.scope {
            Scope::Global => true,
            Scope::Scoped => self.project_name.as_deref() == active_project,
        }
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod window_tests;
