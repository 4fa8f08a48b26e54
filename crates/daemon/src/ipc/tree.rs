// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tree model for `get_tree` responses.
//!
//! Only the fields the daemon consumes. Walk helpers pair each window
//! with its containing workspace so callers never re-derive location.

use serde::{Deserialize, Serialize};

use i3pm_core::event::{WindowNode, WindowProperties};

/// Name of the WM's hidden scratchpad workspace.
pub const SCRATCH_WORKSPACE: &str = "__i3_scratch";

/// A node of the layout tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub num: Option<i32>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub window_properties: Option<WindowProperties>,
    #[serde(default)]
    pub marks: Vec<String>,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub nodes: Vec<TreeNode>,
    #[serde(default)]
    pub floating_nodes: Vec<TreeNode>,
}

/// A window located in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowLocation {
    pub node: WindowNode,
    pub workspace_number: Option<i32>,
    pub workspace_name: Option<String>,
    pub output: Option<String>,
    pub floating: bool,
    /// True when the containing workspace is the scratchpad.
    pub in_scratchpad: bool,
}

impl TreeNode {
    fn is_window(&self) -> bool {
        // A leaf con with a pid or window properties is an actual window;
        // split containers have children.
        (self.node_type == "con" || self.node_type == "floating_con")
            && self.nodes.is_empty()
            && (self.pid.is_some() || self.window_properties.is_some() || self.app_id.is_some())
    }

    fn to_window_node(&self) -> WindowNode {
        WindowNode {
            id: self.id,
            name: self.name.clone(),
            pid: self.pid,
            app_id: self.app_id.clone(),
            window_properties: self.window_properties.clone().unwrap_or_default(),
            marks: self.marks.clone(),
            focused: self.focused,
            urgent: self.urgent,
        }
    }

    /// Every window in the tree, paired with its location.
    pub fn windows(&self) -> Vec<WindowLocation> {
        let mut windows = Vec::new();
        self.collect_windows(None, None, None, false, &mut windows);
        windows
    }

    fn collect_windows(
        &self,
        workspace_number: Option<i32>,
        workspace_name: Option<&str>,
        output: Option<&str>,
        floating: bool,
        into: &mut Vec<WindowLocation>,
    ) {
        let output = self.output.as_deref().or(output);
        let (workspace_number, workspace_name) = if self.node_type == "workspace" {
            (self.num, self.name.as_deref())
        } else {
            (workspace_number, workspace_name)
        };

        if self.is_window() {
            let in_scratchpad = workspace_name == Some(SCRATCH_WORKSPACE);
            into.push(WindowLocation {
                node: self.to_window_node(),
                workspace_number,
                workspace_name: workspace_name.map(str::to_string),
                output: output.map(str::to_string),
                floating,
                in_scratchpad,
            });
            return;
        }

        for child in &self.nodes {
            child.collect_windows(workspace_number, workspace_name, output, false, into);
        }
        for child in &self.floating_nodes {
            child.collect_windows(workspace_number, workspace_name, output, true, into);
        }
    }

    /// Locate one window by container id.
    pub fn find_window(&self, window_id: i64) -> Option<WindowLocation> {
        self.windows().into_iter().find(|w| w.node.id == window_id)
    }

    /// Locate the first window owned by a pid.
    pub fn find_window_by_pid(&self, pid: i32) -> Option<WindowLocation> {
        self.windows().into_iter().find(|w| w.node.pid == Some(pid))
    }
}

/// One entry of a `get_workspaces` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub num: i32,
    pub name: String,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub output: Option<String>,
}

/// One entry of a `get_outputs` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputInfo {
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub current_workspace: Option<String>,
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;
