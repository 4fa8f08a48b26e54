// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake WM adapter for tests.
//!
//! Maintains a flat window table and renders it as a tree on demand.
//! Commands are recorded verbatim; the handful the engine relies on
//! (`move scratchpad`, `scratchpad show`, `mark`, workspace moves) are
//! interpreted so state stays consistent across a scenario.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use i3pm_core::event::{WindowNode, WindowProperties};

use super::tree::{OutputInfo, TreeNode, WorkspaceInfo, SCRATCH_WORKSPACE};
use super::{IpcError, SwayApi};

#[derive(Debug, Clone)]
struct FakeWindow {
    node: WindowNode,
    workspace: i32,
    in_scratchpad: bool,
    floating: bool,
}

#[derive(Default)]
struct FakeState {
    windows: BTreeMap<i64, FakeWindow>,
    commands: Vec<String>,
    focused_workspace: i32,
    connected: bool,
    fail_commands: bool,
}

/// Shared fake WM.
#[derive(Clone)]
pub struct FakeSway {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeSway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSway {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                focused_workspace: 1,
                connected: true,
                ..Default::default()
            })),
        }
    }

    /// Add a window directly to the table.
    pub fn add_window(&self, node: WindowNode, workspace: i32) {
        let mut state = self.state.lock();
        state.windows.insert(
            node.id,
            FakeWindow { node, workspace, in_scratchpad: false, floating: false },
        );
    }

    pub fn remove_window(&self, id: i64) {
        self.state.lock().windows.remove(&id);
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().connected = connected;
    }

    pub fn set_fail_commands(&self, fail: bool) {
        self.state.lock().fail_commands = fail;
    }

    pub fn set_focused_workspace(&self, num: i32) {
        self.state.lock().focused_workspace = num;
    }

    /// All commands recorded so far.
    pub fn commands(&self) -> Vec<String> {
        self.state.lock().commands.clone()
    }

    pub fn last_command(&self) -> Option<String> {
        self.state.lock().commands.last().cloned()
    }

    pub fn clear_commands(&self) {
        self.state.lock().commands.clear();
    }

    pub fn window_workspace(&self, id: i64) -> Option<i32> {
        self.state.lock().windows.get(&id).map(|w| w.workspace)
    }

    pub fn window_in_scratchpad(&self, id: i64) -> Option<bool> {
        self.state.lock().windows.get(&id).map(|w| w.in_scratchpad)
    }

    pub fn window_marks(&self, id: i64) -> Vec<String> {
        self.state
            .lock()
            .windows
            .get(&id)
            .map(|w| w.node.marks.clone())
            .unwrap_or_default()
    }

    /// Interpret the command subset the engine emits.
    fn apply_command(state: &mut FakeState, command: &str) {
        let (target_id, rest) = parse_con_target(command, &state.windows);
        let Some(id) = target_id else { return };
        let Some(window) = state.windows.get_mut(&id) else { return };

        if rest == "move scratchpad" {
            window.in_scratchpad = true;
            window.floating = true;
        } else if rest == "scratchpad show" {
            window.in_scratchpad = false;
            window.workspace = state.focused_workspace;
        } else if let Some(num) = rest.strip_prefix("move container to workspace number ") {
            if let Ok(num) = num.trim().parse() {
                window.workspace = num;
                window.in_scratchpad = false;
            }
        } else if let Some(mark) = rest.strip_prefix("mark --add ") {
            let mark = mark.trim_matches('"').to_string();
            if !window.node.marks.contains(&mark) {
                window.node.marks.push(mark);
            }
        } else if let Some(mark) = rest.strip_prefix("unmark ") {
            let mark = mark.trim_matches('"');
            window.node.marks.retain(|m| m != mark);
        } else if rest == "unmark" {
            window.node.marks.clear();
        } else if rest == "kill" {
            state.windows.remove(&id);
        }
    }
}

/// Split `[con_id=N] cmd` / `[con_mark=M] cmd` into target and command.
fn parse_con_target(
    command: &str,
    windows: &BTreeMap<i64, FakeWindow>,
) -> (Option<i64>, String) {
    let trimmed = command.trim();
    if let Some(rest) = trimmed.strip_prefix('[') {
        if let Some((selector, cmd)) = rest.split_once(']') {
            let cmd = cmd.trim().to_string();
            if let Some(id) = selector.strip_prefix("con_id=") {
                return (id.parse().ok(), cmd);
            }
            if let Some(mark) = selector.strip_prefix("con_mark=") {
                let mark = mark.trim_matches('"');
                let id = windows
                    .values()
                    .find(|w| w.node.marks.iter().any(|m| m == mark))
                    .map(|w| w.node.id);
                return (id, cmd);
            }
            return (None, cmd);
        }
    }
    (None, trimmed.to_string())
}

#[async_trait]
impl SwayApi for FakeSway {
    async fn run_command(&self, command: &str) -> Result<(), IpcError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(IpcError::Disconnected);
        }
        if state.fail_commands {
            return Err(IpcError::CommandFailed("fake failure".to_string()));
        }
        state.commands.push(command.to_string());
        Self::apply_command(&mut state, command);
        Ok(())
    }

    async fn get_tree(&self) -> Result<TreeNode, IpcError> {
        let state = self.state.lock();
        if !state.connected {
            return Err(IpcError::Disconnected);
        }

        // Group windows by workspace; scratchpad windows go under the
        // hidden __i3_scratch workspace like the real WM.
        let mut by_workspace: BTreeMap<i32, Vec<&FakeWindow>> = BTreeMap::new();
        let mut scratch: Vec<&FakeWindow> = Vec::new();
        for window in state.windows.values() {
            if window.in_scratchpad {
                scratch.push(window);
            } else {
                by_workspace.entry(window.workspace).or_default().push(window);
            }
        }

        let mut output_nodes = Vec::new();
        let workspaces: Vec<TreeNode> = by_workspace
            .iter()
            .map(|(num, windows)| TreeNode {
                id: 1000 + i64::from(*num),
                name: Some(num.to_string()),
                node_type: "workspace".to_string(),
                num: Some(*num),
                nodes: windows
                    .iter()
                    .filter(|w| !w.floating)
                    .map(|w| window_tree_node(w))
                    .collect(),
                floating_nodes: windows
                    .iter()
                    .filter(|w| w.floating)
                    .map(|w| window_tree_node(w))
                    .collect(),
                ..Default::default()
            })
            .collect();
        output_nodes.push(TreeNode {
            id: 100,
            name: Some("FAKE-1".to_string()),
            node_type: "output".to_string(),
            output: Some("FAKE-1".to_string()),
            nodes: workspaces,
            ..Default::default()
        });

        if !scratch.is_empty() {
            output_nodes.push(TreeNode {
                id: 101,
                name: Some("__i3".to_string()),
                node_type: "output".to_string(),
                nodes: vec![TreeNode {
                    id: 1999,
                    name: Some(SCRATCH_WORKSPACE.to_string()),
                    node_type: "workspace".to_string(),
                    floating_nodes: scratch.iter().map(|w| window_tree_node(w)).collect(),
                    ..Default::default()
                }],
                ..Default::default()
            });
        }

        Ok(TreeNode {
            id: 1,
            node_type: "root".to_string(),
            nodes: output_nodes,
            ..Default::default()
        })
    }

    async fn get_workspaces(&self) -> Result<Vec<WorkspaceInfo>, IpcError> {
        let state = self.state.lock();
        if !state.connected {
            return Err(IpcError::Disconnected);
        }
        let mut nums: Vec<i32> =
            state.windows.values().filter(|w| !w.in_scratchpad).map(|w| w.workspace).collect();
        nums.push(state.focused_workspace);
        nums.sort_unstable();
        nums.dedup();
        Ok(nums
            .into_iter()
            .map(|num| WorkspaceInfo {
                num,
                name: num.to_string(),
                focused: num == state.focused_workspace,
                visible: num == state.focused_workspace,
                output: Some("FAKE-1".to_string()),
            })
            .collect())
    }

    async fn get_outputs(&self) -> Result<Vec<OutputInfo>, IpcError> {
        Ok(vec![OutputInfo {
            name: "FAKE-1".to_string(),
            active: true,
            current_workspace: Some(self.state.lock().focused_workspace.to_string()),
        }])
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }
}

fn window_tree_node(window: &FakeWindow) -> TreeNode {
    TreeNode {
        id: window.node.id,
        name: window.node.name.clone(),
        node_type: if window.floating { "floating_con" } else { "con" }.to_string(),
        pid: window.node.pid,
        app_id: window.node.app_id.clone(),
        window_properties: Some(window.node.window_properties.clone()),
        marks: window.node.marks.clone(),
        focused: window.node.focused,
        urgent: window.node.urgent,
        ..Default::default()
    }
}

/// Builder for window nodes in tests.
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn window(id: i64, class: &str, pid: i32) -> WindowNode {
        WindowNode {
            id,
            name: Some(class.to_lowercase()),
            pid: Some(pid),
            app_id: None,
            window_properties: WindowProperties {
                class: Some(class.to_string()),
                instance: Some(class.to_lowercase()),
                title: Some(class.to_lowercase()),
            },
            marks: Vec::new(),
            focused: false,
            urgent: false,
        }
    }

    pub fn window_titled(id: i64, class: &str, pid: i32, title: &str) -> WindowNode {
        let mut node = Self::window(id, class, pid);
        node.window_properties.title = Some(title.to_string());
        node.name = Some(title.to_string());
        node
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod fake_tests;
