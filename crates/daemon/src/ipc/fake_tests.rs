// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn records_and_interprets_commands() {
    let sway = FakeSway::new();
    sway.add_window(TreeBuilder::window(10, "Code", 100), 1);

    sway.run_command("[con_id=10] move container to workspace number 3").await.unwrap();
    assert_eq!(sway.window_workspace(10), Some(3));

    sway.run_command("[con_id=10] mark --add \"scoped:code:nixos:10\"").await.unwrap();
    assert_eq!(sway.window_marks(10), vec!["scoped:code:nixos:10".to_string()]);

    sway.run_command("[con_id=10] move scratchpad").await.unwrap();
    assert_eq!(sway.window_in_scratchpad(10), Some(true));

    sway.set_focused_workspace(2);
    sway.run_command("[con_mark=\"scoped:code:nixos:10\"] scratchpad show").await.unwrap();
    assert_eq!(sway.window_in_scratchpad(10), Some(false));
    assert_eq!(sway.window_workspace(10), Some(2));

    assert_eq!(sway.commands().len(), 4);
}

#[tokio::test]
async fn tree_renders_scratchpad_workspace() {
    let sway = FakeSway::new();
    sway.add_window(TreeBuilder::window(10, "Code", 100), 1);
    sway.add_window(TreeBuilder::window(11, "Ghostty", 200), 1);
    sway.run_command("[con_id=11] move scratchpad").await.unwrap();

    let tree = sway.get_tree().await.unwrap();
    let windows = tree.windows();
    assert_eq!(windows.len(), 2);

    let hidden = tree.find_window(11).unwrap();
    assert!(hidden.in_scratchpad);
    let visible = tree.find_window(10).unwrap();
    assert_eq!(visible.workspace_number, Some(1));
    assert_eq!(visible.output.as_deref(), Some("FAKE-1"));
}

#[tokio::test]
async fn disconnected_fake_errors() {
    let sway = FakeSway::new();
    sway.set_connected(false);
    assert!(matches!(sway.get_tree().await.unwrap_err(), IpcError::Disconnected));
    assert!(matches!(sway.run_command("nop").await.unwrap_err(), IpcError::Disconnected));
    assert!(!sway.is_connected());
}

#[tokio::test]
async fn workspaces_reflect_windows() {
    let sway = FakeSway::new();
    sway.set_focused_workspace(2);
    sway.add_window(TreeBuilder::window(10, "Code", 100), 5);

    let workspaces = sway.get_workspaces().await.unwrap();
    let nums: Vec<i32> = workspaces.iter().map(|w| w.num).collect();
    assert_eq!(nums, vec![2, 5]);
    assert!(workspaces[0].focused);
}
