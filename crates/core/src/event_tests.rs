// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn window_event_from_wm_payload() {
    let payload = r#"{
        "change": "new",
        "container": {
            "id": 94069655,
            "name": "vim",
            "pid": 1234,
            "window_properties": {"class": "Ghostty", "instance": "ghostty", "title": "vim"},
            "marks": [],
            "focused": true
        }
    }"#;
    let event: WindowEvent = serde_json::from_str(payload).unwrap();
    assert_eq!(event.change, WindowChange::New);
    assert_eq!(event.container.id, 94069655);
    assert_eq!(event.container.class(), "Ghostty");
    assert_eq!(event.container.instance(), "ghostty");
    assert_eq!(event.container.title(), "vim");
}

#[test]
fn wayland_app_id_fallback() {
    let node = WindowNode {
        id: 1,
        app_id: Some("org.mozilla.firefox".to_string()),
        ..Default::default()
    };
    assert_eq!(node.class(), "org.mozilla.firefox");
}

#[test]
fn name_falls_back_for_title() {
    let node = WindowNode { id: 1, name: Some("hello".to_string()), ..Default::default() };
    assert_eq!(node.title(), "hello");
}

#[yare::parameterized(
    new = { "new", WindowChange::New },
    close = { "close", WindowChange::Close },
    floating = { "floating", WindowChange::Floating },
    fullscreen = { "fullscreen_mode", WindowChange::FullscreenMode },
    mark = { "mark", WindowChange::Mark },
)]
fn change_deserializes(wire: &str, expected: WindowChange) {
    let json = format!("\"{wire}\"");
    let change: WindowChange = serde_json::from_str(&json).unwrap();
    assert_eq!(change, expected);
}

#[test]
fn labels() {
    let event = WmEvent::Window(WindowEvent {
        change: WindowChange::New,
        container: WindowNode::default(),
    });
    assert_eq!(event.kind(), "window");
    assert_eq!(event.label(), "window::new");

    let event = WmEvent::Workspace(WorkspaceEvent {
        change: "focus".to_string(),
        current: None,
        old: None,
    });
    assert_eq!(event.label(), "workspace::focus");
}

#[test]
fn workspace_event_payload() {
    let payload = r#"{"change": "focus", "current": {"num": 2, "name": "2", "output": "DP-1"}}"#;
    let event: WorkspaceEvent = serde_json::from_str(payload).unwrap();
    assert_eq!(event.current.unwrap().num, Some(2));
}
