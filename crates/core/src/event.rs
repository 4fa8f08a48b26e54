// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Window-manager event model.
//!
//! The subset of i3/Sway IPC events the daemon subscribes to, decoded
//! from the payloads the WM sends. Containers are flattened to the
//! fields the state machine consumes.

use serde::{Deserialize, Serialize};

/// WM_CLASS properties as reported by the WM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowProperties {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Flat view of a window container inside an event payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowNode {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub window_properties: WindowProperties,
    #[serde(default)]
    pub marks: Vec<String>,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub urgent: bool,
}

impl WindowNode {
    /// Window class: X11 WM_CLASS class, falling back to Wayland app_id.
    pub fn class(&self) -> &str {
        self.window_properties
            .class
            .as_deref()
            .or(self.app_id.as_deref())
            .unwrap_or("")
    }

    pub fn instance(&self) -> &str {
        self.window_properties.instance.as_deref().unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.window_properties.title.as_deref().or(self.name.as_deref()).unwrap_or("")
    }
}

/// `window` event change discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowChange {
    New,
    Close,
    Focus,
    Title,
    Move,
    #[serde(rename = "floating")]
    Floating,
    FullscreenMode,
    Urgent,
    Mark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEvent {
    pub change: WindowChange,
    pub container: WindowNode,
}

/// Workspace reference inside a workspace event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceRef {
    #[serde(default)]
    pub num: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceEvent {
    pub change: String,
    #[serde(default)]
    pub current: Option<WorkspaceRef>,
    #[serde(default)]
    pub old: Option<WorkspaceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEvent {
    pub change: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub payload: String,
}

/// A decoded WM event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WmEvent {
    Window(WindowEvent),
    Workspace(WorkspaceEvent),
    Output(OutputEvent),
    Tick(TickEvent),
}

impl WmEvent {
    /// Short label for logs and the telemetry ring.
    pub fn kind(&self) -> &'static str {
        match self {
            WmEvent::Window(_) => "window",
            WmEvent::Workspace(_) => "workspace",
            WmEvent::Output(_) => "output",
            WmEvent::Tick(_) => "tick",
        }
    }

    /// Event change string, e.g. `window::new`.
    pub fn label(&self) -> String {
        match self {
            WmEvent::Window(e) => format!("window::{}", change_str(e.change)),
            WmEvent::Workspace(e) => format!("workspace::{}", e.change),
            WmEvent::Output(e) => format!("output::{}", e.change),
            WmEvent::Tick(_) => "tick".to_string(),
        }
    }
}

fn change_str(change: WindowChange) -> &'static str {
    match change {
        WindowChange::New => "new",
        WindowChange::Close => "close",
        WindowChange::Focus => "focus",
        WindowChange::Title => "title",
        WindowChange::Move => "move",
        WindowChange::Floating => "floating",
        WindowChange::FullscreenMode => "fullscreen_mode",
        WindowChange::Urgent => "urgent",
        WindowChange::Mark => "mark",
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod event_tests;
