// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed parameter and result shapes for control-plane methods.
//!
//! Handlers decode `params` into these via `RpcRequest::parse_params`,
//! which maps any shape mismatch to `-32602 invalid params`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use i3pm_core::PendingLaunch;

/// `notify_launch` — a launcher announces an imminent window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchNotifyParams {
    pub app_name: String,
    pub project_name: String,
    #[serde(default)]
    pub project_directory: Option<PathBuf>,
    #[serde(default)]
    pub launcher_pid: Option<i32>,
    #[serde(default)]
    pub workspace_number: Option<i32>,
    pub expected_class: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl LaunchNotifyParams {
    /// Build the pending entry, stamping the daemon-side timestamp.
    pub fn into_pending(self, timestamp: f64) -> PendingLaunch {
        PendingLaunch {
            app_name: self.app_name,
            project_name: self.project_name,
            project_directory: self.project_directory.unwrap_or_default(),
            launcher_pid: self.launcher_pid,
            workspace_number: self.workspace_number,
            expected_class: self.expected_class,
            aliases: self.aliases,
            timestamp,
            matched: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchNotifyResult {
    pub launch_id: String,
}

/// `project.switch` — `null` project means global mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSwitchParams {
    pub project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSwitchResult {
    pub previous: Option<String>,
    pub current: Option<String>,
    pub windows_shown: usize,
    pub windows_hidden: usize,
}

/// `project.create` / `project.edit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEditParams {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub scoped_classes: Option<Vec<String>>,
}

/// `worktree.create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorktreeCreateParams {
    pub account: String,
    pub repo: String,
    pub branch: String,
    #[serde(default)]
    pub base_branch: Option<String>,
}

/// `layout.save` / `layout.restore` / `layout.delete` / `layout.export`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    pub project: String,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// `close_all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseAllParams {
    pub project: String,
    #[serde(default)]
    pub force: bool,
}

/// `get_window_identity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowIdentityParams {
    pub window_id: i64,
}

/// `get_recent_events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventQueryParams {
    #[serde(default = "default_event_limit")]
    pub limit: usize,
    #[serde(default)]
    pub event_type: Option<String>,
}

fn default_event_limit() -> usize {
    50
}

/// `trace.start` matcher — at least one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceMatcherParams {
    #[serde(default)]
    pub window_id: Option<i64>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub class_regex: Option<String>,
    #[serde(default)]
    pub title_regex: Option<String>,
    #[serde(default)]
    pub max_events: Option<usize>,
}

/// `trace.stop` / `trace.get` / `trace.snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRefParams {
    pub trace_id: String,
    #[serde(default)]
    pub window_id: Option<i64>,
}

/// `lazygit.launch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LazygitLaunchParams {
    pub worktree_path: PathBuf,
    #[serde(default)]
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LazygitLaunchResult {
    pub pid: u32,
    pub command: String,
}

/// `health_check` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub status: String,
    pub uptime_secs: u64,
    pub wm_connected: bool,
    pub memory_rss_mb: f64,
    pub cpu_percent: f64,
    pub events_processed: u64,
    pub windows_tracked: usize,
    pub project_switches: u64,
    pub errors: u64,
    pub error_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_successful_operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Launch registry statistics, embedded in health and stats responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryStatsSummary {
    pub total_pending: usize,
    pub unmatched_pending: usize,
    pub total_notifications: u64,
    pub total_matched: u64,
    pub total_expired: u64,
    pub total_failed_correlation: u64,
    pub match_rate: f64,
    pub expiration_rate: f64,
}

/// One mismatch found by `validate_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMismatch {
    pub window_id: i64,
    pub field: String,
    pub daemon_value: Value,
    pub tree_value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidateStateResult {
    pub consistent: bool,
    pub mismatches: Vec<StateMismatch>,
    /// Windows in the tree but not in the daemon index.
    pub untracked: Vec<i64>,
    /// Windows in the daemon index but not in the tree.
    pub stale: Vec<i64>,
}

/// `config_show` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigShowResult {
    pub files: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[cfg(test)]
#[path = "methods_tests.rs"]
mod methods_tests;
