// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace assignment on window::new.
//!
//! Four tiers, first hit wins:
//!   1. app-specific hooks (VS Code title parsing)
//!   2. I3PM_TARGET_WORKSPACE from the window's environment
//!   3. I3PM_APP_NAME → registry preferred workspace
//!   4. tiered class match → registry preferred workspace
//! Fallback is the currently focused workspace. Targets outside 1-10
//! are rejected and fall through to the fallback.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, info, warn};

use i3pm_core::{match_registry, AppEntry};

use crate::telemetry::perf::PerformanceMetrics;

/// Valid direct-assignment range.
const WORKSPACE_MIN: i32 = 1;
const WORKSPACE_MAX: i32 = 10;

/// Which tier produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentSource {
    AppHandler,
    EnvVar,
    Registry,
    ClassMatch,
    Fallback,
}

impl AssignmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentSource::AppHandler => "app_handler",
            AssignmentSource::EnvVar => "env_var",
            AssignmentSource::Registry => "registry",
            AssignmentSource::ClassMatch => "class_match",
            AssignmentSource::Fallback => "fallback",
        }
    }
}

/// Result of one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceAssignment {
    pub workspace: i32,
    pub source: AssignmentSource,
    /// Project name derived by an app hook (VS Code title), when the
    /// hook knows better than the mark pipeline.
    pub project_override: Option<String>,
    pub duration_ms: f64,
}

/// Inputs for one assignment pass.
pub struct AssignInput<'a> {
    pub window_id: i64,
    pub class: &'a str,
    pub instance: &'a str,
    pub title: &'a str,
    pub env: &'a HashMap<String, String>,
    pub registry: &'a [AppEntry],
    pub current_workspace: i32,
}

/// The assigner with its per-tier counters.
pub struct WorkspaceAssigner {
    pub assignments_total: u64,
    pub by_tier: HashMap<AssignmentSource, u64>,
}

impl Default for WorkspaceAssigner {
    fn default() -> Self {
        Self::new()
    }
}

// Literal pattern, compiled once.
#[allow(clippy::unwrap_used)]
fn vscode_title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:Code - )?([^-]+) -").unwrap())
}

impl WorkspaceAssigner {
    pub fn new() -> Self {
        Self { assignments_total: 0, by_tier: HashMap::new() }
    }

    /// Run the tiers and record telemetry.
    pub fn assign(&mut self, input: &AssignInput<'_>, perf: &mut PerformanceMetrics) -> WorkspaceAssignment {
        let start = Instant::now();
        self.assignments_total += 1;

        let (workspace, source, project_override) = self.run_tiers(input);

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        perf.record("workspace_assignment", duration_ms);
        *self.by_tier.entry(source).or_insert(0) += 1;

        info!(
            window_id = input.window_id,
            workspace,
            source = source.as_str(),
            "workspace assigned"
        );

        WorkspaceAssignment { workspace, source, project_override, duration_ms }
    }

    fn run_tiers(&self, input: &AssignInput<'_>) -> (i32, AssignmentSource, Option<String>) {
        // Tier 1: app-specific hook.
        if let Some((workspace, project)) = app_hook(input.class, input.title) {
            if validate(workspace) {
                return (workspace, AssignmentSource::AppHandler, project);
            }
            warn!(workspace, "app hook produced out-of-range workspace");
        }

        // Tier 2: I3PM_TARGET_WORKSPACE.
        if let Some(raw) = input.env.get("I3PM_TARGET_WORKSPACE") {
            match raw.parse::<i32>() {
                Ok(workspace) if validate(workspace) => {
                    return (workspace, AssignmentSource::EnvVar, None);
                }
                _ => warn!(value = raw.as_str(), "invalid I3PM_TARGET_WORKSPACE"),
            }
        }

        // Tier 3: I3PM_APP_NAME → registry.
        if let Some(app_name) = input.env.get("I3PM_APP_NAME") {
            if let Some(entry) = input.registry.iter().find(|e| &e.name == app_name) {
                if let Some(workspace) = entry.valid_preferred_workspace() {
                    let workspace = i32::from(workspace);
                    if validate(workspace) {
                        return (workspace, AssignmentSource::Registry, None);
                    }
                }
            }
            debug!(app = app_name.as_str(), "I3PM_APP_NAME without usable registry workspace");
        }

        // Tier 4: tiered class match → registry.
        if let Some((entry, kind)) = match_registry(input.registry, input.class, input.instance) {
            if let Some(workspace) = entry.valid_preferred_workspace() {
                let workspace = i32::from(workspace);
                if validate(workspace) {
                    debug!(
                        app = entry.name.as_str(),
                        match_kind = %kind,
                        "workspace from class match"
                    );
                    return (workspace, AssignmentSource::ClassMatch, None);
                }
            }
        }

        (input.current_workspace, AssignmentSource::Fallback, None)
    }
}

fn validate(workspace: i32) -> bool {
    (WORKSPACE_MIN..=WORKSPACE_MAX).contains(&workspace)
}

/// App-specific hooks keyed by window class.
///
/// VS Code: derive the project from the title
/// (`project - folder - Visual Studio Code`), pin to workspace 2.
/// Also re-run by the title handler, so both paths share one parser.
pub(crate) fn app_hook(class: &str, title: &str) -> Option<(i32, Option<String>)> {
    if class != "Code" {
        return None;
    }
    let captures = vscode_title_regex().captures(title)?;
    let project = captures.get(1)?.as_str().trim().to_lowercase();
    if project.is_empty() {
        return None;
    }
    Some((2, Some(project)))
}

#[cfg(test)]
#[path = "assign_tests.rs"]
mod assign_tests;
