// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup recovery and state validation.
//!
//! `validate_all` walks a fixed checklist: directories, config files,
//! WM connection, window index, event buffer. Broken config files are
//! backed up aside and replaced with minimal valid defaults. Every fix
//! is idempotent; a second pass after fixes must report zero errors or
//! the recovery counts as incomplete.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use i3pm_core::Clock;

use crate::engine::Engine;
use crate::ipc::SwayApi;
use crate::subproc::Spawner;

/// Outcome of a validation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub fixes: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            fixes: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn fixed(&mut self, message: impl Into<String>) {
        self.fixes.push(message.into());
    }
}

/// Defaults written over unparseable config files.
fn default_content(file_name: &str) -> Option<Value> {
    match file_name {
        "active-project.json" => Some(json!({"project_name": null})),
        "app-classes.json" => {
            Some(json!({"scoped_classes": [], "global_classes": [], "class_patterns": []}))
        }
        "window-rules.json" => Some(json!([])),
        "repos.json" => Some(json!({"version": "1.0", "repositories": []})),
        _ => None,
    }
}

/// Run the full checklist against an engine.
pub async fn validate_all<S, P, C>(engine: &mut Engine<S, P, C>) -> ValidationReport
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    let mut report = ValidationReport::new();

    // 1. Directories.
    let paths = engine.paths().clone();
    match paths.ensure_dirs() {
        Ok(()) => {}
        Err(e) => report.error(format!("config directories: {e}")),
    }

    // 2. Config files: back up and rewrite anything unparseable.
    for (name, path) in [
        ("active-project.json", paths.active_project_file()),
        ("app-classes.json", paths.app_classes_file()),
        ("window-rules.json", paths.window_rules_file()),
        ("repos.json", paths.repos_file()),
    ] {
        if !path.is_file() {
            continue;
        }
        let readable = std::fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
            .is_some();
        if readable {
            continue;
        }
        report.error(format!("{name}: unparseable JSON"));
        let Some(default) = default_content(name) else { continue };
        let broken = path.with_file_name(format!(
            "{}.broken",
            path.file_name().and_then(|n| n.to_str()).unwrap_or(name)
        ));
        match std::fs::rename(&path, &broken) {
            Ok(()) => {
                warn!(file = name, backup = %broken.display(), "backed up broken config");
                if let Err(e) = i3pm_config::atomic_write_json(&path, &default) {
                    report.error(format!("{name}: rewrite failed: {e}"));
                } else {
                    report.fixed(format!("{name}: rewrote minimal default"));
                }
            }
            Err(e) => report.error(format!("{name}: backup failed: {e}")),
        }
    }

    // 3. Reload config now that files are sane.
    engine.reload_config();
    for error in engine.config_errors() {
        report.warning(format!("config: {error}"));
    }

    // 4. WM connection + index rebuild.
    engine.health.wm_connected = engine.sway_connected();
    if engine.sway_connected() {
        match engine.get_tree().await {
            Ok(tree) => {
                engine.rebuild_from_tree(&tree);
                report.fixed(format!(
                    "window index rebuilt: {} windows",
                    engine.window_count()
                ));
            }
            Err(e) => report.error(format!("get_tree failed: {e}")),
        }
    } else {
        // Not fatal: the reconnect loop owns getting the link back.
        report.warning("WM connection is down; reconnect loop active".to_string());
    }

    // 5. Orphaned project marks.
    for project in engine.orphaned_mark_projects() {
        report.warning(format!("mark references unknown project '{project}'"));
    }

    // 6. Event buffer integrity.
    if engine.ring_len() > engine.ring_capacity() {
        report.error(format!(
            "event ring exceeds bound: {} > {}",
            engine.ring_len(),
            engine.ring_capacity()
        ));
    }

    info!(
        valid = report.is_valid,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        fixes = report.fixes.len(),
        "validation pass complete"
    );
    report
}

/// Run validation, and when the first pass applied fixes, run again:
/// the second pass must be clean or recovery is incomplete.
pub async fn recover<S, P, C>(engine: &mut Engine<S, P, C>) -> ValidationReport
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    let first = validate_all(engine).await;
    if first.is_valid {
        return first;
    }

    let mut second = validate_all(engine).await;
    if !second.is_valid {
        warn!(errors = ?second.errors, "recovery incomplete after second pass");
        second.warnings.push("recovery incomplete: errors persisted after fixes".to_string());
    }
    // Carry the first pass's fix log so callers see what happened.
    second.fixes = [first.fixes, second.fixes].concat();
    second
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod recovery_tests;
