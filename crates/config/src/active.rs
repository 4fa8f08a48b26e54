// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! active-project.json and active-worktree.json.
//!
//! The active project pointer is the one file both the daemon and
//! launchers write, so updates go through the advisory-locked atomic
//! path.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use i3pm_core::ActiveProjectState;

use crate::atomic::{locked_update, read_json};
use crate::error::ConfigError;
use crate::paths::ConfigPaths;

/// active-worktree.json contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveWorktree {
    pub qualified_name: String,
    pub directory: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Read the active project pointer. Absent file means global mode.
pub fn load_active_project(paths: &ConfigPaths) -> Result<ActiveProjectState, ConfigError> {
    match read_json(&paths.active_project_file()) {
        Ok(state) => Ok(state),
        Err(ConfigError::NotFound { .. }) => Ok(ActiveProjectState::default()),
        Err(e) => Err(e),
    }
}

/// Persist the active project pointer atomically.
pub fn store_active_project(
    paths: &ConfigPaths,
    project_name: Option<String>,
) -> Result<ActiveProjectState, ConfigError> {
    locked_update(&paths.active_project_file(), |_| ActiveProjectState::new(project_name))
}

/// Read active-worktree.json; absent is `None`, not an error.
pub fn load_active_worktree(paths: &ConfigPaths) -> Result<Option<ActiveWorktree>, ConfigError> {
    match read_json(&paths.active_worktree_file()) {
        Ok(wt) => Ok(Some(wt)),
        Err(ConfigError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn store_active_worktree(
    paths: &ConfigPaths,
    worktree: &ActiveWorktree,
) -> Result<(), ConfigError> {
    crate::atomic::atomic_write_json(&paths.active_worktree_file(), worktree)
}

#[cfg(test)]
#[path = "active_tests.rs"]
mod active_tests;
