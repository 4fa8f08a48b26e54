// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layout snapshots under the data directory.
//!
//! A snapshot is the daemon's record of which apps sat on which
//! workspaces for a project; restore replays it through the launcher
//! environment. The daemon stores and serves these; interpreting the
//! window geometry beyond workspace placement is up to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::atomic::{atomic_write_json, read_json};
use crate::error::ConfigError;
use crate::paths::ConfigPaths;

/// One captured window placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutWindow {
    pub app_name: String,
    pub window_class: String,
    pub workspace: i32,
    #[serde(default)]
    pub floating: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A saved layout for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub name: String,
    pub project: String,
    pub saved_at: DateTime<Utc>,
    pub windows: Vec<LayoutWindow>,
}

/// Layout file CRUD for one config root.
pub struct LayoutStore {
    paths: ConfigPaths,
}

impl LayoutStore {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn save(&self, snapshot: &LayoutSnapshot) -> Result<PathBuf, ConfigError> {
        let path = self.paths.layout_file(&snapshot.project, &snapshot.name);
        atomic_write_json(&path, snapshot)?;
        Ok(path)
    }

    pub fn load(&self, project: &str, layout: &str) -> Result<LayoutSnapshot, ConfigError> {
        let path = self.paths.layout_file(project, layout);
        match read_json(&path) {
            Err(ConfigError::NotFound { .. }) => Err(ConfigError::not_found(
                path,
                format!("no layout '{layout}' saved for project '{project}'"),
            )),
            other => other,
        }
    }

    pub fn delete(&self, project: &str, layout: &str) -> Result<(), ConfigError> {
        let path = self.paths.layout_file(project, layout);
        std::fs::remove_file(&path).map_err(|e| ConfigError::from_io(e, &path))
    }

    /// Layout names saved for a project, sorted.
    pub fn list(&self, project: &str) -> Result<Vec<String>, ConfigError> {
        let dir = self
            .paths
            .layout_file(project, "probe")
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ConfigError::from_io(e, &dir)),
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|x| x.to_str()) == Some("json") {
                    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Copy a layout to an external path (layout.export).
    pub fn export(
        &self,
        project: &str,
        layout: &str,
        destination: &Path,
    ) -> Result<(), ConfigError> {
        let snapshot = self.load(project, layout)?;
        atomic_write_json(destination, &snapshot)
    }
}

#[cfg(test)]
#[path = "layouts_tests.rs"]
mod layouts_tests;
