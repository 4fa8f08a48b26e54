// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project files under projects/.
//!
//! One JSON file per project plus list/load/save/delete. Projects whose
//! directory has vanished are quarantined on list: reported, kept on
//! disk, excluded from the returned set.

use std::collections::HashMap;
use tracing::warn;

use i3pm_core::Project;

use crate::atomic::{atomic_write_json, read_json};
use crate::error::ConfigError;
use crate::paths::ConfigPaths;

/// CRUD over the projects directory.
pub struct ProjectStore {
    paths: ConfigPaths,
}

/// Result of listing projects: the usable index plus quarantined names.
#[derive(Debug, Default)]
pub struct ProjectList {
    pub projects: HashMap<String, Project>,
    /// Projects whose directory no longer exists.
    pub quarantined: Vec<String>,
    /// Files that failed to decode.
    pub errors: Vec<String>,
}

impl ProjectStore {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn load(&self, name: &str) -> Result<Project, ConfigError> {
        let path = self.paths.project_file(name);
        match read_json(&path) {
            Err(ConfigError::NotFound { .. }) => {
                Err(ConfigError::not_found(path, format!("project '{name}' does not exist")))
            }
            other => other,
        }
    }

    pub fn save(&self, project: &Project) -> Result<(), ConfigError> {
        atomic_write_json(&self.paths.project_file(&project.name), project)
    }

    pub fn delete(&self, name: &str) -> Result<(), ConfigError> {
        let path = self.paths.project_file(name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConfigError::not_found(path, format!("project '{name}' does not exist")))
            }
            Err(e) => Err(ConfigError::from_io(e, &path)),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.paths.project_file(name).is_file()
    }

    /// List every project, quarantining entries with missing
    /// directories rather than failing the scan.
    pub fn list(&self) -> Result<ProjectList, ConfigError> {
        let dir = self.paths.projects_dir();
        let mut result = ProjectList::default();

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(result),
            Err(e) => return Err(ConfigError::from_io(e, &dir)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::from_io(e, &dir))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<Project>(&path) {
                Ok(project) => {
                    if project.directory_exists() {
                        result.projects.insert(project.name.clone(), project);
                    } else {
                        warn!(
                            project = project.name.as_str(),
                            directory = %project.directory.display(),
                            "quarantining project with missing directory"
                        );
                        result.quarantined.push(project.name);
                    }
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable project file");
                    result.errors.push(format!("{}: {e}", path.display()));
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod projects_tests;
