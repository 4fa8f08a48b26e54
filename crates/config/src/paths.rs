// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration paths.
//!
//! Single source of truth for every file the daemon reads or writes.
//! `I3PM_CONFIG_DIR` / `I3PM_DATA_DIR` override the XDG roots so tests
//! can run against a tempdir.

use std::path::{Path, PathBuf};

/// Resolved configuration roots.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub i3_config_dir: PathBuf,
    pub sway_config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl ConfigPaths {
    /// Resolve from the environment:
    /// `I3PM_CONFIG_DIR` > `$XDG_CONFIG_HOME` > `~/.config`.
    pub fn resolve() -> Self {
        if let Ok(root) = std::env::var("I3PM_CONFIG_DIR") {
            let root = PathBuf::from(root);
            let data = std::env::var("I3PM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| root.join("share"));
            return Self::rooted(&root, &data);
        }

        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"));
        let data_home = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
            .unwrap_or_else(|| PathBuf::from(".local/share"));

        Self {
            i3_config_dir: config_home.join("i3"),
            sway_config_dir: config_home.join("sway"),
            data_dir: data_home.join("i3pm"),
        }
    }

    /// Root everything under one directory (tests).
    pub fn rooted(config_root: &Path, data_root: &Path) -> Self {
        Self {
            i3_config_dir: config_root.join("i3"),
            sway_config_dir: config_root.join("sway"),
            data_dir: data_root.to_path_buf(),
        }
    }

    pub fn repos_file(&self) -> PathBuf {
        self.i3_config_dir.join("repos.json")
    }

    pub fn accounts_file(&self) -> PathBuf {
        self.i3_config_dir.join("accounts.json")
    }

    pub fn active_worktree_file(&self) -> PathBuf {
        self.i3_config_dir.join("active-worktree.json")
    }

    pub fn active_project_file(&self) -> PathBuf {
        self.i3_config_dir.join("active-project.json")
    }

    pub fn discovery_config_file(&self) -> PathBuf {
        self.i3_config_dir.join("discovery-config.json")
    }

    pub fn app_classes_file(&self) -> PathBuf {
        self.i3_config_dir.join("app-classes.json")
    }

    pub fn app_registry_file(&self) -> PathBuf {
        self.i3_config_dir.join("application-registry.json")
    }

    pub fn window_rules_file(&self) -> PathBuf {
        self.sway_config_dir.join("window-rules.json")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.i3_config_dir.join("projects")
    }

    pub fn project_file(&self, name: &str) -> PathBuf {
        self.projects_dir().join(format!("{}.json", sanitize_name(name)))
    }

    pub fn layouts_dir(&self) -> PathBuf {
        self.data_dir.join("layouts")
    }

    pub fn layout_file(&self, project: &str, layout: &str) -> PathBuf {
        self.layouts_dir().join(sanitize_name(project)).join(format!("{layout}.json"))
    }

    /// Create every directory the daemon expects. Idempotent.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            &self.i3_config_dir,
            &self.sway_config_dir,
            &self.projects_dir(),
            &self.data_dir,
            &self.layouts_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Qualified project names contain `/` and `:`; both are replaced for
/// filesystem use.
fn sanitize_name(name: &str) -> String {
    name.replace(['/', ':'], "-")
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod paths_tests;
