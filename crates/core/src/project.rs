// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project and active-project models.
//!
//! Projects are keyed by name; worktree projects use the qualified form
//! `account/repo:branch`. Relations (worktree → parent) are name
//! lookups, never object references, so the in-memory index stays an
//! acyclic `map<name, Project>`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Where a project came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Local,
    Worktree,
    Remote,
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Local
    }
}

/// Branch metadata for worktree projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchMetadata {
    /// Branch kind, e.g. "feature", "fix".
    pub branch_type: Option<String>,
    pub number: Option<u32>,
    pub full_name: String,
}

/// A named project environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub display_name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    pub directory: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scoped_classes: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub workspace_preferences: HashMap<String, u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_metadata: Option<BranchMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_project: Option<String>,
    #[serde(default)]
    pub source_type: SourceType,
}

fn default_icon() -> String {
    "\u{1F4C1}".to_string()
}

/// Errors from project validation.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project name cannot be empty")]
    EmptyName,

    #[error("invalid project name '{0}': allowed characters are [A-Za-z0-9_.-/:]")]
    BadName(String),

    #[error("project directory must be absolute: {0}")]
    RelativeDirectory(PathBuf),

    #[error("project directory does not exist: {0}")]
    MissingDirectory(PathBuf),
}

fn valid_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-' | b'/' | b':')
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Result<Self, ProjectError> {
        let name = name.into();
        validate_name(&name)?;
        let directory = directory.into();
        if !directory.is_absolute() {
            return Err(ProjectError::RelativeDirectory(directory));
        }
        Ok(Self {
            name,
            display_name: display_name.into(),
            icon: default_icon(),
            directory,
            scoped_classes: Vec::new(),
            workspace_preferences: HashMap::new(),
            branch_metadata: None,
            parent_project: None,
            source_type: SourceType::Local,
        })
    }

    pub fn is_worktree(&self) -> bool {
        self.source_type == SourceType::Worktree
    }

    /// Check the directory on disk. Separate from construction so loads
    /// can quarantine rather than drop projects with vanished paths.
    pub fn directory_exists(&self) -> bool {
        self.directory.is_dir()
    }
}

pub fn validate_name(name: &str) -> Result<(), ProjectError> {
    if name.is_empty() {
        return Err(ProjectError::EmptyName);
    }
    if !name.bytes().all(valid_name_byte) {
        return Err(ProjectError::BadName(name.to_string()));
    }
    Ok(())
}

/// Split a qualified worktree name `account/repo:branch`.
///
/// The branch may contain slashes (`feature/123-foo`); the split is at
/// the first colon after the `account/repo` prefix.
pub fn split_qualified(name: &str) -> Option<(&str, &str, &str)> {
    let (repo_part, branch) = name.split_once(':')?;
    let (account, repo) = repo_part.split_once('/')?;
    if account.is_empty() || repo.is_empty() || branch.is_empty() {
        return None;
    }
    Some((account, repo, branch))
}

pub fn join_qualified(account: &str, repo: &str, branch: &str) -> String {
    format!("{account}/{repo}:{branch}")
}

/// Process-wide active project pointer. `None` is global mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveProjectState {
    pub project_name: Option<String>,
}

impl ActiveProjectState {
    pub fn new(project_name: Option<String>) -> Self {
        Self { project_name }
    }

    pub fn is_active(&self, project_name: &str) -> bool {
        self.project_name.as_deref() == Some(project_name)
    }

    pub fn is_global_mode(&self) -> bool {
        self.project_name.is_none()
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod project_tests;
