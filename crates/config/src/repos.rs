// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! repos.json loader with TTL caching.
//!
//! The discovery scanner owns the file; the daemon only reads it. It is
//! hot (panel queries, classification, worktree lookups), so reads go
//! through a 5 s cache. Validation is structural and returns every
//! problem, path-qualified, not just the first.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::ConfigError;
use crate::paths::ConfigPaths;

pub const CACHE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorktreeEntry {
    pub branch: String,
    pub path: PathBuf,
    #[serde(default)]
    pub is_bare: bool,
    #[serde(default)]
    pub is_main_worktree: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub account: String,
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub worktrees: Vec<WorktreeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReposConfig {
    pub version: String,
    pub repositories: Vec<RepositoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl ReposConfig {
    /// Find a worktree by qualified name `account/repo:branch`.
    pub fn find_worktree(&self, qualified: &str) -> Option<(&RepositoryEntry, &WorktreeEntry)> {
        let (account, repo, branch) = i3pm_core::split_qualified(qualified)?;
        let repository = self
            .repositories
            .iter()
            .find(|r| r.account == account && r.name == repo)?;
        let worktree = repository.worktrees.iter().find(|w| w.branch == branch)?;
        Some((repository, worktree))
    }
}

/// Structural validation with path-qualified messages.
///
/// Runs against the raw JSON value so a single bad entry reports its
/// exact location instead of failing the whole decode opaquely.
pub fn validate_repos_value(value: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(obj) = value.as_object() else {
        return vec!["root: expected an object".to_string()];
    };

    if !obj.contains_key("version") {
        errors.push("version: missing required field".to_string());
    }

    let Some(repos) = obj.get("repositories") else {
        errors.push("repositories: missing required field".to_string());
        return errors;
    };
    let Some(repos) = repos.as_array() else {
        errors.push("repositories: expected an array".to_string());
        return errors;
    };

    for (i, repo) in repos.iter().enumerate() {
        let Some(repo_obj) = repo.as_object() else {
            errors.push(format!("repositories[{i}]: expected an object"));
            continue;
        };
        for field in ["account", "name", "path"] {
            match repo_obj.get(field) {
                Some(v) if v.is_string() => {}
                Some(_) => errors.push(format!("repositories[{i}].{field}: expected a string")),
                None => errors.push(format!("repositories[{i}].{field}: missing required field")),
            }
        }
        match repo_obj.get("worktrees") {
            None => errors.push(format!("repositories[{i}].worktrees: missing required field")),
            Some(Value::Array(worktrees)) => {
                for (j, wt) in worktrees.iter().enumerate() {
                    let Some(wt_obj) = wt.as_object() else {
                        errors.push(format!(
                            "repositories[{i}].worktrees[{j}]: expected an object"
                        ));
                        continue;
                    };
                    for field in ["branch", "path"] {
                        if !wt_obj.get(field).map(Value::is_string).unwrap_or(false) {
                            errors.push(format!(
                                "repositories[{i}].worktrees[{j}].{field}: missing or not a string"
                            ));
                        }
                    }
                }
            }
            Some(_) => errors.push(format!("repositories[{i}].worktrees: expected an array")),
        }
    }

    errors
}

struct CacheSlot {
    config: Arc<ReposConfig>,
    loaded_at: Instant,
}

/// Cached repos.json access.
pub struct ReposLoader {
    path: PathBuf,
    ttl: Duration,
    cache: Mutex<Option<CacheSlot>>,
}

impl ReposLoader {
    pub fn new(paths: &ConfigPaths) -> Self {
        Self { path: paths.repos_file(), ttl: CACHE_TTL, cache: Mutex::new(None) }
    }

    pub fn with_ttl(paths: &ConfigPaths, ttl: Duration) -> Self {
        Self { path: paths.repos_file(), ttl, cache: Mutex::new(None) }
    }

    /// Load, serving from cache while the TTL holds.
    pub fn load(&self) -> Result<Arc<ReposConfig>, ConfigError> {
        {
            let cache = self.cache.lock();
            if let Some(slot) = cache.as_ref() {
                if slot.loaded_at.elapsed() < self.ttl {
                    debug!("repos.json served from cache");
                    return Ok(Arc::clone(&slot.config));
                }
            }
        }
        self.reload()
    }

    /// Drop the cache; the next `load` reads from disk.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
        debug!("repos.json cache invalidated");
    }

    fn reload(&self) -> Result<Arc<ReposConfig>, ConfigError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::not_found(
                    &self.path,
                    "Run 'i3pm discover' to scan for repositories.",
                ));
            }
            Err(e) => return Err(ConfigError::from_io(e, &self.path)),
        };

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ConfigError::parse_one(format!("{}: {e}", self.path.display())))?;

        let errors = validate_repos_value(&value);
        if !errors.is_empty() {
            return Err(ConfigError::Parse(errors));
        }

        let config: ReposConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::parse_one(format!("{}: {e}", self.path.display())))?;

        let config = Arc::new(config);
        *self.cache.lock() = Some(CacheSlot { config: Arc::clone(&config), loaded_at: Instant::now() });
        Ok(config)
    }
}

#[cfg(test)]
#[path = "repos_tests.rs"]
mod repos_tests;
