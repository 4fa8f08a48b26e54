// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! i3pm-config: the daemon's view of its JSON configuration files.
//!
//! Loading is tolerant (a broken file keeps the last-known-good cache
//! upstream); writing is atomic (tmp + fsync + rename) with rolling
//! backups and an advisory lock guarding read-modify-write cycles.

pub mod active;
pub mod app_classes;
pub mod app_registry;
pub mod atomic;
pub mod error;
pub mod layouts;
pub mod paths;
pub mod projects;
pub mod repos;
pub mod window_rules;

pub use active::{
    load_active_project, load_active_worktree, store_active_project, store_active_worktree,
    ActiveWorktree,
};
pub use app_classes::AppClasses;
pub use app_registry::load_app_registry;
pub use atomic::{atomic_write_json, locked_update, read_json};
pub use error::ConfigError;
pub use layouts::{LayoutSnapshot, LayoutStore, LayoutWindow};
pub use paths::ConfigPaths;
pub use projects::{ProjectList, ProjectStore};
pub use repos::{validate_repos_value, ReposConfig, ReposLoader, RepositoryEntry, WorktreeEntry};
pub use window_rules::load_window_rules;
