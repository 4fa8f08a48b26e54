// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! application-registry.json: the generated app registry projection.
//!
//! The registry is produced by the out-of-band Nix editor; the daemon
//! treats it as read-only. Entries with problems are skipped with a
//! warning so one bad app cannot take down classification.

use serde_json::Value;
use tracing::warn;

use i3pm_core::AppEntry;

use crate::atomic::read_json;
use crate::error::ConfigError;
use crate::paths::ConfigPaths;

/// Load the registry, skipping undecodable entries.
pub fn load_app_registry(paths: &ConfigPaths) -> Result<Vec<AppEntry>, ConfigError> {
    let value: Value = match read_json(&paths.app_registry_file()) {
        Ok(value) => value,
        Err(ConfigError::NotFound { .. }) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let Some(raw_entries) = value.as_array() else {
        return Err(ConfigError::parse_one(format!(
            "{}: expected a top-level array",
            paths.app_registry_file().display()
        )));
    };

    let mut entries = Vec::with_capacity(raw_entries.len());
    for (i, raw) in raw_entries.iter().enumerate() {
        match serde_json::from_value::<AppEntry>(raw.clone()) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(index = i, error = %e, "skipping invalid app registry entry"),
        }
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "app_registry_tests.rs"]
mod app_registry_tests;
