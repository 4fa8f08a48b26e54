// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! window-rules.json: ordered rule list for the classification pipeline.

use i3pm_core::{ClassifyCtx, WindowRule};

use crate::atomic::read_json;
use crate::error::ConfigError;
use crate::paths::ConfigPaths;

/// Load rules sorted ready for evaluation (priority descending).
pub fn load_window_rules(paths: &ConfigPaths) -> Result<Vec<WindowRule>, ConfigError> {
    let rules: Vec<WindowRule> = match read_json(&paths.window_rules_file()) {
        Ok(rules) => rules,
        Err(ConfigError::NotFound { .. }) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    Ok(ClassifyCtx::sorted_rules(rules))
}

#[cfg(test)]
#[path = "window_rules_tests.rs"]
mod window_rules_tests;
