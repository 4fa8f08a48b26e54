// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! app-classes.json: literal class lists plus pattern rules.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use i3pm_core::PatternRule;

use crate::atomic::read_json;
use crate::error::ConfigError;
use crate::paths::ConfigPaths;

/// Decoded app-classes configuration.
///
/// Patterns keep their config order; `classify` consults them in that
/// order after sorting by priority is applied at load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppClasses {
    #[serde(default)]
    pub scoped_classes: HashSet<String>,
    #[serde(default)]
    pub global_classes: HashSet<String>,
    #[serde(default)]
    pub class_patterns: Vec<PatternRule>,
}

impl AppClasses {
    pub fn load(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        let mut classes: AppClasses = match read_json(&paths.app_classes_file()) {
            Ok(classes) => classes,
            Err(ConfigError::NotFound { .. }) => {
                // An absent file is an empty config, not an error.
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };
        classes.sort_patterns();
        Ok(classes)
    }

    /// Stable sort by priority descending; equal priorities keep
    /// config order.
    pub fn sort_patterns(&mut self) {
        self.class_patterns.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Flag classes present in both literal lists; scoped wins at
    /// classification time, but the conflict is worth surfacing.
    pub fn conflicts(&self) -> Vec<String> {
        let mut conflicts: Vec<String> =
            self.scoped_classes.intersection(&self.global_classes).cloned().collect();
        conflicts.sort();
        for class in &conflicts {
            warn!(class = class.as_str(), "class listed as both scoped and global");
        }
        conflicts
    }
}

#[cfg(test)]
#[path = "app_classes_tests.rs"]
mod app_classes_tests;
