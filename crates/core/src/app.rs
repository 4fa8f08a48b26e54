// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application registry entries.
//!
//! The registry is generated out-of-band and read-only at runtime; the
//! daemon consults it for expected classes, preferred workspaces, and
//! launch commands.

use serde::{Deserialize, Serialize};

use crate::classify::Scope;
use crate::identity::{match_window_class, MatchKind};

/// One registered application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: String,
    pub display_name: String,
    pub expected_class: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub scope: Scope,
    /// Preferred workspace 1-70 (upper range used by multi-monitor roles).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_workspace: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_monitor_role: Option<String>,
    #[serde(default)]
    pub multi_instance: bool,
    #[serde(default)]
    pub floating: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    /// PWA fields, set when this entry is a progressive web app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ulid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
}

impl AppEntry {
    /// Tiered match of an observed window against this entry.
    pub fn matches_window(&self, class: &str, instance: &str) -> Option<MatchKind> {
        match_window_class(&self.expected_class, class, instance, &self.aliases)
    }

    /// Preferred workspace if it passes the registry's 1-70 bound.
    pub fn valid_preferred_workspace(&self) -> Option<u8> {
        self.preferred_workspace.filter(|ws| (1..=70).contains(ws))
    }
}

/// Find the registry entry matching a window, trying every entry in
/// order and returning the first tiered hit.
pub fn match_registry<'a>(
    entries: &'a [AppEntry],
    class: &str,
    instance: &str,
) -> Option<(&'a AppEntry, MatchKind)> {
    entries.iter().find_map(|entry| entry.matches_window(class, instance).map(|k| (entry, k)))
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
