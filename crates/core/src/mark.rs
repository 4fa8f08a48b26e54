// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unified mark codec.
//!
//! Wire format: `scope:app:project:window_id`. The project segment may
//! itself contain colons (qualified worktree names), so parsing splits
//! from both ends: scope and app from the left, window id from the right.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::Scope;

/// A parsed unified window mark.
///
/// Exactly one unified mark is expected per window; any mark that does
/// not parse is treated as legacy or user-supplied and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub scope: Scope,
    pub app: String,
    pub project: String,
    pub window_id: i64,
}

impl Mark {
    pub fn new(scope: Scope, app: impl Into<String>, project: impl Into<String>, window_id: i64) -> Self {
        Self { scope, app: app.into(), project: project.into(), window_id }
    }

    /// Parse a mark string. Returns `None` for anything that is not a
    /// 4-or-more segment unified mark with a numeric trailing id —
    /// including the legacy 3-segment `scoped:project:id` format.
    pub fn parse(s: &str) -> Option<Self> {
        let scope = if s.starts_with("scoped:") {
            Scope::Scoped
        } else if s.starts_with("global:") {
            Scope::Global
        } else {
            return None;
        };

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 4 {
            return None;
        }

        let last = parts[parts.len() - 1];
        if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let window_id: i64 = last.parse().ok()?;

        let app = parts[1];
        if app.is_empty() {
            return None;
        }

        // Everything between app and window id is the project, colons intact.
        let project = parts[2..parts.len() - 1].join(":");
        if project.is_empty() {
            return None;
        }

        Some(Self { scope, app: app.to_string(), project, window_id })
    }

    /// Pick the unified mark out of a window's mark list, if any.
    pub fn from_marks<'a, I>(marks: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a String>,
    {
        marks.into_iter().find_map(|m| Self::parse(m))
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.scope, self.app, self.project, self.window_id)
    }
}

#[cfg(test)]
#[path = "mark_tests.rs"]
mod mark_tests;
