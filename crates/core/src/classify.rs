// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Window classification pipeline.
//!
//! Precedence, first match wins:
//!   1. active project `scoped_classes` (exact class equality)
//!   2. window rules, priority descending
//!   3. app-classes patterns, config order
//!   4. app-classes literal scoped/global lists
//!   5. default: global
//!
//! Classification is deterministic and side-effect free; the same
//! `(class, title, ctx)` always yields the same result.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::pattern::PatternRule;
use crate::rules::WindowRule;

/// Per-window visibility scope.
///
/// `Scoped` windows are visible only while their project is active;
/// `Global` windows are always visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Scoped,
    Global,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Scoped => write!(f, "scoped"),
            Scope::Global => write!(f, "global"),
        }
    }
}

/// Which tier of the pipeline produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Project,
    WindowRule,
    AppClasses,
    Default,
}

/// Result of classifying a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub scope: Scope,
    /// Target workspace, when the matching rule carries one.
    pub workspace: Option<u8>,
    pub source: ClassificationSource,
    /// Pattern of the rule that matched, for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Classification {
    fn default_global() -> Self {
        Self {
            scope: Scope::Global,
            workspace: None,
            source: ClassificationSource::Default,
            rule: None,
        }
    }
}

/// Inputs the pipeline consults besides the window itself.
///
/// `window_rules` must be sorted by priority descending before
/// evaluation; `sorted_rules` does this. `class_patterns` are consulted
/// in config order.
#[derive(Debug, Default, Clone)]
pub struct ClassifyCtx {
    /// `scoped_classes` of the active project, empty in global mode.
    pub active_scoped_classes: HashSet<String>,
    pub window_rules: Vec<WindowRule>,
    pub class_patterns: Vec<PatternRule>,
    pub scoped_classes: HashSet<String>,
    pub global_classes: HashSet<String>,
}

impl ClassifyCtx {
    /// Sort window rules for evaluation. Stable, so rules with equal
    /// priority keep their config order.
    pub fn sorted_rules(mut rules: Vec<WindowRule>) -> Vec<WindowRule> {
        rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
        rules
    }
}

/// Classify a window by class and title.
pub fn classify(class: &str, title: &str, ctx: &ClassifyCtx) -> Classification {
    // Tier 1: active project scoped_classes (exact equality)
    if ctx.active_scoped_classes.contains(class) {
        return Classification {
            scope: Scope::Scoped,
            workspace: None,
            source: ClassificationSource::Project,
            rule: None,
        };
    }

    // Tier 2: window rules, priority descending
    for rule in &ctx.window_rules {
        if rule.matches(class, title) {
            return Classification {
                scope: rule.scope(),
                workspace: rule.workspace_target(),
                source: ClassificationSource::WindowRule,
                rule: Some(rule.pattern().to_string()),
            };
        }
    }

    // Tier 3: app-classes patterns, config order
    for pattern in &ctx.class_patterns {
        if pattern.matches(class) {
            return Classification {
                scope: pattern.scope,
                workspace: None,
                source: ClassificationSource::AppClasses,
                rule: Some(pattern.pattern().to_string()),
            };
        }
    }

    // Tier 4: literal membership
    if ctx.scoped_classes.contains(class) {
        return Classification {
            scope: Scope::Scoped,
            workspace: None,
            source: ClassificationSource::AppClasses,
            rule: None,
        };
    }
    if ctx.global_classes.contains(class) {
        return Classification {
            scope: Scope::Global,
            workspace: None,
            source: ClassificationSource::AppClasses,
            rule: None,
        };
    }

    Classification::default_global()
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod classify_tests;
