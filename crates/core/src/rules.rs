// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Window rules: a pattern plus the actions to apply when it matches.
//!
//! Two on-disk formats coexist. The legacy format carries a bare
//! `workspace` and/or raw `command` string; the structured format
//! carries a list of typed actions discriminated on `type`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Scope;
use crate::pattern::{PatternError, PatternRule};

/// Structured rule action, tagged on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleAction {
    /// `move container to workspace number <target>`
    Workspace { target: u8 },
    /// `mark <value>` for project association and tracking.
    Mark { value: String },
    /// `floating enable` / `floating disable`
    Float { enable: bool },
    /// `layout <mode>` on the containing container.
    Layout { mode: LayoutMode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Tabbed,
    Stacked,
    Splitv,
    Splith,
}

/// Rule behavior modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleModifier {
    Global,
    Default,
    OnClose,
    Title,
}

/// Errors from rule construction and validation.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("workspace must be 1-99, got {0}")]
    WorkspaceRange(u8),

    #[error("mark value must match [A-Za-z0-9_-]+: '{0}'")]
    BadMark(String),

    #[error("blacklist only valid with GLOBAL modifier")]
    BlacklistWithoutGlobal,
}

/// A window classification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWindowRule", into = "RawWindowRule")]
pub struct WindowRule {
    pub pattern_rule: PatternRule,
    /// Legacy format target workspace.
    pub workspace: Option<u8>,
    /// Legacy format raw command.
    pub command: Option<String>,
    /// Structured actions (preferred format).
    pub actions: Option<Vec<RuleAction>>,
    pub modifier: Option<RuleModifier>,
    /// Classes excluded from a GLOBAL rule.
    pub blacklist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawWindowRule {
    pattern_rule: PatternRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workspace: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actions: Option<Vec<RuleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modifier: Option<RuleModifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    blacklist: Vec<String>,
}

impl TryFrom<RawWindowRule> for WindowRule {
    type Error = RuleError;

    fn try_from(raw: RawWindowRule) -> Result<Self, Self::Error> {
        WindowRule::new(
            raw.pattern_rule,
            raw.workspace,
            raw.command,
            raw.actions,
            raw.modifier,
            raw.blacklist,
        )
    }
}

impl From<WindowRule> for RawWindowRule {
    fn from(rule: WindowRule) -> Self {
        Self {
            pattern_rule: rule.pattern_rule,
            workspace: rule.workspace,
            command: rule.command,
            actions: rule.actions,
            modifier: rule.modifier,
            blacklist: rule.blacklist,
        }
    }
}

impl WindowRule {
    pub fn new(
        pattern_rule: PatternRule,
        workspace: Option<u8>,
        command: Option<String>,
        actions: Option<Vec<RuleAction>>,
        modifier: Option<RuleModifier>,
        blacklist: Vec<String>,
    ) -> Result<Self, RuleError> {
        if let Some(ws) = workspace {
            if !(1..=99).contains(&ws) {
                return Err(RuleError::WorkspaceRange(ws));
            }
        }
        if let Some(actions) = &actions {
            for action in actions {
                validate_action(action)?;
            }
        }
        if !blacklist.is_empty() && modifier != Some(RuleModifier::Global) {
            return Err(RuleError::BlacklistWithoutGlobal);
        }
        Ok(Self { pattern_rule, workspace, command, actions, modifier, blacklist })
    }

    /// Convenience constructor for a pattern-plus-workspace rule.
    pub fn with_workspace(pattern_rule: PatternRule, workspace: u8) -> Result<Self, RuleError> {
        Self::new(pattern_rule, Some(workspace), None, None, None, Vec::new())
    }

    pub fn priority(&self) -> u32 {
        self.pattern_rule.priority
    }

    pub fn scope(&self) -> Scope {
        self.pattern_rule.scope
    }

    pub fn pattern(&self) -> &str {
        self.pattern_rule.pattern()
    }

    /// Target workspace from either format. Structured actions win over
    /// the legacy field when both are present.
    pub fn workspace_target(&self) -> Option<u8> {
        if let Some(actions) = &self.actions {
            for action in actions {
                if let RuleAction::Workspace { target } = action {
                    return Some(*target);
                }
            }
        }
        self.workspace
    }

    /// Test the rule against a window.
    ///
    /// TITLE rules match the pattern against the title instead of the
    /// class. GLOBAL rules never match blacklisted classes.
    pub fn matches(&self, window_class: &str, window_title: &str) -> bool {
        let subject = if self.modifier == Some(RuleModifier::Title) {
            window_title
        } else {
            window_class
        };
        if !self.pattern_rule.matches(subject) {
            return false;
        }
        if self.modifier == Some(RuleModifier::Global)
            && self.blacklist.iter().any(|b| b == window_class)
        {
            return false;
        }
        true
    }
}

fn validate_action(action: &RuleAction) -> Result<(), RuleError> {
    match action {
        RuleAction::Workspace { target } => {
            if !(1..=99).contains(target) {
                return Err(RuleError::WorkspaceRange(*target));
            }
        }
        RuleAction::Mark { value } => {
            let ok = !value.is_empty()
                && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
            if !ok {
                return Err(RuleError::BadMark(value.clone()));
            }
        }
        RuleAction::Float { .. } | RuleAction::Layout { .. } => {}
    }
    Ok(())
}

impl RuleAction {
    /// Render the WM command this action corresponds to.
    pub fn to_command(&self) -> String {
        match self {
            RuleAction::Workspace { target } => {
                format!("move container to workspace number {target}")
            }
            RuleAction::Mark { value } => format!("mark {value}"),
            RuleAction::Float { enable: true } => "floating enable".to_string(),
            RuleAction::Float { enable: false } => "floating disable".to_string(),
            RuleAction::Layout { mode } => format!("layout {}", mode.as_str()),
        }
    }
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Tabbed => "tabbed",
            LayoutMode::Stacked => "stacked",
            LayoutMode::Splitv => "splitv",
            LayoutMode::Splith => "splith",
        }
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod rules_tests;
