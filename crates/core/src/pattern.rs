// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pattern rules for window class classification.
//!
//! A pattern is disambiguated by prefix: `glob:…` matches with shell
//! globbing, `regex:…` matches by substring search, anything else is a
//! literal equality test.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Scope;

/// Errors from pattern rule construction.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern cannot be empty")]
    Empty,

    #[error("invalid regex pattern '{pattern}': {source}")]
    BadRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    BadGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Compiled matcher behind a pattern string.
#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Glob(glob::Pattern),
    Regex(Regex),
}

/// A pattern-based classification rule.
///
/// Higher `priority` rules are evaluated first. The matcher is compiled
/// once at construction; an invalid regex or glob is a construction
/// error, never a silent non-match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPatternRule", into = "RawPatternRule")]
pub struct PatternRule {
    pattern: String,
    pub scope: Scope,
    pub priority: u32,
    pub description: String,
    matcher: Matcher,
}

/// On-disk shape of a pattern rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPatternRule {
    pattern: String,
    scope: Scope,
    #[serde(default)]
    priority: u32,
    #[serde(default)]
    description: String,
}

impl TryFrom<RawPatternRule> for PatternRule {
    type Error = PatternError;

    fn try_from(raw: RawPatternRule) -> Result<Self, Self::Error> {
        PatternRule::with_description(raw.pattern, raw.scope, raw.priority, raw.description)
    }
}

impl From<PatternRule> for RawPatternRule {
    fn from(rule: PatternRule) -> Self {
        Self {
            pattern: rule.pattern,
            scope: rule.scope,
            priority: rule.priority,
            description: rule.description,
        }
    }
}

impl PartialEq for PatternRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.scope == other.scope
            && self.priority == other.priority
    }
}

impl Eq for PatternRule {}

impl PatternRule {
    pub fn new(
        pattern: impl Into<String>,
        scope: Scope,
        priority: u32,
    ) -> Result<Self, PatternError> {
        Self::with_description(pattern, scope, priority, String::new())
    }

    pub fn with_description(
        pattern: impl Into<String>,
        scope: Scope,
        priority: u32,
        description: impl Into<String>,
    ) -> Result<Self, PatternError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let matcher = if let Some(raw) = pattern.strip_prefix("glob:") {
            let compiled = glob::Pattern::new(raw)
                .map_err(|source| PatternError::BadGlob { pattern: raw.to_string(), source })?;
            Matcher::Glob(compiled)
        } else if let Some(raw) = pattern.strip_prefix("regex:") {
            let compiled = Regex::new(raw)
                .map_err(|source| PatternError::BadRegex { pattern: raw.to_string(), source })?;
            Matcher::Regex(compiled)
        } else {
            Matcher::Literal(pattern.clone())
        };

        Ok(Self { pattern, scope, priority, description: description.into(), matcher })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Test a window class against this pattern.
    ///
    /// Regex patterns use substring search, not full-string match.
    pub fn matches(&self, window_class: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(lit) => window_class == lit,
            Matcher::Glob(g) => g.matches(window_class),
            Matcher::Regex(re) => re.is_match(window_class),
        }
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod pattern_tests;
