// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch-correlation scoring.
//!
//! A launcher announces "a window for app A / project P is about to
//! appear"; when a window shows up the daemon scores it against every
//! unmatched pending launch. Scoring here is pure; the registry in the
//! daemon crate owns the mutable pending map.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::identity::{match_window_class, MatchKind};

/// Correlation window: a pending launch older than this can never match.
pub const LAUNCH_TIMEOUT_SECS: f64 = 5.0;

/// Minimum confidence for a match to be accepted.
pub const CONFIDENCE_THRESHOLD: f64 = 0.6;

/// A launch notification waiting for its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLaunch {
    pub app_name: String,
    pub project_name: String,
    pub project_directory: PathBuf,
    pub launcher_pid: Option<i32>,
    pub workspace_number: Option<i32>,
    pub expected_class: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Epoch seconds at notification time.
    pub timestamp: f64,
    #[serde(default)]
    pub matched: bool,
}

impl PendingLaunch {
    /// Registry key: `app_name-<epoch_ms>`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.app_name, (self.timestamp * 1000.0) as u64)
    }

    pub fn age_secs(&self, now: f64) -> f64 {
        now - self.timestamp
    }
}

/// The window side of a correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchWindowInfo {
    pub window_id: i64,
    pub window_class: String,
    #[serde(default)]
    pub window_instance: String,
    pub window_pid: Option<i32>,
    pub workspace_number: Option<i32>,
    /// Epoch seconds at window::new time.
    pub timestamp: f64,
}

/// Confidence bands. Anything below Medium is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
    Exact,
}

impl ConfidenceBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            ConfidenceBand::Exact
        } else if score >= 0.8 {
            ConfidenceBand::High
        } else if score >= CONFIDENCE_THRESHOLD {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Individual signals contributing to a score, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ScoreSignal {
    ClassMatch { kind: MatchKind },
    ClassMismatch,
    TimeDelta { delta_secs: f64, bonus: f64 },
    OutsideWindow { delta_secs: f64 },
    WorkspaceMatch,
}

/// Score a (launch, window) pair.
///
/// Class mismatch or a time delta outside [0, 5) is an immediate zero.
/// Otherwise: 0.5 base, time bonus 0.3/0.2/0.1 by recency, +0.2 for a
/// workspace match, capped at 1.0.
pub fn score(launch: &PendingLaunch, window: &LaunchWindowInfo) -> (f64, Vec<ScoreSignal>) {
    let mut signals = Vec::new();

    let class_kind = match_window_class(
        &launch.expected_class,
        &window.window_class,
        &window.window_instance,
        &launch.aliases,
    );
    let Some(kind) = class_kind else {
        signals.push(ScoreSignal::ClassMismatch);
        return (0.0, signals);
    };

    let delta = window.timestamp - launch.timestamp;
    if delta < 0.0 || delta >= LAUNCH_TIMEOUT_SECS {
        signals.push(ScoreSignal::OutsideWindow { delta_secs: delta });
        return (0.0, signals);
    }

    signals.push(ScoreSignal::ClassMatch { kind });
    let mut score = 0.5;

    let bonus = if delta < 1.0 {
        0.3
    } else if delta < 2.0 {
        0.2
    } else {
        0.1
    };
    score += bonus;
    signals.push(ScoreSignal::TimeDelta { delta_secs: delta, bonus });

    if let (Some(ws_window), Some(ws_launch)) = (window.workspace_number, launch.workspace_number) {
        if ws_window == ws_launch {
            score += 0.2;
            signals.push(ScoreSignal::WorkspaceMatch);
        }
    }

    (score.min(1.0), signals)
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod launch_tests;
