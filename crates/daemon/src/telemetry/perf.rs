// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-operation latency metrics.
//!
//! Keeps the last 100 samples per operation and derives count, avg,
//! median, min, max, p95 and p99 from them. An op exceeding twice its
//! target logs a warning.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// Samples retained per operation.
const MAX_HISTORY: usize = 100;

/// Latency targets in milliseconds.
const TARGET_PROJECT_SWITCH_MS: f64 = 100.0;
const TARGET_WINDOW_MARK_MS: f64 = 100.0;
const TARGET_EVENT_PROCESS_MS: f64 = 50.0;
const TARGET_DEFAULT_MS: f64 = 100.0;

/// Derived statistics for one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStats {
    pub operation: String,
    pub count: u64,
    pub avg_ms: f64,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

#[derive(Debug, Default)]
struct OperationSamples {
    total_count: u64,
    total_ms: f64,
    min_ms: f64,
    max_ms: f64,
    recent: VecDeque<f64>,
}

impl OperationSamples {
    fn record(&mut self, duration_ms: f64) {
        if self.total_count == 0 {
            self.min_ms = duration_ms;
        } else {
            self.min_ms = self.min_ms.min(duration_ms);
        }
        self.total_count += 1;
        self.total_ms += duration_ms;
        self.max_ms = self.max_ms.max(duration_ms);
        self.recent.push_back(duration_ms);
        if self.recent.len() > MAX_HISTORY {
            self.recent.pop_front();
        }
    }

    fn percentile(sorted: &[f64], fraction: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let index = ((sorted.len() as f64 * fraction) as usize).min(sorted.len() - 1);
        sorted[index]
    }

    fn stats(&self, operation: &str) -> OperationStats {
        let mut sorted: Vec<f64> = self.recent.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = if sorted.is_empty() {
            0.0
        } else if sorted.len() % 2 == 1 {
            sorted[sorted.len() / 2]
        } else {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
        };
        OperationStats {
            operation: operation.to_string(),
            count: self.total_count,
            avg_ms: if self.total_count == 0 { 0.0 } else { self.total_ms / self.total_count as f64 },
            median_ms: median,
            min_ms: if self.total_count == 0 { 0.0 } else { self.min_ms },
            max_ms: self.max_ms,
            p95_ms: Self::percentile(&sorted, 0.95),
            p99_ms: Self::percentile(&sorted, 0.99),
        }
    }
}

/// The metrics table.
#[derive(Debug, Default)]
pub struct PerformanceMetrics {
    operations: HashMap<String, OperationSamples>,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, operation: &str, duration_ms: f64) {
        self.operations.entry(operation.to_string()).or_default().record(duration_ms);

        let target = target_for(operation);
        if duration_ms > target * 2.0 {
            warn!(
                operation,
                duration_ms,
                target_ms = target,
                "slow operation"
            );
        }
    }

    pub fn stats(&self, operation: &str) -> Option<OperationStats> {
        self.operations.get(operation).map(|samples| samples.stats(operation))
    }

    pub fn all_stats(&self) -> Vec<OperationStats> {
        let mut stats: Vec<OperationStats> =
            self.operations.iter().map(|(name, samples)| samples.stats(name)).collect();
        stats.sort_by(|a, b| a.operation.cmp(&b.operation));
        stats
    }
}

fn target_for(operation: &str) -> f64 {
    match operation {
        "project_switch" => TARGET_PROJECT_SWITCH_MS,
        "window_mark" => TARGET_WINDOW_MARK_MS,
        "event_process" => TARGET_EVENT_PROCESS_MS,
        _ => TARGET_DEFAULT_MS,
    }
}

#[cfg(test)]
#[path = "perf_tests.rs"]
mod perf_tests;
