// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch registry: pending launch notifications and their correlation
//! to new windows.
//!
//! All mutation happens behind one async mutex; `add`, `find_match`,
//! `cleanup_expired` and `stats` serialize. The mutex is held only for
//! the synchronous critical section, never across an await.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use i3pm_core::{score, Clock, ConfidenceBand, LaunchWindowInfo, PendingLaunch};
use i3pm_wire::RegistryStatsSummary;

/// Launch registry keyed by `app_name-<epoch_ms>`.
pub struct LaunchRegistry<C: Clock> {
    inner: Mutex<Inner>,
    clock: C,
    timeout: Duration,
}

#[derive(Default)]
struct Inner {
    pending: HashMap<String, PendingLaunch>,
    total_notifications: u64,
    total_matched: u64,
    total_expired: u64,
    total_failed_correlation: u64,
}

impl<C: Clock> LaunchRegistry<C> {
    pub fn new(clock: C, timeout: Duration) -> Self {
        Self { inner: Mutex::new(Inner::default()), clock, timeout }
    }

    /// Register a pending launch, sweeping expired entries first.
    /// Returns the registry key.
    pub async fn add(&self, launch: PendingLaunch) -> String {
        let now = self.clock.epoch_secs_f64();
        let mut inner = self.inner.lock().await;
        Self::sweep(&mut inner, now, self.timeout);

        let key = launch.key();
        info!(
            app = launch.app_name.as_str(),
            project = launch.project_name.as_str(),
            workspace = ?launch.workspace_number,
            key = key.as_str(),
            "launch notification registered"
        );
        inner.total_notifications += 1;
        inner.pending.insert(key.clone(), launch);
        key
    }

    /// Correlate a new window against unmatched pending launches.
    ///
    /// Picks the highest confidence ≥ 0.6 and consumes it (one launch
    /// per window; multi-window apps only consume one). Confidence ties
    /// break on the earlier notification (FIFO).
    pub async fn find_match(&self, window: &LaunchWindowInfo) -> Option<PendingLaunch> {
        let mut inner = self.inner.lock().await;

        let mut best: Option<(f64, String, f64)> = None; // (score, key, launch_ts)
        for (key, launch) in inner.pending.iter() {
            if launch.matched {
                continue;
            }
            let (confidence, signals) = score(launch, window);
            debug!(
                key = key.as_str(),
                confidence,
                signals = ?signals,
                window_class = window.window_class.as_str(),
                "correlation scored"
            );
            if ConfidenceBand::from_score(confidence) == ConfidenceBand::Low {
                continue;
            }
            let candidate = (confidence, key.clone(), launch.timestamp);
            best = match best {
                None => Some(candidate),
                Some(current) => {
                    let better = confidence > current.0
                        // Equal confidence: the older notification wins.
                        || (confidence == current.0 && launch.timestamp < current.2);
                    if better {
                        Some(candidate)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        match best {
            Some((confidence, key, _)) => {
                let launch = inner.pending.get_mut(&key)?;
                launch.matched = true;
                let launch = launch.clone();
                inner.total_matched += 1;
                info!(
                    app = launch.app_name.as_str(),
                    project = launch.project_name.as_str(),
                    window_id = window.window_id,
                    confidence,
                    "window correlated to launch"
                );
                Some(launch)
            }
            None => {
                inner.total_failed_correlation += 1;
                info!(
                    window_id = window.window_id,
                    window_class = window.window_class.as_str(),
                    "no pending launch matched window"
                );
                None
            }
        }
    }

    /// Drop entries older than the timeout. Returns how many expired.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.epoch_secs_f64();
        let mut inner = self.inner.lock().await;
        Self::sweep(&mut inner, now, self.timeout)
    }

    fn sweep(inner: &mut Inner, now: f64, timeout: Duration) -> usize {
        let timeout_secs = timeout.as_secs_f64();
        let expired: Vec<String> = inner
            .pending
            .iter()
            .filter(|(_, launch)| launch.age_secs(now) > timeout_secs)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(launch) = inner.pending.remove(key) {
                if !launch.matched {
                    inner.total_expired += 1;
                    warn!(
                        app = launch.app_name.as_str(),
                        project = launch.project_name.as_str(),
                        age_secs = launch.age_secs(now),
                        "pending launch expired without a window"
                    );
                }
            }
        }
        expired.len()
    }

    pub async fn stats(&self) -> RegistryStatsSummary {
        let inner = self.inner.lock().await;
        let unmatched = inner.pending.values().filter(|l| !l.matched).count();
        let notifications = inner.total_notifications;
        let rate = |n: u64| {
            if notifications == 0 {
                0.0
            } else {
                n as f64 / notifications as f64
            }
        };
        RegistryStatsSummary {
            total_pending: inner.pending.len(),
            unmatched_pending: unmatched,
            total_notifications: notifications,
            total_matched: inner.total_matched,
            total_expired: inner.total_expired,
            total_failed_correlation: inner.total_failed_correlation,
            match_rate: rate(inner.total_matched),
            expiration_rate: rate(inner.total_expired),
        }
    }

    /// Spawn the periodic expirer. Sweeps every second until cancelled.
    pub fn spawn_expirer(registry: std::sync::Arc<Self>, cancel: CancellationToken) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                registry.cleanup_expired().await;
            }
        });
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod launch_tests;
