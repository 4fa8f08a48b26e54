// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon health record.
//!
//! Counters are bumped from the engine; resource usage is sampled from
//! the OS on demand. Thresholds mirror the systemd unit limits the
//! daemon ships with (MemoryMax=100M, CPUQuota=50%).

use std::time::Instant;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

use i3pm_wire::HealthSummary;

const MAX_MEMORY_MB: f64 = 100.0;
const MAX_CPU_PERCENT: f64 = 50.0;
const DEGRADED_ERROR_RATE: f64 = 0.10;
const UNHEALTHY_ERROR_RATE: f64 = 0.25;

/// Overall health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

/// The singleton health record.
pub struct HealthMetrics {
    start_time: Instant,
    pub wm_connected: bool,
    pub events_processed: u64,
    pub windows_tracked: usize,
    pub project_switches: u64,
    pub errors: u64,
    pub last_successful_operation: Option<String>,
    pub last_error: Option<String>,
    memory_rss_mb: f64,
    cpu_percent: f64,
    system: System,
}

impl Default for HealthMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            wm_connected: false,
            events_processed: 0,
            windows_tracked: 0,
            project_switches: 0,
            errors: 0,
            last_successful_operation: None,
            last_error: None,
            memory_rss_mb: 0.0,
            cpu_percent: 0.0,
            system: System::new(),
        }
    }

    pub fn record_event(&mut self) {
        self.events_processed += 1;
        self.last_successful_operation = Some("event_processed".to_string());
    }

    pub fn record_project_switch(&mut self) {
        self.project_switches += 1;
        self.last_successful_operation = Some("project_switch".to_string());
    }

    pub fn record_operation(&mut self, name: &str) {
        self.last_successful_operation = Some(name.to_string());
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors += 1;
        let message = message.into();
        debug!(error = message.as_str(), "error recorded in health metrics");
        self.last_error = Some(message);
    }

    pub fn error_rate(&self) -> f64 {
        if self.events_processed == 0 {
            return 0.0;
        }
        self.errors as f64 / self.events_processed as f64
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Sample RSS and CPU from the OS.
    pub fn refresh_resource_usage(&mut self) {
        let pid = Pid::from_u32(std::process::id());
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        if let Some(process) = self.system.process(pid) {
            self.memory_rss_mb = process.memory() as f64 / (1024.0 * 1024.0);
            self.cpu_percent = f64::from(process.cpu_usage());
        }
    }

    /// Verdict per the documented thresholds: disconnect ⇒ degraded,
    /// error rate > 25% ⇒ unhealthy, resource overrun or error rate
    /// > 10% ⇒ degraded.
    pub fn status(&self) -> HealthStatus {
        if self.error_rate() > UNHEALTHY_ERROR_RATE {
            return HealthStatus::Unhealthy;
        }
        if !self.wm_connected
            || self.memory_rss_mb > MAX_MEMORY_MB
            || self.cpu_percent > MAX_CPU_PERCENT
            || self.error_rate() > DEGRADED_ERROR_RATE
        {
            return HealthStatus::Degraded;
        }
        HealthStatus::Healthy
    }

    pub fn summary(&self) -> HealthSummary {
        HealthSummary {
            status: self.status().as_str().to_string(),
            uptime_secs: self.uptime_secs(),
            wm_connected: self.wm_connected,
            memory_rss_mb: self.memory_rss_mb,
            cpu_percent: self.cpu_percent,
            events_processed: self.events_processed,
            windows_tracked: self.windows_tracked,
            project_switches: self.project_switches,
            errors: self.errors,
            error_rate: self.error_rate(),
            last_successful_operation: self.last_successful_operation.clone(),
            last_error: self.last_error.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn force_resources(&mut self, memory_rss_mb: f64, cpu_percent: f64) {
        self.memory_rss_mb = memory_rss_mb;
        self.cpu_percent = cpu_percent;
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod health_tests;
