// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn connected() -> HealthMetrics {
    let mut health = HealthMetrics::new();
    health.wm_connected = true;
    health
}

#[test]
fn fresh_connected_daemon_is_healthy() {
    assert_eq!(connected().status(), HealthStatus::Healthy);
}

#[test]
fn disconnect_is_degraded() {
    let mut health = connected();
    health.wm_connected = false;
    assert_eq!(health.status(), HealthStatus::Degraded);
}

#[test]
fn error_rate_thresholds() {
    let mut health = connected();
    for _ in 0..100 {
        health.record_event();
    }
    for _ in 0..11 {
        health.record_error("boom");
    }
    // 11% > 10% degraded threshold.
    assert_eq!(health.status(), HealthStatus::Degraded);

    for _ in 0..15 {
        health.record_error("boom");
    }
    // 26% > 25% unhealthy threshold.
    assert_eq!(health.status(), HealthStatus::Unhealthy);
}

#[test]
fn resource_overruns_degrade() {
    let mut health = connected();
    health.force_resources(150.0, 1.0);
    assert_eq!(health.status(), HealthStatus::Degraded);

    let mut health = connected();
    health.force_resources(10.0, 80.0);
    assert_eq!(health.status(), HealthStatus::Degraded);
}

#[test]
fn zero_events_is_zero_error_rate() {
    let mut health = connected();
    health.record_error("early failure");
    assert_eq!(health.error_rate(), 0.0);
    // Disconnected? No. Resources fine. One error with no events keeps
    // the rate at zero, so status stays healthy.
    assert_eq!(health.status(), HealthStatus::Healthy);
}

#[test]
fn summary_mirrors_counters() {
    let mut health = connected();
    health.record_event();
    health.record_project_switch();
    health.windows_tracked = 5;
    health.record_error("oops");

    let summary = health.summary();
    assert_eq!(summary.events_processed, 1);
    assert_eq!(summary.project_switches, 1);
    assert_eq!(summary.windows_tracked, 5);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.last_successful_operation.as_deref(), Some("project_switch"));
    assert_eq!(summary.last_error.as_deref(), Some("oops"));
    assert_eq!(summary.status, "healthy");
}

#[test]
fn refresh_resource_usage_reads_own_process() {
    let mut health = connected();
    health.refresh_resource_usage();
    // A live test process has nonzero RSS.
    assert!(health.summary().memory_rss_mb > 0.0);
}
