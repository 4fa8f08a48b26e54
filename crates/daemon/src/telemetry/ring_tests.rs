// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn record(event_type: &str, window_id: i64) -> EventRecord {
    let mut record = EventRecord::new(event_type);
    record.window_id = Some(window_id);
    record
}

#[test]
fn bounded_drops_oldest() {
    let mut ring = EventRing::new(3);
    for i in 0..5 {
        ring.push(record("window::new", i));
    }
    assert_eq!(ring.len(), 3);
    let recent = ring.recent(10, None);
    let ids: Vec<i64> = recent.iter().filter_map(|r| r.window_id).collect();
    assert_eq!(ids, vec![4, 3, 2]);
}

#[test]
fn recent_respects_limit() {
    let mut ring = EventRing::default();
    for i in 0..10 {
        ring.push(record("window::new", i));
    }
    assert_eq!(ring.recent(4, None).len(), 4);
}

#[test]
fn filter_by_kind_prefix() {
    let mut ring = EventRing::default();
    ring.push(record("window::new", 1));
    ring.push(record("workspace::focus", 2));
    ring.push(record("window::close", 3));

    let windows = ring.recent(10, Some("window"));
    assert_eq!(windows.len(), 2);
    let exact = ring.recent(10, Some("window::close"));
    assert_eq!(exact.len(), 1);
    assert_eq!(ring.recent(10, Some("tick")).len(), 0);
}

#[test]
fn default_capacity_is_five_hundred() {
    assert_eq!(EventRing::default().capacity(), 500);
}
