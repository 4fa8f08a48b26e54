// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded ring of recent WM events for diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Default capacity.
pub const DEFAULT_CAPACITY: usize = 500;

/// One processed event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    /// e.g. `window::new`.
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_title: Option<String>,
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_assigned: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks_applied: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Named phase timings inside the handler, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<(String, f64)>,
}

impl EventRecord {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: event_type.into(),
            window_id: None,
            window_class: None,
            window_title: None,
            duration_ms: 0.0,
            workspace_assigned: None,
            marks_applied: Vec::new(),
            error: None,
            phases: Vec::new(),
        }
    }
}

/// The ring itself.
#[derive(Debug)]
pub struct EventRing {
    capacity: usize,
    entries: VecDeque<EventRecord>,
}

impl Default for EventRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventRing {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: VecDeque::with_capacity(capacity) }
    }

    pub fn push(&mut self, record: EventRecord) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent first, optionally filtered by event type prefix
    /// (`window` matches `window::new` etc.).
    pub fn recent(&self, limit: usize, event_type: Option<&str>) -> Vec<EventRecord> {
        self.entries
            .iter()
            .rev()
            .filter(|record| match event_type {
                Some(filter) => {
                    record.event_type == filter || record.event_type.starts_with(&format!("{filter}::"))
                }
                None => true,
            })
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "ring_tests.rs"]
mod ring_tests;
