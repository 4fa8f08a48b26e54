// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-window trace sessions.
//!
//! A session matches windows by id, pid, app_id or class/title regex
//! and captures before/after state snapshots for every event touching a
//! matched window, with an auto-computed key-level diff.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use uuid::Uuid;

use i3pm_core::TrackedWindow;

/// Concurrent session cap.
pub const MAX_SESSIONS: usize = 10;

/// Default per-session event cap.
pub const DEFAULT_MAX_EVENTS: usize = 1000;

/// What a session matches on. At least one criterion must be set.
#[derive(Debug, Default)]
pub struct TraceMatcher {
    pub window_id: Option<i64>,
    pub pid: Option<i32>,
    pub app_id: Option<String>,
    pub class_regex: Option<Regex>,
    pub title_regex: Option<Regex>,
}

impl TraceMatcher {
    pub fn is_empty(&self) -> bool {
        self.window_id.is_none()
            && self.pid.is_none()
            && self.app_id.is_none()
            && self.class_regex.is_none()
            && self.title_regex.is_none()
    }

    pub fn matches(&self, window: &TrackedWindow) -> bool {
        if let Some(id) = self.window_id {
            if window.id != id {
                return false;
            }
        }
        if let Some(pid) = self.pid {
            if window.pid != Some(pid) {
                return false;
            }
        }
        if let Some(app_id) = &self.app_id {
            if window.app_name.as_deref() != Some(app_id.as_str()) {
                return false;
            }
        }
        if let Some(re) = &self.class_regex {
            if !re.is_match(&window.class) {
                return false;
            }
        }
        if let Some(re) = &self.title_regex {
            if !re.is_match(&window.title) {
                return false;
            }
        }
        true
    }
}

/// One captured transition.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub description: String,
    pub before: Value,
    pub after: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Key-level diff between before and after snapshots.
    pub changes: Map<String, Value>,
}

/// A trace session and its bounded event buffer.
#[derive(Debug, Serialize)]
pub struct TraceSession {
    pub trace_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
    pub max_events: usize,
    #[serde(skip)]
    pub matcher: TraceMatcher,
    events: VecDeque<TraceEvent>,
}

impl TraceSession {
    pub fn is_active(&self) -> bool {
        self.stopped_at.is_none()
    }

    pub fn events(&self) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

/// Diff two snapshot objects at key level: `{key: {from, to}}`.
pub fn diff_snapshots(before: &Value, after: &Value) -> Map<String, Value> {
    let mut changes = Map::new();
    let empty = Map::new();
    let before_map = before.as_object().unwrap_or(&empty);
    let after_map = after.as_object().unwrap_or(&empty);

    for (key, after_value) in after_map {
        let before_value = before_map.get(key).unwrap_or(&Value::Null);
        if before_value != after_value {
            changes.insert(
                key.clone(),
                serde_json::json!({"from": before_value, "to": after_value}),
            );
        }
    }
    for (key, before_value) in before_map {
        if !after_map.contains_key(key) {
            changes.insert(
                key.clone(),
                serde_json::json!({"from": before_value, "to": Value::Null}),
            );
        }
    }
    changes
}

/// All sessions.
#[derive(Debug, Default)]
pub struct WindowTracer {
    sessions: Vec<TraceSession>,
}

impl WindowTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session. Fails on an empty matcher or at the cap.
    pub fn start(&mut self, matcher: TraceMatcher, max_events: Option<usize>) -> Result<String, String> {
        if matcher.is_empty() {
            return Err("trace matcher must set at least one criterion".to_string());
        }
        if self.sessions.iter().filter(|s| s.is_active()).count() >= MAX_SESSIONS {
            return Err(format!("at most {MAX_SESSIONS} concurrent trace sessions"));
        }
        let trace_id = Uuid::new_v4().to_string();
        self.sessions.push(TraceSession {
            trace_id: trace_id.clone(),
            started_at: Utc::now(),
            stopped_at: None,
            max_events: max_events.unwrap_or(DEFAULT_MAX_EVENTS),
            matcher,
            events: VecDeque::new(),
        });
        Ok(trace_id)
    }

    pub fn stop(&mut self, trace_id: &str) -> Result<(), String> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.trace_id == trace_id)
            .ok_or_else(|| format!("unknown trace session: {trace_id}"))?;
        if session.stopped_at.is_none() {
            session.stopped_at = Some(Utc::now());
        }
        Ok(())
    }

    pub fn get(&self, trace_id: &str) -> Option<&TraceSession> {
        self.sessions.iter().find(|s| s.trace_id == trace_id)
    }

    pub fn sessions(&self) -> &[TraceSession] {
        &self.sessions
    }

    /// Drop stopped sessions; returns how many were removed.
    pub fn clear_stopped(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.is_active());
        before - self.sessions.len()
    }

    /// Offer a transition to every active matching session.
    pub fn observe(
        &mut self,
        window: &TrackedWindow,
        event_type: &str,
        description: &str,
        before: Value,
        after: Value,
        context: Option<Value>,
    ) {
        for session in self.sessions.iter_mut().filter(|s| s.is_active()) {
            if !session.matcher.matches(window) {
                continue;
            }
            let event = TraceEvent {
                timestamp: Utc::now(),
                event_type: event_type.to_string(),
                description: description.to_string(),
                changes: diff_snapshots(&before, &after),
                before: before.clone(),
                after: after.clone(),
                context: context.clone(),
            };
            if session.events.len() == session.max_events {
                session.events.pop_front();
            }
            session.events.push_back(event);
        }
    }
}

#[cfg(test)]
#[path = "tracer_tests.rs"]
mod tracer_tests;
