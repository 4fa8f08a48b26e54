// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! /proc environment bridge.
//!
//! Launchers stamp children with `I3PM_*` variables; the daemon reads
//! them back from `/proc/<pid>/environ` when the window appears. Some
//! toolkits fork between launcher and window process, so a miss walks
//! up to three parents. Everything here is best-effort: a vanished or
//! unreadable process yields an empty map, never an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How many parents to try when the window's own pid has no vars.
const MAX_PARENT_HOPS: u32 = 3;

/// Read the `I3PM_*` environment of a process.
pub fn read_i3pm_env(pid: i32) -> HashMap<String, String> {
    read_i3pm_env_from(Path::new("/proc"), pid)
}

/// Read with parent fallback: pid, then up to three ancestors.
pub fn read_i3pm_env_with_parents(pid: i32) -> HashMap<String, String> {
    read_i3pm_env_with_parents_from(Path::new("/proc"), pid)
}

pub(crate) fn read_i3pm_env_from(proc_root: &Path, pid: i32) -> HashMap<String, String> {
    let path = proc_root.join(pid.to_string()).join("environ");
    let Ok(bytes) = std::fs::read(&path) else {
        debug!(pid, "environ unreadable");
        return HashMap::new();
    };
    parse_environ(&bytes)
}

pub(crate) fn read_i3pm_env_with_parents_from(
    proc_root: &Path,
    pid: i32,
) -> HashMap<String, String> {
    let mut current = pid;
    for hop in 0..=MAX_PARENT_HOPS {
        let env = read_i3pm_env_from(proc_root, current);
        if !env.is_empty() {
            if hop > 0 {
                debug!(pid, ancestor = current, hop, "found I3PM env on ancestor");
            }
            return env;
        }
        match parent_pid_from(proc_root, current) {
            Some(parent) if parent > 1 => current = parent,
            _ => break,
        }
    }
    HashMap::new()
}

/// Parse a NUL-separated environ block, keeping `I3PM_*` entries.
fn parse_environ(bytes: &[u8]) -> HashMap<String, String> {
    let mut env = HashMap::new();
    for entry in bytes.split(|&b| b == 0) {
        if entry.is_empty() {
            continue;
        }
        let Ok(entry) = std::str::from_utf8(entry) else { continue };
        if let Some((key, value)) = entry.split_once('=') {
            if key.starts_with("I3PM_") {
                env.insert(key.to_string(), value.to_string());
            }
        }
    }
    env
}

/// Parent pid from `/proc/<pid>/stat`. The comm field may contain
/// spaces and parens, so fields are taken after the last `)`.
fn parent_pid_from(proc_root: &Path, pid: i32) -> Option<i32> {
    let path: PathBuf = proc_root.join(pid.to_string()).join("stat");
    let stat = std::fs::read_to_string(path).ok()?;
    let after_comm = &stat[stat.rfind(')')? + 1..];
    // after_comm: " <state> <ppid> …"
    after_comm.split_whitespace().nth(1)?.parse().ok()
}

#[cfg(test)]
#[path = "procenv_tests.rs"]
mod procenv_tests;
