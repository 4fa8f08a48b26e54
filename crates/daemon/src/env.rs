// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Control socket path: `I3PMD_SOCKET` overrides the default.
pub fn socket_path() -> PathBuf {
    std::env::var("I3PMD_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/i3-project-daemon.sock"))
}

/// Runtime state directory for the pid lock and log file:
/// `I3PMD_STATE_DIR` > `$XDG_STATE_HOME/i3pm` > `~/.local/state/i3pm`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("I3PMD_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("i3pm");
    }
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".local/state/i3pm")
}

/// WM socket path from `I3SOCK`/`SWAYSOCK`, if exported.
pub fn wm_socket_from_env() -> Option<PathBuf> {
    std::env::var("I3SOCK")
        .or_else(|_| std::env::var("SWAYSOCK"))
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Default timeout for WM IPC round-trips.
pub fn ipc_timeout() -> Duration {
    duration_from_ms("I3PMD_IPC_TIMEOUT_MS", Duration::from_secs(5))
}

/// Launch correlation window.
pub fn launch_timeout() -> Duration {
    duration_from_ms("I3PMD_LAUNCH_TIMEOUT_MS", Duration::from_secs(5))
}

/// Bounded wait for a scratchpad terminal window to appear.
pub fn scratchpad_wait() -> Duration {
    duration_from_ms("I3PMD_SCRATCHPAD_WAIT_MS", Duration::from_secs(3))
}

/// Health probe interval.
pub fn probe_interval() -> Duration {
    duration_from_ms("I3PMD_PROBE_INTERVAL_MS", Duration::from_secs(5))
}

/// Health probe per-request timeout.
pub fn probe_timeout() -> Duration {
    duration_from_ms("I3PMD_PROBE_TIMEOUT_MS", Duration::from_secs(2))
}

/// Shutdown grace per task.
pub fn shutdown_grace() -> Duration {
    duration_from_ms("I3PMD_SHUTDOWN_GRACE_MS", Duration::from_secs(2))
}

/// Reconnect attempt cap; unset means retry forever.
pub fn reconnect_max_attempts() -> Option<u32> {
    std::env::var("I3PMD_RECONNECT_MAX_ATTEMPTS").ok().and_then(|s| s.parse().ok())
}

/// Terminal command for scratchpad launches.
pub fn terminal_command() -> String {
    std::env::var("I3PMD_TERMINAL").unwrap_or_else(|_| "ghostty".to_string())
}

fn duration_from_ms(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
