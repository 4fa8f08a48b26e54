// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WM IPC client.
//!
//! One persistent connection pair to the i3/Sway socket: a request
//! channel for queries and commands, and an event channel subscribed to
//! `window`, `workspace`, `output` and `tick`. All other components go
//! through the [`SwayApi`] trait, which a fake implements for tests.

mod client;
mod codec;
mod tree;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use client::{ReconnectConfig, SwayClient};
pub use codec::{MessageType, EVENT_MASK};
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSway, TreeBuilder};
pub use tree::{OutputInfo, TreeNode, WindowLocation, WorkspaceInfo, SCRATCH_WORKSPACE};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the WM connection.
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("WM socket not found; is i3/sway running?")]
    SocketNotFound,

    #[error("not connected to the WM")]
    Disconnected,

    #[error("WM request timed out")]
    Timeout,

    #[error("WM protocol error: {0}")]
    Protocol(String),

    #[error("WM rejected command: {0}")]
    CommandFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request/reply surface of the WM connection.
///
/// Everything the daemon asks of the WM funnels through here, which is
/// what makes the engine drivable by a fake in tests.
#[async_trait]
pub trait SwayApi: Send + Sync + 'static {
    /// Run a WM command, e.g. `[con_id=5] mark --add "…"`.
    async fn run_command(&self, command: &str) -> Result<(), IpcError>;

    async fn get_tree(&self) -> Result<TreeNode, IpcError>;

    async fn get_workspaces(&self) -> Result<Vec<WorkspaceInfo>, IpcError>;

    async fn get_outputs(&self) -> Result<Vec<OutputInfo>, IpcError>;

    /// Whether the connection is currently up.
    fn is_connected(&self) -> bool;
}
