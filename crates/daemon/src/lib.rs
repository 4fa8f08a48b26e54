// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! i3pm daemon library.
//!
//! The daemon turns i3/Sway into a project-scoped workspace engine:
//! it classifies windows, correlates launches, rewrites visibility on
//! project switches, and serves a JSON-RPC control socket.
//!
//! Exposed as a library for the `i3pmd` binary and the workspace-level
//! scenario tests, which drive the engine against a fake WM adapter.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod assign;
pub mod engine;
pub mod env;
pub mod ipc;
pub mod launch;
pub mod lifecycle;
pub mod listener;
pub mod procenv;
pub mod recovery;
pub mod scratchpad;
pub mod subproc;
pub mod telemetry;

pub use engine::{Engine, EngineConfig, EngineMsg};
pub use ipc::{IpcError, SwayApi};
#[cfg(any(test, feature = "test-support"))]
pub use ipc::{FakeSway, TreeBuilder};
pub use launch::LaunchRegistry;
#[cfg(any(test, feature = "test-support"))]
pub use subproc::FakeSpawner;
pub use subproc::{ProcessSpawner, Spawner};
