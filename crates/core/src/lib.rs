// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! i3pm-core: domain types and pure logic for the i3pm project daemon.
//!
//! Everything in this crate is I/O-free: mark codec, pattern rules,
//! classification, tiered class identity, launch-correlation scoring,
//! and the project / window / event data model. The daemon crate wires
//! these into the window manager and the control socket.

pub mod app;
pub mod classify;
pub mod clock;
pub mod event;
pub mod identity;
pub mod launch;
pub mod mark;
pub mod pattern;
pub mod project;
pub mod rules;
pub mod window;
pub mod worktree;

pub use app::{match_registry, AppEntry};
pub use classify::{classify, Classification, ClassificationSource, ClassifyCtx, Scope};
#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
pub use clock::{Clock, SystemClock};
pub use event::{OutputEvent, TickEvent, WindowChange, WindowEvent, WmEvent, WorkspaceEvent};
pub use identity::{match_window_class, normalize_class, MatchKind, PwaType, WindowIdentity};
pub use launch::{score, ConfidenceBand, LaunchWindowInfo, PendingLaunch, ScoreSignal};
pub use mark::Mark;
pub use pattern::{PatternError, PatternRule};
pub use project::{
    join_qualified, split_qualified, validate_name, ActiveProjectState, BranchMetadata, Project,
    SourceType,
};
pub use rules::{RuleAction, RuleModifier, WindowRule};
pub use window::TrackedWindow;
pub use worktree::WorktreeEnvironment;
