// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ipc::{FakeSway, TreeBuilder};
use crate::subproc::FakeSpawner;
use i3pm_core::FakeClock;

const FIRST_FAKE_PID: u32 = 10_001;

struct Fixture {
    sway: Arc<FakeSway>,
    spawner: Arc<FakeSpawner>,
    clock: FakeClock,
    manager: ScratchpadManager<FakeSway, FakeSpawner, FakeClock>,
    workdir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let sway = Arc::new(FakeSway::new());
    let spawner = Arc::new(FakeSpawner::new());
    let clock = FakeClock::new();
    let manager = ScratchpadManager::new(Arc::clone(&sway), Arc::clone(&spawner), clock.clone());
    Fixture { sway, spawner, clock, manager, workdir: tempfile::tempdir().unwrap() }
}

/// Pre-seed the fake WM with the window the spawned terminal will own.
fn seed_terminal_window(sway: &FakeSway, window_id: i64, pid: u32) {
    sway.add_window(TreeBuilder::window(window_id, "Ghostty", pid as i32), 1);
}

#[tokio::test]
async fn launch_marks_and_tracks() {
    let mut fx = fixture();
    seed_terminal_window(&fx.sway, 70, FIRST_FAKE_PID);

    let terminal = fx.manager.launch("nixos", fx.workdir.path()).await.unwrap();
    assert_eq!(terminal.window_id, 70);
    assert_eq!(terminal.mark, "scratchpad:nixos");
    assert_eq!(fx.sway.window_marks(70), vec!["scratchpad:nixos".to_string()]);

    // Env stamped on the child.
    let spawn = &fx.spawner.spawns()[0];
    assert_eq!(spawn.env["I3PM_SCRATCHPAD"], "true");
    assert_eq!(spawn.env["I3PM_PROJECT_NAME"], "nixos");
    assert_eq!(spawn.env["I3PM_SCOPE"], "scoped");
    assert!(spawn.env["I3PM_APP_ID"].starts_with("scratchpad-nixos-"));
}

#[tokio::test]
async fn launch_rejects_missing_cwd() {
    let mut fx = fixture();
    let err = fx.manager.launch("nixos", Path::new("/definitely/not/here")).await.unwrap_err();
    assert!(matches!(err, ScratchpadError::MissingWorkingDir(_)));
}

#[tokio::test]
async fn launch_rejects_duplicate() {
    let mut fx = fixture();
    seed_terminal_window(&fx.sway, 70, FIRST_FAKE_PID);
    fx.manager.launch("nixos", fx.workdir.path()).await.unwrap();

    let err = fx.manager.launch("nixos", fx.workdir.path()).await.unwrap_err();
    assert!(matches!(err, ScratchpadError::AlreadyRunning(_)));
}

#[tokio::test(start_paused = true)]
async fn launch_times_out_without_window() {
    let mut fx = fixture();
    let err = fx.manager.launch("nixos", fx.workdir.path()).await.unwrap_err();
    assert!(matches!(err, ScratchpadError::WindowTimeout(_)));
}

#[tokio::test]
async fn toggle_cycle() {
    let mut fx = fixture();
    seed_terminal_window(&fx.sway, 70, FIRST_FAKE_PID);
    fx.manager.launch("nixos", fx.workdir.path()).await.unwrap();
    assert_eq!(fx.manager.get_state("nixos").await.unwrap(), TerminalState::Visible);

    let shown_at_launch = fx.manager.get("nixos").unwrap().last_shown_at;

    // Visible -> hidden.
    let state = fx.manager.toggle("nixos").await.unwrap();
    assert_eq!(state, TerminalState::Hidden);
    assert!(fx.sway.last_command().unwrap().contains("move scratchpad"));
    assert_eq!(fx.manager.get_state("nixos").await.unwrap(), TerminalState::Hidden);

    // Hidden -> visible, updating last_shown_at.
    fx.clock.advance(Duration::from_secs(3));
    let state = fx.manager.toggle("nixos").await.unwrap();
    assert_eq!(state, TerminalState::Visible);
    assert!(fx.sway.last_command().unwrap().contains("scratchpad show"));
    assert!(fx.manager.get("nixos").unwrap().last_shown_at > shown_at_launch);
}

#[tokio::test]
async fn validate_repairs_missing_mark() {
    let mut fx = fixture();
    seed_terminal_window(&fx.sway, 70, FIRST_FAKE_PID);
    fx.manager.launch("nixos", fx.workdir.path()).await.unwrap();

    fx.sway.run_command("[con_id=70] unmark").await.unwrap();
    assert!(fx.sway.window_marks(70).is_empty());

    assert!(fx.manager.validate("nixos").await);
    assert_eq!(fx.sway.window_marks(70), vec!["scratchpad:nixos".to_string()]);
}

#[tokio::test]
async fn validate_drops_dead_process() {
    let mut fx = fixture();
    seed_terminal_window(&fx.sway, 70, FIRST_FAKE_PID);
    fx.manager.launch("nixos", fx.workdir.path()).await.unwrap();

    fx.spawner.kill(FIRST_FAKE_PID);
    assert!(!fx.manager.validate("nixos").await);
    assert!(fx.manager.get("nixos").is_none());
}

#[tokio::test]
async fn validate_drops_vanished_window() {
    let mut fx = fixture();
    seed_terminal_window(&fx.sway, 70, FIRST_FAKE_PID);
    fx.manager.launch("nixos", fx.workdir.path()).await.unwrap();

    fx.sway.remove_window(70);
    assert!(!fx.manager.validate("nixos").await);
}

#[tokio::test]
async fn cleanup_invalid_is_idempotent() {
    let mut fx = fixture();
    seed_terminal_window(&fx.sway, 70, FIRST_FAKE_PID);
    fx.manager.launch("alive", fx.workdir.path()).await.unwrap();

    seed_terminal_window(&fx.sway, 71, FIRST_FAKE_PID + 1);
    fx.manager.launch("doomed", fx.workdir.path()).await.unwrap();
    fx.spawner.kill(FIRST_FAKE_PID + 1);

    assert_eq!(fx.manager.cleanup_invalid().await, 1);
    assert_eq!(fx.manager.cleanup_invalid().await, 0);
    assert_eq!(fx.manager.tracked_projects(), vec!["alive".to_string()]);
}

#[tokio::test]
async fn remove_by_window_id() {
    let mut fx = fixture();
    seed_terminal_window(&fx.sway, 70, FIRST_FAKE_PID);
    fx.manager.launch("nixos", fx.workdir.path()).await.unwrap();

    let removed = fx.manager.remove_by_window(70).unwrap();
    assert_eq!(removed.project_name, "nixos");
    assert!(fx.manager.get("nixos").is_none());
    assert!(fx.manager.remove_by_window(70).is_none());
}
