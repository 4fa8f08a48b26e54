// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ipc::{FakeSway, TreeBuilder};
use crate::subproc::FakeSpawner;
use i3pm_core::event::WindowEvent;
use i3pm_core::{FakeClock, PatternRule, WindowChange};
use std::path::PathBuf;
use std::time::Duration;

struct Fixture {
    sway: Arc<FakeSway>,
    clock: FakeClock,
    engine: Engine<FakeSway, FakeSpawner, FakeClock>,
    _config: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::rooted(tmp.path(), &tmp.path().join("data"));
    paths.ensure_dirs().unwrap();

    let sway = Arc::new(FakeSway::new());
    let spawner = Arc::new(FakeSpawner::new());
    let clock = FakeClock::new();
    let registry = Arc::new(LaunchRegistry::new(clock.clone(), Duration::from_secs(5)));
    let engine = Engine::new(
        Arc::clone(&sway),
        spawner,
        clock.clone(),
        EngineConfig { paths },
        registry,
    );
    Fixture { sway, clock, engine, _config: tmp }
}

/// Register a project directly in the engine index.
fn add_project(fx: &mut Fixture, name: &str) {
    let dir = fx._config.path().join(name.replace(['/', ':'], "-"));
    std::fs::create_dir_all(&dir).unwrap();
    let project = Project::new(name, name, dir).unwrap();
    fx.engine.project_store.save(&project).unwrap();
    fx.engine.projects.insert(name.to_string(), project);
}

fn window_event(change: WindowChange, id: i64, class: &str, pid: i32) -> WmEvent {
    WmEvent::Window(WindowEvent { change, container: TreeBuilder::window(id, class, pid) })
}

async fn new_window(fx: &mut Fixture, id: i64, class: &str, pid: i32) {
    fx.sway.add_window(TreeBuilder::window(id, class, pid), 1);
    fx.engine.handle_event(window_event(WindowChange::New, id, class, pid)).await;
}

#[tokio::test]
async fn unclassified_window_stays_global_on_current_workspace() {
    let mut fx = fixture();
    new_window(&mut fx, 10, "mystery", 100).await;

    let window = fx.engine.window(10).unwrap();
    assert_eq!(window.scope, Scope::Global);
    assert!(!window.hidden);
    assert_eq!(window.workspace_number, Some(1));

    // Unified mark injected with the global project fallback.
    let marks = fx.sway.window_marks(10);
    assert_eq!(marks, vec!["global:mystery:global:10".to_string()]);
}

#[tokio::test]
async fn pattern_classification_applies() {
    let mut fx = fixture();
    fx.engine.app_classes.class_patterns =
        vec![PatternRule::new("glob:pwa-*", Scope::Global, 10).unwrap()];

    new_window(&mut fx, 11, "pwa-youtube", 100).await;
    assert_eq!(fx.engine.window(11).unwrap().scope, Scope::Global);
}

#[tokio::test]
async fn scoped_window_of_active_project_visible() {
    let mut fx = fixture();
    add_project(&mut fx, "nixos");
    fx.engine.persist_active(Some("nixos".to_string())).unwrap();
    fx.engine.app_classes.scoped_classes.insert("Code".to_string());

    new_window(&mut fx, 12, "Code", 100).await;
    let window = fx.engine.window(12).unwrap();
    assert_eq!(window.scope, Scope::Scoped);
    assert_eq!(window.project_name.as_deref(), Some("nixos"));
    assert!(!window.hidden);
    assert_eq!(fx.sway.window_marks(12), vec!["scoped:code:nixos:12".to_string()]);
}

#[tokio::test]
async fn launch_match_overrides_classification() {
    let mut fx = fixture();
    add_project(&mut fx, "stacks");

    fx.engine
        .notify_launch(i3pm_core::PendingLaunch {
            app_name: "vscode".to_string(),
            project_name: "stacks".to_string(),
            project_directory: PathBuf::from("/tmp"),
            launcher_pid: Some(1),
            workspace_number: Some(2),
            expected_class: "Code".to_string(),
            aliases: Vec::new(),
            timestamp: 0.0,
            matched: false,
        })
        .await;

    fx.clock.advance(Duration::from_millis(500));
    fx.engine.persist_active(Some("stacks".to_string())).unwrap();
    new_window(&mut fx, 13, "Code", 100).await;

    let window = fx.engine.window(13).unwrap();
    assert_eq!(window.project_name.as_deref(), Some("stacks"));
    assert_eq!(window.app_name.as_deref(), Some("vscode"));
    assert_eq!(window.scope, Scope::Scoped);
    // Launch carried workspace 2.
    assert_eq!(fx.sway.window_workspace(13), Some(2));
    assert_eq!(fx.sway.window_marks(13), vec!["scoped:vscode:stacks:13".to_string()]);
}

#[tokio::test]
async fn scoped_window_for_inactive_project_is_hidden() {
    let mut fx = fixture();
    add_project(&mut fx, "nixos");
    add_project(&mut fx, "stacks");
    fx.engine.persist_active(Some("nixos".to_string())).unwrap();

    // Launch notification binds the window to the non-active project.
    fx.engine
        .notify_launch(i3pm_core::PendingLaunch {
            app_name: "vscode".to_string(),
            project_name: "stacks".to_string(),
            project_directory: PathBuf::from("/tmp"),
            launcher_pid: None,
            workspace_number: None,
            expected_class: "Code".to_string(),
            aliases: Vec::new(),
            timestamp: 0.0,
            matched: false,
        })
        .await;

    new_window(&mut fx, 14, "Code", 100).await;
    let window = fx.engine.window(14).unwrap();
    assert!(window.hidden);
    assert_eq!(fx.sway.window_in_scratchpad(14), Some(true));
}

#[tokio::test]
async fn project_switch_swaps_visibility() {
    let mut fx = fixture();
    add_project(&mut fx, "a");
    add_project(&mut fx, "b");
    fx.engine.persist_active(Some("a".to_string())).unwrap();

    // Two scoped windows on ws1: one for A (correct), one for B
    // (misstate: visible though B is inactive).
    new_window(&mut fx, 20, "ClassA", 100).await;
    new_window(&mut fx, 21, "ClassB", 200).await;
    for (id, project) in [(20i64, "a"), (21i64, "b")] {
        let window = fx.engine.windows.get_mut(&id).unwrap();
        window.scope = Scope::Scoped;
        window.project_name = Some(project.to_string());
        window.hidden = false;
        let mark = format!("scoped:app:{project}:{id}");
        window.marks = vec![mark.clone()];
        fx.sway.run_command(&format!("[con_id={id}] mark --add \"{mark}\"")).await.unwrap();
    }

    let result = fx.engine.switch_project(Some("b".to_string())).await.unwrap();
    assert_eq!(result.previous.as_deref(), Some("a"));
    assert_eq!(result.current.as_deref(), Some("b"));
    assert_eq!(result.windows_hidden, 1);

    // A-window hidden, B-window visible with mark intact.
    assert!(fx.engine.window(20).unwrap().hidden);
    assert_eq!(fx.sway.window_in_scratchpad(20), Some(true));
    assert!(!fx.engine.window(21).unwrap().hidden);
    assert_eq!(fx.sway.window_marks(21), vec!["scoped:app:b:21".to_string()]);

    // Active pointer persisted.
    let active = load_active_project(&fx.engine.paths).unwrap();
    assert!(active.is_active("b"));
}

#[tokio::test]
async fn switch_to_unknown_project_is_invalid_params() {
    let mut fx = fixture();
    let err = fx.engine.switch_project(Some("ghost".to_string())).await.unwrap_err();
    assert_eq!(err.code, i3pm_wire::ERR_INVALID_PARAMS);
}

#[tokio::test]
async fn switch_to_global_hides_all_scoped() {
    let mut fx = fixture();
    add_project(&mut fx, "a");
    fx.engine.persist_active(Some("a".to_string())).unwrap();
    new_window(&mut fx, 22, "ClassA", 100).await;
    {
        let window = fx.engine.windows.get_mut(&22).unwrap();
        window.scope = Scope::Scoped;
        window.project_name = Some("a".to_string());
    }

    let result = fx.engine.switch_project(None).await.unwrap();
    assert_eq!(result.windows_hidden, 1);
    assert!(fx.engine.window(22).unwrap().hidden);
    assert!(fx.engine.active.is_global_mode());
}

#[tokio::test]
async fn close_event_removes_window() {
    let mut fx = fixture();
    new_window(&mut fx, 30, "Code", 100).await;
    assert_eq!(fx.engine.window_count(), 1);

    fx.engine.handle_event(window_event(WindowChange::Close, 30, "Code", 100)).await;
    assert_eq!(fx.engine.window_count(), 0);
}

#[tokio::test]
async fn duplicate_unified_marks_are_repaired() {
    let mut fx = fixture();
    new_window(&mut fx, 31, "Code", 100).await;

    // A second unified mark shows up via a mark event.
    let mut node = TreeBuilder::window(31, "Code", 100);
    node.marks = vec![
        "global:code:global:31".to_string(),
        "scoped:code:other:31".to_string(),
    ];
    fx.engine
        .handle_event(WmEvent::Window(WindowEvent { change: WindowChange::Mark, container: node }))
        .await;

    let window = fx.engine.window(31).unwrap();
    let unified: Vec<&String> =
        window.marks.iter().filter(|m| i3pm_core::Mark::parse(m).is_some()).collect();
    assert_eq!(unified.len(), 1);
    assert!(fx.engine.health.errors > 0);
}

#[tokio::test]
async fn rebuild_from_tree_recovers_marks() {
    let mut fx = fixture();
    let mut node = TreeBuilder::window(40, "Code", 100);
    node.marks = vec!["scoped:code:nixos:40".to_string()];
    fx.sway.add_window(node, 3);

    let tree = fx.sway.get_tree().await.unwrap();
    fx.engine.rebuild_from_tree(&tree);

    let window = fx.engine.window(40).unwrap();
    assert_eq!(window.scope, Scope::Scoped);
    assert_eq!(window.project_name.as_deref(), Some("nixos"));
    assert_eq!(window.workspace_number, Some(3));
    assert_eq!(fx.engine.health.windows_tracked, 1);
}

#[tokio::test]
async fn orphaned_mark_projects_reported() {
    let mut fx = fixture();
    add_project(&mut fx, "known");
    let mut node = TreeBuilder::window(41, "Code", 100);
    node.marks = vec!["scoped:code:vanished:41".to_string()];
    fx.sway.add_window(node, 1);
    let tree = fx.sway.get_tree().await.unwrap();
    fx.engine.rebuild_from_tree(&tree);

    assert_eq!(fx.engine.orphaned_mark_projects(), vec!["vanished".to_string()]);
}

#[tokio::test]
async fn validate_state_reports_drift() {
    let mut fx = fixture();
    new_window(&mut fx, 50, "Code", 100).await;
    // Daemon thinks ws 1; move it behind the engine's back.
    fx.sway.run_command("[con_id=50] move container to workspace number 3").await.unwrap();
    // A window the daemon never saw.
    fx.sway.add_window(TreeBuilder::window(51, "Ghost", 200), 1);
    // A stale index entry.
    fx.engine.windows.insert(
        99,
        i3pm_core::TrackedWindow::from_node(&TreeBuilder::window(99, "Gone", 300)),
    );

    let result = fx.engine.validate_state().await.unwrap();
    assert!(!result.consistent);
    assert_eq!(result.untracked, vec![51]);
    assert_eq!(result.stale, vec![99]);
    assert!(result
        .mismatches
        .iter()
        .any(|m| m.window_id == 50 && m.field == "workspace_number"));
}

#[tokio::test]
async fn workspace_focus_updates_fallback() {
    let mut fx = fixture();
    fx.engine
        .handle_event(WmEvent::Workspace(i3pm_core::WorkspaceEvent {
            change: "focus".to_string(),
            current: Some(i3pm_core::event::WorkspaceRef {
                num: Some(4),
                name: Some("4".to_string()),
                output: None,
            }),
            old: None,
        }))
        .await;
    assert_eq!(fx.engine.current_workspace, 4);
}

#[tokio::test]
async fn output_change_marks_cache_stale() {
    let mut fx = fixture();
    fx.engine
        .handle_event(WmEvent::Output(i3pm_core::OutputEvent { change: "unspecified".to_string() }))
        .await;
    assert!(fx.engine.outputs_stale);
}

#[tokio::test]
async fn events_feed_ring_and_health() {
    let mut fx = fixture();
    new_window(&mut fx, 60, "Code", 100).await;
    fx.engine.handle_event(window_event(WindowChange::Focus, 60, "Code", 100)).await;

    assert_eq!(fx.engine.health.events_processed, 2);
    let recent = fx.engine.ring.recent(10, Some("window"));
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].event_type, "window::focus");
    // The new-window record carries phase timings.
    assert!(!recent[1].phases.is_empty());
}

#[tokio::test]
async fn title_change_remarks_when_project_differs() {
    let mut fx = fixture();
    add_project(&mut fx, "alpha");
    add_project(&mut fx, "beta");
    fx.engine.persist_active(Some("alpha".to_string())).unwrap();
    fx.engine.app_classes.scoped_classes.insert("Code".to_string());

    new_window(&mut fx, 61, "Code", 100).await;
    assert_eq!(fx.engine.window(61).unwrap().project_name.as_deref(), Some("alpha"));

    let node = TreeBuilder::window_titled(61, "Code", 100, "beta - src - Visual Studio Code");
    fx.engine
        .handle_event(WmEvent::Window(WindowEvent { change: WindowChange::Title, container: node }))
        .await;

    let window = fx.engine.window(61).unwrap();
    assert_eq!(window.project_name.as_deref(), Some("beta"));
    let mark = window.unified_mark().unwrap();
    assert_eq!(mark.project, "beta");
}

#[tokio::test]
async fn title_change_strips_code_prefix() {
    // Some VS Code titles lead with "Code - "; the hook must strip it
    // and derive the project, not take the prefix as the project.
    let mut fx = fixture();
    add_project(&mut fx, "alpha");
    add_project(&mut fx, "beta");
    fx.engine.persist_active(Some("alpha".to_string())).unwrap();
    fx.engine.app_classes.scoped_classes.insert("Code".to_string());

    new_window(&mut fx, 62, "Code", 100).await;

    let node =
        TreeBuilder::window_titled(62, "Code", 100, "Code - beta - src - Visual Studio Code");
    fx.engine
        .handle_event(WmEvent::Window(WindowEvent { change: WindowChange::Title, container: node }))
        .await;

    let window = fx.engine.window(62).unwrap();
    assert_eq!(window.project_name.as_deref(), Some("beta"));
    assert_eq!(window.unified_mark().unwrap().project, "beta");
}
