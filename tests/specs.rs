// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios driving the engine against the fake WM.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use i3pm_config::ConfigPaths;
use i3pm_core::event::{WindowChange, WindowEvent};
use i3pm_core::{FakeClock, PendingLaunch, Scope, WmEvent};
use i3pm_daemon::engine::{Engine, EngineConfig};
use i3pm_daemon::{FakeSpawner, FakeSway, LaunchRegistry, TreeBuilder};
use i3pm_wire::ProjectEditParams;

struct World {
    sway: Arc<FakeSway>,
    spawner: Arc<FakeSpawner>,
    clock: FakeClock,
    registry: Arc<LaunchRegistry<FakeClock>>,
    engine: Engine<FakeSway, FakeSpawner, FakeClock>,
    root: tempfile::TempDir,
}

fn world() -> World {
    let root = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::rooted(root.path(), &root.path().join("data"));
    paths.ensure_dirs().unwrap();

    let sway = Arc::new(FakeSway::new());
    let spawner = Arc::new(FakeSpawner::new());
    let clock = FakeClock::new();
    let registry = Arc::new(LaunchRegistry::new(clock.clone(), Duration::from_secs(5)));
    let engine = Engine::new(
        Arc::clone(&sway),
        Arc::clone(&spawner),
        clock.clone(),
        EngineConfig { paths },
        Arc::clone(&registry),
    );
    World { sway, spawner, clock, registry, engine, root }
}

impl World {
    fn project_dir(&self, name: &str) -> PathBuf {
        let dir = self.root.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn add_project(&mut self, name: &str) {
        let dir = self.project_dir(name);
        self.engine
            .create_project(ProjectEditParams {
                name: name.to_string(),
                display_name: None,
                icon: None,
                directory: Some(dir),
                scoped_classes: None,
            })
            .unwrap();
    }

    /// Install a class pattern through the config file, the way a real
    /// deployment would.
    fn install_pattern(&mut self, pattern: &str, scope: &str, priority: u32) {
        let paths = self.engine.paths().clone();
        let body = serde_json::json!({
            "scoped_classes": [],
            "global_classes": [],
            "class_patterns": [
                {"pattern": pattern, "scope": scope, "priority": priority}
            ]
        });
        i3pm_config::atomic_write_json(&paths.app_classes_file(), &body).unwrap();
        self.engine.reload_config();
    }

    async fn notify(&mut self, app: &str, project: &str, class: &str, workspace: Option<i32>) {
        self.engine
            .notify_launch(PendingLaunch {
                app_name: app.to_string(),
                project_name: project.to_string(),
                project_directory: self.root.path().join(project),
                launcher_pid: Some(1000),
                workspace_number: workspace,
                expected_class: class.to_string(),
                aliases: Vec::new(),
                timestamp: 0.0,
                matched: false,
            })
            .await;
    }

    async fn open_window(&mut self, id: i64, class: &str, pid: i32) {
        self.sway.add_window(TreeBuilder::window(id, class, pid), 1);
        self.engine
            .handle_event(WmEvent::Window(WindowEvent {
                change: WindowChange::New,
                container: TreeBuilder::window(id, class, pid),
            }))
            .await;
    }
}

// Scenario: a glob pattern routes every matching PWA class to global.
#[tokio::test]
async fn pattern_auto_classification() {
    let mut world = world();
    world.install_pattern("glob:pwa-*", "global", 10);

    for (i, class) in ["pwa-youtube", "pwa-slack", "pwa-gmail"].iter().enumerate() {
        let id = 100 + i as i64;
        world.open_window(id, class, 500 + i as i32).await;
        let window = world.engine.window(id).unwrap();
        assert_eq!(window.scope, Scope::Global, "{class}");
        assert!(!window.hidden, "{class}");
    }
}

// Scenario: two rapid identical launches; windows bind FIFO.
#[tokio::test]
async fn launch_correlation_two_rapid_launches() {
    let mut world = world();
    world.add_project("nixos");
    world.add_project("stacks");
    world.engine.switch_project(Some("nixos".to_string())).await.unwrap();

    world.notify("vscode", "nixos", "Code", Some(1)).await;
    world.clock.advance(Duration::from_millis(50));
    world.notify("vscode", "stacks", "Code", Some(1)).await;

    world.clock.advance(Duration::from_millis(550));
    world.open_window(201, "Code", 900).await;
    assert_eq!(world.engine.window(201).unwrap().project_name.as_deref(), Some("nixos"));

    world.clock.advance(Duration::from_millis(50));
    world.open_window(202, "Code", 901).await;
    assert_eq!(world.engine.window(202).unwrap().project_name.as_deref(), Some("stacks"));
    // The stacks window is not the active project: hidden.
    assert!(world.engine.window(202).unwrap().hidden);
}

// Scenario: expected class mismatch means no binding and a counter bump.
#[tokio::test]
async fn launch_correlation_class_mismatch() {
    let mut world = world();
    world.notify("vscode", "nixos", "Code", Some(2)).await;

    world.clock.advance(Duration::from_millis(100));
    world.open_window(301, "VSCode-Wrong", 900).await;

    let window = world.engine.window(301).unwrap();
    assert_eq!(window.project_name, None);
    assert_eq!(window.scope, Scope::Global);

    let stats = world.engine.registry_stats().await;
    assert_eq!(stats.total_failed_correlation, 1);
    assert_eq!(stats.total_matched, 0);
}

// Scenario: an unconsumed notification expires after the timeout.
#[tokio::test]
async fn launch_expiration() {
    let mut world = world();
    world.notify("vscode", "nixos", "Code", Some(2)).await;

    world.clock.advance(Duration::from_secs(6));
    world.registry.cleanup_expired().await;

    let stats = world.engine.registry_stats().await;
    assert_eq!(stats.total_expired, 1);
    assert_eq!(stats.unmatched_pending, 0);
}

// Scenario: switching projects swaps scoped-window visibility.
#[tokio::test]
async fn project_switch_visibility() {
    let mut world = world();
    world.add_project("a");
    world.add_project("b");
    world.engine.switch_project(Some("a".to_string())).await.unwrap();

    // Window for A arrives via launch correlation.
    world.notify("term", "a", "Ghostty", Some(1)).await;
    world.open_window(401, "Ghostty", 900).await;
    assert!(!world.engine.window(401).unwrap().hidden);

    // Window for B arrives while A is active: starts hidden.
    world.notify("code", "b", "Code", Some(1)).await;
    world.open_window(402, "Code", 901).await;
    assert!(world.engine.window(402).unwrap().hidden);

    let result = world.engine.switch_project(Some("b".to_string())).await.unwrap();
    assert_eq!(result.windows_shown, 1);
    assert_eq!(result.windows_hidden, 1);

    assert!(world.engine.window(401).unwrap().hidden);
    assert_eq!(world.sway.window_in_scratchpad(401), Some(true));
    assert!(!world.engine.window(402).unwrap().hidden);
    assert_eq!(world.sway.window_in_scratchpad(402), Some(false));

    // Marks survive the switch.
    assert!(world.sway.window_marks(402).iter().any(|m| m == "scoped:code:b:402"));
}

// Scenario: scratchpad terminal launch / toggle / toggle cycle.
#[tokio::test]
async fn scratchpad_toggle_cycle() {
    let mut world = world();
    world.add_project("proj");
    let cwd = world.project_dir("proj");

    // The spawner will hand out pid 10001; seed its window.
    world.sway.add_window(TreeBuilder::window(70, "Ghostty", 10_001), 1);

    world.engine.launch_scratchpad("proj", &cwd).await.unwrap();
    assert_eq!(world.engine.scratchpad_state("proj").await.unwrap(), "visible");

    world.engine.toggle_scratchpad("proj").await.unwrap();
    assert!(world.sway.last_command().unwrap().contains("move scratchpad"));
    assert_eq!(world.engine.scratchpad_state("proj").await.unwrap(), "hidden");

    world.clock.advance(Duration::from_secs(2));
    world.engine.toggle_scratchpad("proj").await.unwrap();
    assert!(world.sway.last_command().unwrap().contains("scratchpad show"));
    assert_eq!(world.engine.scratchpad_state("proj").await.unwrap(), "visible");

    // The spawned terminal carried the scratchpad environment.
    let spawn = &world.spawner.spawns()[0];
    assert_eq!(spawn.env["I3PM_SCRATCHPAD"], "true");
    assert_eq!(spawn.env["I3PM_PROJECT_NAME"], "proj");
}
