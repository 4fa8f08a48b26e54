// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn store(tmp: &tempfile::TempDir) -> LayoutStore {
    let paths = ConfigPaths::rooted(tmp.path(), &tmp.path().join("data"));
    paths.ensure_dirs().unwrap();
    LayoutStore::new(paths)
}

fn snapshot(project: &str, name: &str) -> LayoutSnapshot {
    LayoutSnapshot {
        name: name.to_string(),
        project: project.to_string(),
        saved_at: Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap(),
        windows: vec![LayoutWindow {
            app_name: "code".to_string(),
            window_class: "Code".to_string(),
            workspace: 2,
            floating: false,
            title: None,
        }],
    }
}

#[test]
fn save_load_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);
    let snap = snapshot("nixos", "default");

    store.save(&snap).unwrap();
    assert_eq!(store.load("nixos", "default").unwrap(), snap);
}

#[test]
fn list_sorted_per_project() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);

    store.save(&snapshot("nixos", "b")).unwrap();
    store.save(&snapshot("nixos", "a")).unwrap();
    store.save(&snapshot("other", "c")).unwrap();

    assert_eq!(store.list("nixos").unwrap(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(store.list("unknown").unwrap(), Vec::<String>::new());
}

#[test]
fn qualified_project_names_share_a_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);
    store.save(&snapshot("vpittamp/nixos-config:main", "dev")).unwrap();
    assert_eq!(store.list("vpittamp/nixos-config:main").unwrap(), vec!["dev".to_string()]);
}

#[test]
fn missing_layout_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);
    let err = store.load("nixos", "ghost").unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
fn export_copies_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);
    store.save(&snapshot("nixos", "default")).unwrap();

    let out = tmp.path().join("exported.json");
    store.export("nixos", "default", &out).unwrap();
    let exported: LayoutSnapshot = crate::atomic::read_json(&out).unwrap();
    assert_eq!(exported.name, "default");
}

#[test]
fn delete_removes_file() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);
    store.save(&snapshot("nixos", "default")).unwrap();
    store.delete("nixos", "default").unwrap();
    assert!(store.list("nixos").unwrap().is_empty());
}
