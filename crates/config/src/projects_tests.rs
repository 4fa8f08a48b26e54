// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn store(tmp: &tempfile::TempDir) -> ProjectStore {
    let paths = ConfigPaths::rooted(tmp.path(), &tmp.path().join("data"));
    paths.ensure_dirs().unwrap();
    ProjectStore::new(paths)
}

fn project(tmp: &tempfile::TempDir, name: &str) -> Project {
    let dir = tmp.path().join(name);
    std::fs::create_dir_all(&dir).unwrap();
    Project::new(name, name, dir).unwrap()
}

#[test]
fn save_load_delete_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);
    let p = project(&tmp, "nixos");

    store.save(&p).unwrap();
    assert!(store.exists("nixos"));
    assert_eq!(store.load("nixos").unwrap(), p);

    store.delete("nixos").unwrap();
    assert!(!store.exists("nixos"));
    assert!(matches!(store.load("nixos"), Err(ConfigError::NotFound { .. })));
}

#[test]
fn delete_missing_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);
    assert!(matches!(store.delete("ghost"), Err(ConfigError::NotFound { .. })));
}

#[test]
fn list_quarantines_missing_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);

    let good = project(&tmp, "good");
    store.save(&good).unwrap();

    let doomed_dir = tmp.path().join("doomed");
    std::fs::create_dir_all(&doomed_dir).unwrap();
    let doomed = Project::new("doomed", "doomed", &doomed_dir).unwrap();
    store.save(&doomed).unwrap();
    std::fs::remove_dir(&doomed_dir).unwrap();

    let list = store.list().unwrap();
    assert!(list.projects.contains_key("good"));
    assert!(!list.projects.contains_key("doomed"));
    assert_eq!(list.quarantined, vec!["doomed".to_string()]);
}

#[test]
fn list_reports_unreadable_files() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store(&tmp);
    std::fs::write(tmp.path().join("i3/projects/corrupt.json"), b"{oops").unwrap();

    let list = store.list().unwrap();
    assert!(list.projects.is_empty());
    assert_eq!(list.errors.len(), 1);
    assert!(list.errors[0].contains("corrupt.json"));
}

#[test]
fn list_without_directory_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::rooted(&tmp.path().join("missing"), &tmp.path().join("data"));
    let store = ProjectStore::new(paths);
    let list = store.list().unwrap();
    assert!(list.projects.is_empty());
}
