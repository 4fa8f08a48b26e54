// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_validates_name_and_directory() {
    assert!(Project::new("nixos", "NixOS", "/etc/nixos").is_ok());
    assert!(matches!(Project::new("", "x", "/tmp"), Err(ProjectError::EmptyName)));
    assert!(matches!(Project::new("bad name", "x", "/tmp"), Err(ProjectError::BadName(_))));
    assert!(matches!(
        Project::new("ok", "x", "relative/path"),
        Err(ProjectError::RelativeDirectory(_))
    ));
}

#[yare::parameterized(
    simple = { "nixos" },
    qualified = { "vpittamp/nixos-config:main" },
    dotted = { "my.project" },
    branchy = { "acct/repo:feature/123-foo" },
)]
fn valid_names(name: &str) {
    assert!(validate_name(name).is_ok());
}

#[test]
fn split_qualified_names() {
    assert_eq!(
        split_qualified("vpittamp/nixos-config:main"),
        Some(("vpittamp", "nixos-config", "main"))
    );
    // Branch with slashes splits at the first colon.
    assert_eq!(
        split_qualified("acct/repo:feature/123-foo"),
        Some(("acct", "repo", "feature/123-foo"))
    );
    assert_eq!(split_qualified("plain-name"), None);
    assert_eq!(split_qualified("no-slash:branch"), None);
    assert_eq!(split_qualified("a/b:"), None);
}

#[test]
fn join_and_split_round_trip() {
    let name = join_qualified("vpittamp", "nixos-config", "main");
    assert_eq!(split_qualified(&name), Some(("vpittamp", "nixos-config", "main")));
}

#[test]
fn active_project_state() {
    let global = ActiveProjectState::default();
    assert!(global.is_global_mode());
    assert!(!global.is_active("nixos"));

    let active = ActiveProjectState::new(Some("nixos".to_string()));
    assert!(active.is_active("nixos"));
    assert!(!active.is_active("other"));
    assert!(!active.is_global_mode());
}

#[test]
fn project_json_round_trip() {
    let mut project = Project::new("stacks", "Stacks", "/home/user/stacks").unwrap();
    project.scoped_classes = vec!["Code".to_string()];
    project.source_type = SourceType::Worktree;
    project.parent_project = Some("vpittamp/stacks:main".to_string());
    project.branch_metadata = Some(BranchMetadata {
        branch_type: Some("feature".to_string()),
        number: Some(42),
        full_name: "feature/42-thing".to_string(),
    });

    let json = serde_json::to_string(&project).unwrap();
    let back: Project = serde_json::from_str(&json).unwrap();
    assert_eq!(back, project);
}
