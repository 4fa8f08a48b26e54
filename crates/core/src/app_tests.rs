// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn entry(name: &str, expected_class: &str, preferred: Option<u8>) -> AppEntry {
    AppEntry {
        name: name.to_string(),
        display_name: name.to_string(),
        expected_class: expected_class.to_string(),
        aliases: Vec::new(),
        scope: Scope::Scoped,
        preferred_workspace: preferred,
        preferred_monitor_role: None,
        multi_instance: false,
        floating: false,
        command: None,
        parameters: Vec::new(),
        ulid: None,
        start_url: None,
    }
}

#[test]
fn matches_by_tier() {
    let e = entry("terminal", "Ghostty", Some(1));
    assert_eq!(e.matches_window("Ghostty", ""), Some(MatchKind::Exact));
    assert_eq!(e.matches_window("com.mitchellh.ghostty", ""), Some(MatchKind::Normalized));
    assert_eq!(e.matches_window("firefox", ""), None);
}

#[test]
fn alias_match() {
    let mut e = entry("code", "Code", Some(2));
    e.aliases = vec!["code-oss".to_string()];
    assert_eq!(e.matches_window("code-oss", ""), Some(MatchKind::AliasExact));
}

#[test]
fn workspace_bound_is_seventy() {
    assert_eq!(entry("a", "A", Some(70)).valid_preferred_workspace(), Some(70));
    assert_eq!(entry("a", "A", Some(71)).valid_preferred_workspace(), None);
    assert_eq!(entry("a", "A", Some(0)).valid_preferred_workspace(), None);
    assert_eq!(entry("a", "A", None).valid_preferred_workspace(), None);
}

#[test]
fn registry_scan_returns_first_hit() {
    let entries = vec![entry("term", "Ghostty", Some(1)), entry("code", "Code", Some(2))];
    let (hit, kind) = match_registry(&entries, "Code", "code").unwrap();
    assert_eq!(hit.name, "code");
    assert_eq!(kind, MatchKind::Exact);
    assert!(match_registry(&entries, "mystery", "").is_none());
}

#[test]
fn registry_json_defaults() {
    let json = r#"{
        "name": "firefox",
        "display_name": "Firefox",
        "expected_class": "firefox",
        "scope": "global"
    }"#;
    let e: AppEntry = serde_json::from_str(json).unwrap();
    assert!(!e.multi_instance);
    assert!(!e.floating);
    assert!(e.aliases.is_empty());
    assert_eq!(e.preferred_workspace, None);
}
