// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const T0: f64 = 1_700_000_000.0;

fn launch(expected_class: &str, workspace: Option<i32>) -> PendingLaunch {
    PendingLaunch {
        app_name: "vscode".to_string(),
        project_name: "nixos".to_string(),
        project_directory: PathBuf::from("/home/user/nixos"),
        launcher_pid: Some(1000),
        workspace_number: workspace,
        expected_class: expected_class.to_string(),
        aliases: Vec::new(),
        timestamp: T0,
        matched: false,
    }
}

fn window(class: &str, workspace: Option<i32>, delta: f64) -> LaunchWindowInfo {
    LaunchWindowInfo {
        window_id: 42,
        window_class: class.to_string(),
        window_instance: String::new(),
        window_pid: Some(2000),
        workspace_number: workspace,
        timestamp: T0 + delta,
    }
}

#[test]
fn class_mismatch_is_zero() {
    let (s, signals) = score(&launch("Code", Some(2)), &window("VSCode-Wrong", Some(2), 0.1));
    assert_eq!(s, 0.0);
    assert!(signals.contains(&ScoreSignal::ClassMismatch));
}

#[test]
fn perfect_match_is_exact() {
    let (s, _) = score(&launch("Code", Some(2)), &window("Code", Some(2), 0.5));
    assert_eq!(s, 1.0);
    assert_eq!(ConfidenceBand::from_score(s), ConfidenceBand::Exact);
}

// Boundary table: deltas at 0, 1, 2, 5, 6 seconds without a workspace
// match score 0.8, 0.7, 0.6, 0.0, 0.0.
#[yare::parameterized(
    at_zero = { 0.0, 0.8 },
    under_one = { 0.5, 0.8 },
    at_one = { 1.0, 0.7 },
    under_two = { 1.9, 0.7 },
    at_two = { 2.0, 0.6 },
    under_five = { 4.9, 0.6 },
    at_five = { 5.0, 0.0 },
    at_six = { 6.0, 0.0 },
    negative = { -0.5, 0.0 },
)]
fn time_boundaries(delta: f64, expected: f64) {
    let (s, _) = score(&launch("Code", None), &window("Code", None, delta));
    assert!((s - expected).abs() < 1e-9, "delta {delta}: got {s}, want {expected}");
}

#[test]
fn workspace_bonus_is_two_tenths() {
    let with_ws = score(&launch("Code", Some(2)), &window("Code", Some(2), 0.5)).0;
    let without_ws = score(&launch("Code", Some(2)), &window("Code", Some(3), 0.5)).0;
    assert!((with_ws - without_ws - 0.2).abs() < 1e-9);
}

#[test]
fn missing_workspace_on_either_side_no_bonus() {
    let (s, _) = score(&launch("Code", None), &window("Code", Some(2), 0.5));
    assert!((s - 0.8).abs() < 1e-9);
    let (s, _) = score(&launch("Code", Some(2)), &window("Code", None, 0.5));
    assert!((s - 0.8).abs() < 1e-9);
}

#[test]
fn tiered_class_match_accepted() {
    // Normalized tier: expected "Ghostty" vs reverse-domain class.
    let (s, signals) =
        score(&launch("Ghostty", None), &window("com.mitchellh.ghostty", None, 0.2));
    assert!((s - 0.8).abs() < 1e-9);
    assert!(signals
        .iter()
        .any(|sig| matches!(sig, ScoreSignal::ClassMatch { kind: MatchKind::Normalized })));
}

#[test]
fn alias_match_accepted() {
    let mut l = launch("Code", None);
    l.aliases = vec!["code-oss".to_string()];
    let (s, _) = score(&l, &window("code-oss", None, 0.2));
    assert!((s - 0.8).abs() < 1e-9);
}

#[yare::parameterized(
    exact_threshold = { 0.6, ConfidenceBand::Medium },
    below = { 0.59, ConfidenceBand::Low },
    high = { 0.8, ConfidenceBand::High },
    just_under_high = { 0.79, ConfidenceBand::Medium },
    exact = { 1.0, ConfidenceBand::Exact },
    zero = { 0.0, ConfidenceBand::Low },
)]
fn bands(score: f64, expected: ConfidenceBand) {
    assert_eq!(ConfidenceBand::from_score(score), expected);
}

#[test]
fn pending_launch_key_embeds_millis() {
    let l = launch("Code", None);
    assert_eq!(l.key(), format!("vscode-{}", (T0 * 1000.0) as u64));
}
