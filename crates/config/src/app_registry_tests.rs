// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn paths(tmp: &tempfile::TempDir) -> ConfigPaths {
    let paths = ConfigPaths::rooted(tmp.path(), &tmp.path().join("data"));
    paths.ensure_dirs().unwrap();
    paths
}

#[test]
fn absent_registry_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(load_app_registry(&paths(&tmp)).unwrap().is_empty());
}

#[test]
fn loads_entries_and_skips_invalid() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = paths(&tmp);
    std::fs::write(
        paths.app_registry_file(),
        r#"[
            {
                "name": "code",
                "display_name": "VS Code",
                "expected_class": "Code",
                "scope": "scoped",
                "preferred_workspace": 2,
                "command": "code",
                "parameters": ["--new-window"]
            },
            {"name": "broken"},
            {
                "name": "youtube",
                "display_name": "YouTube",
                "expected_class": "FFPWA-01ABCDEF",
                "scope": "global",
                "ulid": "01ABCDEF",
                "start_url": "https://youtube.com"
            }
        ]"#,
    )
    .unwrap();

    let entries = load_app_registry(&paths).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "code");
    assert_eq!(entries[0].preferred_workspace, Some(2));
    assert_eq!(entries[1].ulid.as_deref(), Some("01ABCDEF"));
}

#[test]
fn non_array_is_parse_error() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = paths(&tmp);
    std::fs::write(paths.app_registry_file(), r#"{"apps": []}"#).unwrap();
    assert!(matches!(load_app_registry(&paths).unwrap_err(), ConfigError::Parse(_)));
}
