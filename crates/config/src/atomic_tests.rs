// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Doc {
    counter: u32,
    name: String,
}

#[test]
fn write_then_read_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("doc.json");
    let doc = Doc { counter: 1, name: "a".to_string() };

    atomic_write_json(&path, &doc).unwrap();
    let back: Doc = read_json(&path).unwrap();
    assert_eq!(back, doc);

    // Bitwise-stable modulo key ordering: a rewrite of the same value
    // produces identical bytes.
    let first = std::fs::read(&path).unwrap();
    atomic_write_json(&path, &doc).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), first);
}

#[test]
fn no_tmp_file_left_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("doc.json");
    atomic_write_json(&path, &json!({"k": 1})).unwrap();
    assert!(!tmp.path().join("doc.json.tmp").exists());
}

#[test]
fn missing_file_is_not_found_with_hint() {
    let tmp = tempfile::tempdir().unwrap();
    let err = read_json::<Doc>(&tmp.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
fn malformed_json_is_path_qualified_parse_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bad.json");
    std::fs::write(&path, b"{not json").unwrap();
    let err = read_json::<Doc>(&path).unwrap_err();
    match err {
        ConfigError::Parse(messages) => {
            assert!(messages[0].contains("bad.json"));
        }
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn backups_rotate_and_cap() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("doc.json");

    for i in 0..8u32 {
        atomic_write_json(&path, &Doc { counter: i, name: "x".to_string() }).unwrap();
    }

    // Newest backup holds the previous write.
    let backup: Doc = read_json(&tmp.path().join("doc.json.backup")).unwrap();
    assert_eq!(backup.counter, 6);

    // Retention cap: .backup plus .backup.1 ..= .backup.4.
    assert!(tmp.path().join("doc.json.backup.4").exists());
    assert!(!tmp.path().join("doc.json.backup.5").exists());
}

#[test]
fn locked_update_creates_and_mutates() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("doc.json");

    let created = locked_update(&path, |current: Option<Doc>| {
        assert!(current.is_none());
        Doc { counter: 1, name: "new".to_string() }
    })
    .unwrap();
    assert_eq!(created.counter, 1);

    let updated = locked_update(&path, |current: Option<Doc>| {
        let mut doc = current.unwrap();
        doc.counter += 1;
        doc
    })
    .unwrap();
    assert_eq!(updated.counter, 2);

    let on_disk: Doc = read_json(&path).unwrap();
    assert_eq!(on_disk.counter, 2);
}
