use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serde_json::json;
use sunbeam_protocol::ParamValue;
use sunbeam_store::{Config, History, PreferenceStore, StoreError, StorePaths};
use tempfile::TempDir;

fn write_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("file.json");
    fs::write(&path, contents).expect("file should be written");
    (dir, path)
}

#[test]
fn missing_config_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let config = Config::load(&dir.path().join("absent.json")).expect("missing is fine");
    assert_eq!(config, Config::default());
}

#[test]
fn config_parses_extensions_and_oneliners() {
    let (_dir, path) = write_file(
        &json!({
            "extensions": {
                "gh": {"origin": "https://example.com/gh", "preferences": {"token": "t"},
                       "root": [{"title": "My repos", "command": "repos", "params": {"owner": "me"}}]},
                "local": {"origin": "~/ext.sh"}
            },
            "oneliners": [{"title": "Disk usage", "command": "df -h", "exit": true}]
        })
        .to_string(),
    );
    let config = Config::load(&path).expect("valid config");
    assert_eq!(config.extensions.len(), 2);
    let gh = &config.extensions["gh"];
    assert_eq!(gh.preferences.get("token"), Some(&ParamValue::from("t")));
    assert_eq!(gh.root[0].command, "repos");
    assert!(config.extensions["local"].preferences.is_empty());
    assert_eq!(config.oneliners[0].title, "Disk usage");
    assert!(config.oneliners[0].exit);
}

#[test]
fn invalid_config_reports_path() {
    let (_dir, path) = write_file("{not json");
    match Config::load(&path).expect_err("must fail") {
        StoreError::Json { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn preferences_are_scoped_to_origin() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("nested").join("preferences.json");

    let mut store = PreferenceStore::load(&path).expect("missing store is empty");
    let mut values = BTreeMap::new();
    values.insert("token".to_string(), ParamValue::from("abc"));
    store.set("gh", "https://example.com/gh", values.clone());
    store.save().expect("store saves");

    let reloaded = PreferenceStore::load(&path).expect("store reloads");
    assert_eq!(reloaded.get("gh", "https://example.com/gh"), Some(&values));
    assert_eq!(reloaded.get("gh", "https://other.example.com"), None);
    assert_eq!(reloaded.get("other", "https://example.com/gh"), None);
}

#[test]
fn history_orders_recent_first() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("history.json");

    let mut history = History::load(&path).expect("missing history is empty");
    history.record_at("old", 10);
    history.record_at("new", 20);
    history.save().expect("history saves");

    let history = History::load(&path).expect("history reloads");
    assert_eq!(history.last_used("new"), Some(20));
    assert_eq!(history.compare("new", "old"), std::cmp::Ordering::Less);
    assert_eq!(history.compare("old", "never"), std::cmp::Ordering::Less);
    assert_eq!(history.compare("never", "unknown"), std::cmp::Ordering::Equal);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("readable")).expect("json");
    assert_eq!(raw, json!({"old": 10, "new": 20}));
}

#[test]
fn record_uses_current_time() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let mut history = History::load(&dir.path().join("history.json")).expect("empty");
    history.record("item");
    assert!(history.last_used("item").unwrap_or_default() > 1_600_000_000);
}

#[test]
fn paths_follow_xdg_layout() {
    let paths = StorePaths::under(
        &PathBuf::from("/c"),
        &PathBuf::from("/d"),
        &PathBuf::from("/k"),
    );
    assert_eq!(paths.config, PathBuf::from("/c/sunbeam/sunbeam.json"));
    assert_eq!(paths.preferences, PathBuf::from("/d/sunbeam/preferences.json"));
    assert_eq!(paths.history, PathBuf::from("/k/sunbeam/history.json"));
    assert_eq!(
        paths.with_config("/etc/sunbeam.json").config,
        PathBuf::from("/etc/sunbeam.json")
    );
}
