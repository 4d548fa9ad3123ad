mod support;

use std::collections::BTreeMap;

use extension_client::{ExecutionError, Extension, ExtensionError, Origin};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sunbeam_protocol::{decode_page, Mode, Page, ParamValue};
use support::{client, script, PING_EXTENSION};

fn load() -> (tempfile::TempDir, Extension) {
    let (dir, path) = script(PING_EXTENSION);
    let origin = Origin::parse(&path.display().to_string()).expect("origin parses");
    let extension =
        Extension::load(client(), "ping", origin, BTreeMap::new()).expect("manifest loads");
    (dir, extension)
}

#[test]
fn manifest_loads_from_entrypoint() {
    let (_dir, extension) = load();
    assert_eq!(extension.manifest.title, "Ping");
    assert_eq!(extension.command("ping").map(|c| c.mode).ok(), Some(Mode::Detail));
    assert_eq!(
        extension.preferences.get("greeting"),
        Some(&ParamValue::from("hi"))
    );
}

#[test]
fn ping_command_prints_a_detail_page() {
    let (_dir, extension) = load();
    let output = extension
        .run("ping", &BTreeMap::new(), None)
        .expect("command runs");
    let page = decode_page(extension.client().validator(), &output).expect("valid page");
    match page {
        Page::Detail(detail) => assert_eq!(detail.text.as_deref(), Some("pong")),
        other => panic!("unexpected page: {other:?}"),
    }
}

#[test]
fn payload_reaches_stdin_with_defaults_and_preferences() {
    let (_dir, extension) = load();
    let mut params = BTreeMap::new();
    params.insert("word".to_string(), ParamValue::from("abc"));
    let output = extension
        .run("echo", &params, Some("q"))
        .expect("command runs");
    let payload: Value = serde_json::from_slice(&output).expect("payload echoed");
    assert_eq!(payload["command"], json!("echo"));
    assert_eq!(payload["params"], json!({"word": "abc"}));
    assert_eq!(payload["preferences"], json!({"greeting": "hi"}));
    assert_eq!(payload["query"], json!("q"));
    assert!(payload["cwd"].is_string());
}

#[test]
fn missing_required_params_are_reported_before_running() {
    let (_dir, extension) = load();
    let error = extension
        .run("echo", &BTreeMap::new(), None)
        .expect_err("word is required");
    match error {
        ExtensionError::MissingParams { names } => assert_eq!(names, vec!["word".to_string()]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn failures_carry_plain_stderr() {
    let (_dir, extension) = load();
    let error = extension
        .run("fail", &BTreeMap::new(), None)
        .expect_err("command exits 3");
    match error {
        ExtensionError::Execution(ExecutionError::CommandFailed { stderr, code }) => {
            assert_eq!(stderr, "boom");
            assert_eq!(code, Some(3));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn child_gets_launcher_env_and_entrypoint_dir() {
    let (dir, extension) = load();
    let output = extension.run("env", &BTreeMap::new(), None).expect("runs");
    let page: Value = serde_json::from_slice(&output).expect("json");
    let dir_name = dir
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .expect("utf-8 dir name");
    assert_eq!(page["text"], json!(format!("0 1 {dir_name}")));
}

#[test]
fn unknown_command_is_an_error() {
    let (_dir, extension) = load();
    assert!(matches!(
        extension.run("nope", &BTreeMap::new(), None),
        Err(ExtensionError::UnknownCommand { .. })
    ));
}

#[test]
fn invalid_manifest_is_a_protocol_error() {
    let (_dir, path) = script("echo '{\"commands\": []}'\n");
    let origin = Origin::parse(&path.display().to_string()).expect("origin parses");
    assert!(matches!(
        Extension::load(client(), "bad", origin, BTreeMap::new()),
        Err(ExtensionError::Protocol(_))
    ));
}

#[test]
fn missing_entrypoint_is_a_transport_error() {
    let origin = Origin::parse("/nonexistent/sunbeam-extension").expect("origin parses");
    assert!(matches!(
        Extension::load(client(), "gone", origin, BTreeMap::new()),
        Err(ExtensionError::Transport(_))
    ));
}
