use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use serde_json::json;
use sunbeam_protocol::{
    decode_command, decode_manifest, decode_page, ActionParam, ActionType, InputType, Mode, Page,
    ParamValue, Payload, ProtocolError, SchemaKind, SchemaValidator,
};

fn validator() -> SchemaValidator {
    SchemaValidator::new().expect("embedded schemas compile")
}

fn bytes(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).expect("json serializes")
}

#[test]
fn manifest_decodes_commands_and_root_items() {
    let manifest = decode_manifest(
        &validator(),
        &bytes(json!({
            "title": "GitHub",
            "preferences": [{"name": "token", "title": "Token", "type": "password", "required": true}],
            "root": [{"command": "repos"}, {"title": "Mine", "command": "repos", "params": {"owner": "me"}}, {"command": "missing"}],
            "commands": [
                {"name": "repos", "title": "List Repositories", "mode": "list", "params": [
                    {"name": "owner", "title": "Owner", "type": "string"}
                ]},
                {"name": "open", "title": "Open", "mode": "silent", "hidden": true}
            ]
        })),
    )
    .expect("valid manifest");

    assert_eq!(manifest.title, "GitHub");
    assert_eq!(manifest.commands.len(), 2);
    assert_eq!(manifest.command("repos").map(|c| c.mode), Some(Mode::List));
    assert_eq!(manifest.command("open").map(|c| c.hidden), Some(true));
    assert_eq!(manifest.commands[0].params[0].kind, InputType::Text);
    assert_eq!(manifest.preferences[0].kind, InputType::Password);

    let root = manifest.root_items();
    assert_eq!(root.len(), 2);
    assert_eq!(root[0].title.as_deref(), Some("List Repositories"));
    assert_eq!(root[1].title.as_deref(), Some("Mine"));
    assert_eq!(
        root[1].params.get("owner"),
        Some(&ActionParam::Value(ParamValue::from("me")))
    );
}

#[test]
fn boolean_alias_maps_to_checkbox() {
    let manifest = decode_manifest(
        &validator(),
        &bytes(json!({
            "title": "T",
            "commands": [{"name": "a", "title": "A", "mode": "detail", "params": [
                {"name": "all", "title": "All", "type": "boolean", "default": true}
            ]}]
        })),
    )
    .expect("valid manifest");
    let param = &manifest.commands[0].params[0];
    assert_eq!(param.kind, InputType::Checkbox);
    assert_eq!(param.default, Some(ParamValue::Bool(true)));
}

#[test]
fn list_page_decodes_items_and_actions() {
    let page = decode_page(
        &validator(),
        &bytes(json!({
            "type": "list",
            "items": [
                {"title": "Alpha", "subtitle": "first", "accessories": ["a"], "actions": [
                    {"type": "copy", "text": "alpha", "exit": true},
                    {"type": "run", "command": "show", "params": {"id": 1, "note": {"required": true}}}
                ]},
                {"id": "b", "title": "Beta"}
            ],
            "emptyView": {"text": "Nothing here"}
        })),
    )
    .expect("valid list");

    let Page::List(list) = page else {
        panic!("expected a list");
    };
    assert_eq!(list.items[0].id(), "Alpha");
    assert_eq!(list.items[1].id(), "b");
    assert_eq!(list.items[0].filter_value(), "Alpha first");
    assert_eq!(list.empty_view.and_then(|view| view.text).as_deref(), Some("Nothing here"));

    let run = &list.items[0].actions[1];
    assert_eq!(run.kind, ActionType::Run);
    assert_eq!(run.params.get("id"), Some(&ActionParam::Value(ParamValue::from(1))));
    assert_eq!(run.unresolved_inputs(), vec!["note"]);
}

#[test]
fn schema_violation_names_location() {
    let error = decode_page(
        &validator(),
        &bytes(json!({"type": "list", "items": [{"title": "x", "actions": [{"type": "copy"}]}]})),
    )
    .expect_err("copy needs text");
    match error {
        ProtocolError::Schema { kind, path, .. } => {
            assert_eq!(kind, SchemaKind::Page);
            assert_eq!(path, "/items/0/actions/0");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_page_type_fails_validation() {
    let error = decode_page(&validator(), br#"{"type": "grid"}"#).expect_err("grid");
    assert!(matches!(error, ProtocolError::Schema { .. }));
}

#[test]
fn form_page_keeps_submit_action() {
    let page = decode_page(
        &validator(),
        &bytes(json!({
            "type": "form",
            "inputs": [{"name": "color", "title": "Color", "type": "select", "options": [
                {"title": "Red", "value": "red"}, {"title": "Blue", "value": "blue"}
            ]}],
            "submitAction": {"type": "copy", "text": "${input:color}"}
        })),
    )
    .expect("valid form");
    let Page::Form(form) = page else {
        panic!("expected a form");
    };
    assert_eq!(form.inputs[0].options.len(), 2);
    assert_eq!(
        form.submit_action.and_then(|action| action.text).as_deref(),
        Some("${input:color}")
    );
}

#[test]
fn silent_output_decodes_as_action() {
    let action = decode_command(&validator(), br#"{"type": "open", "url": "https://example.com"}"#)
        .expect("valid command");
    assert_eq!(action.kind, ActionType::Open);
    assert_eq!(action.url.as_deref(), Some("https://example.com"));
}

#[test]
fn payload_always_serializes_maps() {
    let payload = Payload::new("ping", "/tmp");
    assert_eq!(
        serde_json::to_value(&payload).expect("serializes"),
        json!({"command": "ping", "params": {}, "preferences": {}, "cwd": "/tmp"})
    );

    let mut params = BTreeMap::new();
    params.insert("n".to_string(), ParamValue::from(2));
    let payload = Payload {
        params,
        query: Some("q".to_string()),
        ..Payload::new("ping", "/tmp")
    };
    assert_eq!(
        serde_json::to_value(&payload).expect("serializes"),
        json!({"command": "ping", "params": {"n": 2}, "preferences": {}, "query": "q", "cwd": "/tmp"})
    );
}

#[test]
fn param_values_reject_non_scalars() {
    assert!(serde_json::from_value::<ParamValue>(json!([1])).is_err());
    assert_eq!(
        serde_json::from_value::<ParamValue>(json!(2.5)).expect("number"),
        ParamValue::parse_number("2.5").expect("parses")
    );
}
