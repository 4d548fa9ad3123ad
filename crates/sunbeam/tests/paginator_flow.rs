mod support;

use std::collections::BTreeMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use sunbeam::jobs;
use sunbeam::page::{Followup, HandOff, Job, JobOutcome, PageId};
use sunbeam::root::extension_items;
use sunbeam::{AppMessage, Paginator, RootPage, Runner};
use sunbeam_protocol::ParamValue;
use sunbeam_store::History;
use sunbeam_tui::{default_keybindings_handle, visible_width, InputEvent};
use support::{demo_manifest, extension, plain, registry, script, HostSpy, PING_EXTENSION};

fn demo_paginator() -> Paginator {
    let mut paginator = Paginator::new(
        registry(vec![extension("demo", demo_manifest())]),
        default_keybindings_handle(),
    );
    paginator.set_size(60, 12);
    paginator
}

/// Root page listing the demo root item titled `title` only.
fn demo_root(paginator: &Paginator, title: &str, history: Option<History>) -> RootPage {
    let demo = paginator.registry().get("demo").expect("demo is registered");
    let mut items = extension_items(demo, &[]);
    items.retain(|item| item.title == title);
    RootPage::new(
        "Sunbeam",
        items,
        paginator.registry().extensions().clone(),
        history,
        paginator.keybindings().clone(),
    )
}

fn demo_runner(paginator: &Paginator, command: &str) -> Runner {
    let demo = paginator.registry().get("demo").cloned().expect("demo is registered");
    Runner::new(demo, command, BTreeMap::new(), paginator.keybindings().clone())
        .expect("command exists")
}

fn command_output(target: PageId, output: &[u8]) -> AppMessage {
    AppMessage {
        target,
        outcome: JobOutcome::Command {
            query: None,
            result: Ok(output.to_vec()),
        },
    }
}

/// Pushes an `items` runner listing one entry whose first action is `action`.
fn list_owner(paginator: &mut Paginator, host: &mut HostSpy, action: serde_json::Value) -> PageId {
    let runner = demo_runner(paginator, "items");
    let owner = paginator.push(Box::new(runner), host);
    host.jobs.clear();
    let output = serde_json::json!({
        "type": "list",
        "items": [{"title": "Entry", "actions": [action]}]
    });
    paginator.handle_message(command_output(owner, output.to_string().as_bytes()), host);
    owner
}

fn submit_text(paginator: &mut Paginator, host: &mut HostSpy, text: &str) {
    for ch in text.chars() {
        paginator.handle_input(&InputEvent::text(ch.to_string()), host);
    }
    paginator.handle_input(&InputEvent::key("enter"), host);
}

fn job_targets(host: &HostSpy) -> Vec<(PageId, &'static str)> {
    host.jobs.iter().map(|(target, job)| (*target, job.name())).collect()
}

#[test]
fn popping_the_only_page_ends_the_session() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    paginator.push(Box::new(root), &mut host);
    assert_eq!(paginator.depth(), 1);
    assert!(!paginator.should_exit());

    paginator.pop();

    assert_eq!(paginator.depth(), 0);
    assert!(paginator.should_exit());
}

#[test]
fn escape_on_the_root_page_exits() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    paginator.push(Box::new(root), &mut host);

    paginator.handle_input(&InputEvent::key("escape"), &mut host);

    assert!(paginator.should_exit());
}

#[test]
fn ctrl_c_exits_from_any_depth() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    paginator.push(Box::new(root), &mut host);
    let runner = demo_runner(&paginator, "show");
    paginator.push(Box::new(runner), &mut host);

    paginator.handle_input(&InputEvent::key("ctrl+c"), &mut host);

    assert!(paginator.should_exit());
    assert_eq!(paginator.depth(), 2);
}

#[test]
fn choosing_a_page_command_pushes_a_runner_and_records_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let history_path = dir.path().join("history.json");
    let history = History::load(&history_path).expect("missing history is empty");

    let mut paginator = demo_paginator().with_history(history.clone());
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", Some(history));
    paginator.push(Box::new(root), &mut host);

    paginator.handle_input(&InputEvent::key("enter"), &mut host);

    assert_eq!(paginator.depth(), 2);
    assert_eq!(paginator.top_title().as_deref(), Some("Show"));
    assert_eq!(host.job_names(), vec!["run-command"]);
    let (target, _) = &host.jobs[0];
    assert_eq!(Some(*target), paginator.top_id());

    let recorded = paginator.history().expect("history is attached");
    assert!(recorded.last_used("demo/show/Show").is_some());
    let saved = History::load(&history_path).expect("history reloads");
    assert!(saved.last_used("demo/show/Show").is_some());
}

#[test]
fn choosing_a_silent_command_runs_it_in_the_background() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Notify", None);
    let root_id = paginator.push(Box::new(root), &mut host);

    paginator.handle_input(&InputEvent::key("enter"), &mut host);

    assert_eq!(paginator.depth(), 1);
    assert_eq!(host.job_names(), vec!["silent"]);
    assert_eq!(host.jobs[0].0, root_id);
}

#[test]
fn failed_commands_replace_the_page_without_changing_depth() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    paginator.push(Box::new(root), &mut host);
    let runner = demo_runner(&paginator, "show");
    let runner_id = paginator.push(Box::new(runner), &mut host);

    paginator.handle_message(
        AppMessage {
            target: runner_id,
            outcome: JobOutcome::Command {
                query: None,
                result: Ok(b"not json".to_vec()),
            },
        },
        &mut host,
    );

    assert_eq!(paginator.depth(), 2);
    assert_eq!(paginator.top_title().as_deref(), Some("Error"));
    assert_ne!(paginator.top_id(), Some(runner_id));
}

#[test]
fn replies_for_closed_pages_are_dropped() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    paginator.push(Box::new(root), &mut host);
    let runner = demo_runner(&paginator, "show");
    let runner_id = paginator.push(Box::new(runner), &mut host);
    paginator.pop();

    paginator.handle_message(
        AppMessage {
            target: runner_id,
            outcome: JobOutcome::Command {
                query: None,
                result: Ok(br#"{"type": "detail", "text": "late"}"#.to_vec()),
            },
        },
        &mut host,
    );

    assert_eq!(paginator.depth(), 1);
    assert_eq!(paginator.top_title().as_deref(), Some("Sunbeam"));
    assert!(!plain(&paginator.render()).contains("late"));
}

#[test]
fn copy_followups_show_a_notice_or_exit() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    let root_id = paginator.push(Box::new(root), &mut host);

    paginator.handle_message(
        AppMessage {
            target: root_id,
            outcome: JobOutcome::Done {
                result: Ok(()),
                followup: Followup {
                    notice: Some("Copied!".to_string()),
                    ..Followup::default()
                },
            },
        },
        &mut host,
    );
    assert_eq!(paginator.notice(), Some("Copied!"));
    assert!(plain(&paginator.render()).contains("Copied!"));

    paginator.handle_input(&InputEvent::key("down"), &mut host);
    assert_eq!(paginator.notice(), None);

    paginator.handle_message(
        AppMessage {
            target: root_id,
            outcome: JobOutcome::Done {
                result: Ok(()),
                followup: Followup::exit_or_reload(true, false),
            },
        },
        &mut host,
    );
    assert!(paginator.should_exit());
}

#[test]
fn failed_hand_offs_show_an_error() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    let root_id = paginator.push(Box::new(root), &mut host);

    paginator.hand_off_finished(
        root_id,
        Err("editor exited with status 1".to_string()),
        Followup::default(),
        &mut host,
    );

    assert_eq!(paginator.depth(), 1);
    assert_eq!(paginator.top_title().as_deref(), Some("Error"));
    assert!(plain(&paginator.render()).contains("editor exited with status 1"));
}

#[test]
fn tty_commands_hand_the_terminal_off_and_close() {
    let mut manifest = demo_manifest();
    manifest.commands.push(
        serde_json::from_value(serde_json::json!({
            "name": "edit", "title": "Edit", "mode": "tty"
        }))
        .expect("command deserializes"),
    );
    let mut paginator = Paginator::new(
        registry(vec![extension("demo", manifest)]),
        default_keybindings_handle(),
    );
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    paginator.push(Box::new(root), &mut host);
    let runner = demo_runner(&paginator, "edit");
    let runner_id = paginator.push(Box::new(runner), &mut host);

    assert!(host.jobs.is_empty());
    assert_eq!(host.hand_offs.len(), 1);
    let (target, request, followup) = host.hand_offs.remove(0);
    assert_eq!(target, runner_id);
    assert!(matches!(request, HandOff::Extension { ref command, .. } if command == "edit"));
    assert!(followup.close);

    paginator.hand_off_finished(target, Ok(()), followup, &mut host);
    assert_eq!(paginator.depth(), 1);
}

#[test]
fn ping_extension_renders_its_output() {
    let (_dir, path) = script(PING_EXTENSION);
    let client = support::client();
    let ping = extension_client::Extension::load(
        Arc::clone(&client),
        "ping",
        extension_client::Origin::File(path),
        BTreeMap::new(),
    )
    .expect("manifest loads");

    let mut paginator = Paginator::new(registry(vec![ping]), default_keybindings_handle());
    paginator.set_size(60, 12);
    let mut host = HostSpy::default();
    let ping = paginator.registry().get("ping").expect("ping is registered");
    let root = RootPage::new(
        "Sunbeam",
        extension_items(ping, &[]),
        paginator.registry().extensions().clone(),
        None,
        paginator.keybindings().clone(),
    );
    paginator.push(Box::new(root), &mut host);
    paginator.handle_input(&InputEvent::key("enter"), &mut host);

    let (target, job) = host.take_job();
    assert!(matches!(job, Job::RunCommand { .. }));
    assert!(plain(&paginator.render()).contains("Loading"));

    let outcome = jobs::execute(job);
    paginator.handle_message(AppMessage { target, outcome }, &mut host);

    let screen = plain(&paginator.render());
    assert!(screen.contains("pong"), "screen was:\n{screen}");
    assert_eq!(paginator.depth(), 2);
}

#[test]
fn resizes_reach_pages_below_the_top() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let root = demo_root(&paginator, "Show", None);
    paginator.push(Box::new(root), &mut host);
    let runner = demo_runner(&paginator, "show");
    paginator.push(Box::new(runner), &mut host);

    paginator.handle_input(&InputEvent::Resize { columns: 50, rows: 8 }, &mut host);
    paginator.pop();

    let lines = paginator.render();
    assert_eq!(paginator.top_title().as_deref(), Some("Sunbeam"));
    assert_eq!(lines.len(), 8);
    assert!(lines.iter().all(|line| visible_width(line) == 50));
}

#[test]
fn pushed_silent_commands_hand_their_printed_action_to_the_owner() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let owner = list_owner(
        &mut paginator,
        &mut host,
        serde_json::json!({"type": "run", "command": "save"}),
    );

    paginator.handle_input(&InputEvent::key("enter"), &mut host);
    assert_eq!(paginator.depth(), 2);
    let silent = paginator.top_id().expect("params runner is on top");
    assert!(host.jobs.is_empty());

    submit_text(&mut paginator, &mut host, "x");
    let (target, job) = host.take_job();
    assert_eq!(target, silent);
    match job {
        Job::RunCommand { command, params, .. } => {
            assert_eq!(command, "save");
            assert_eq!(params.get("p"), Some(&ParamValue::from("x")));
        }
        _ => panic!("expected the silent command to run"),
    }

    paginator.handle_message(command_output(silent, br#"{"type": "reload"}"#), &mut host);

    assert_eq!(paginator.depth(), 1);
    assert_eq!(paginator.top_id(), Some(owner));
    assert_eq!(job_targets(&host), vec![(owner, "run-command")]);
}

#[test]
fn pushed_silent_commands_apply_their_followup_to_the_owner() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let owner = list_owner(
        &mut paginator,
        &mut host,
        serde_json::json!({"type": "run", "command": "save", "reload": true}),
    );
    paginator.handle_input(&InputEvent::key("enter"), &mut host);
    let silent = paginator.top_id().expect("params runner is on top");
    submit_text(&mut paginator, &mut host, "x");
    host.jobs.clear();

    paginator.handle_message(command_output(silent, b"\n"), &mut host);

    assert_eq!(paginator.depth(), 1);
    assert_eq!(job_targets(&host), vec![(owner, "run-command")]);
}

#[test]
fn exit_flag_survives_collecting_params_for_a_silent_command() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    list_owner(
        &mut paginator,
        &mut host,
        serde_json::json!({"type": "run", "command": "save", "exit": true}),
    );
    paginator.handle_input(&InputEvent::key("enter"), &mut host);
    let silent = paginator.top_id().expect("params runner is on top");
    submit_text(&mut paginator, &mut host, "x");

    paginator.handle_message(command_output(silent, b""), &mut host);

    assert!(paginator.should_exit());
}

#[test]
fn pushed_tty_commands_hand_off_for_the_owner_with_its_followup() {
    let mut paginator = demo_paginator();
    let mut host = HostSpy::default();
    let owner = list_owner(
        &mut paginator,
        &mut host,
        serde_json::json!({"type": "run", "command": "term", "exit": true}),
    );
    paginator.handle_input(&InputEvent::key("enter"), &mut host);
    assert_eq!(paginator.depth(), 2);

    submit_text(&mut paginator, &mut host, "x");

    assert_eq!(paginator.depth(), 1);
    assert!(host.jobs.is_empty());
    assert_eq!(host.hand_offs.len(), 1);
    let (target, request, followup) = host.hand_offs.remove(0);
    assert_eq!(target, owner);
    match &request {
        HandOff::Extension { command, params, .. } => {
            assert_eq!(command, "term");
            assert_eq!(params.get("p"), Some(&ParamValue::from("x")));
        }
        other => panic!("expected an extension hand-off, got {other:?}"),
    }
    assert!(followup.exit);

    paginator.hand_off_finished(target, Ok(()), followup, &mut host);
    assert!(paginator.should_exit());
}
