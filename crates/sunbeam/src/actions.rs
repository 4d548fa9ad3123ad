//! Turns extension actions into paginator effects.

use std::collections::BTreeMap;
use std::sync::Arc;

use extension_client::Extension;
use sunbeam_protocol::{Action, ActionParam, ActionType, InputSpec, InputType, ParamValue};
use sunbeam_tui::{lock_keybindings, KeyAction, KeybindingsHandle};

use crate::page::{Effect, Followup, HandOff, Job, PageContext, PageMessage, RunRequest};
use crate::pages::InputsPage;
use crate::template::{expand, Scope};

pub const COPIED_NOTICE: &str = "Copied!";

/// Action bound to `key_id`: enter picks the first, alt+enter the second and
/// `alt+<key>` the one declaring that key.
pub fn shortcut<'a>(
    actions: &'a [Action],
    key_id: &str,
    keybindings: &KeybindingsHandle,
) -> Option<&'a Action> {
    {
        let keybindings = lock_keybindings(keybindings);
        if keybindings.matches(key_id, KeyAction::Confirm) {
            return actions.first();
        }
        if keybindings.matches(key_id, KeyAction::SecondaryConfirm) {
            return actions.get(1);
        }
    }
    let key = key_id.strip_prefix("alt+")?;
    actions
        .iter()
        .find(|action| action.key.as_deref() == Some(key))
}

/// Page dispatching an action, and the extension it belongs to.
#[derive(Clone)]
pub struct Owner {
    pub extension: Option<Arc<Extension>>,
    pub keybindings: KeybindingsHandle,
}

impl Owner {
    pub fn new(extension: Option<Arc<Extension>>, keybindings: KeybindingsHandle) -> Self {
        Self {
            extension,
            keybindings,
        }
    }
}

/// Emits the effects of `action` on behalf of the page behind `ctx`.
///
/// Params still waiting for input are collected first: a form is pushed and
/// the action comes back through [`PageMessage::Dispatch`] once submitted.
pub fn dispatch(action: &Action, owner: &Owner, scope: &Scope, ctx: &mut PageContext) {
    let pending: Vec<&str> = action
        .unresolved_inputs()
        .into_iter()
        .filter(|name| !scope.inputs.contains_key(*name))
        .collect();
    if !pending.is_empty() {
        let inputs = pending
            .iter()
            .map(|name| input_spec(action, owner, name))
            .collect();
        tracing::debug!(inputs = ?pending, "collecting action inputs");
        let target = ctx.id();
        ctx.push(InputsPage::new(
            target,
            action.clone(),
            inputs,
            owner.keybindings.clone(),
        ));
        return;
    }

    let followup = Followup::exit_or_reload(action.exit, action.reload);
    match action.kind {
        ActionType::Copy => {
            let text = expand(action.text.as_deref().unwrap_or_default(), scope, false);
            ctx.spawn(Job::Copy {
                text,
                followup: Followup {
                    notice: Some(COPIED_NOTICE.to_string()),
                    ..followup
                },
            });
        }
        ActionType::Open => {
            let Some(target) = action.url.as_deref().or(action.path.as_deref()) else {
                ctx.fail("open action needs a url or a path");
                return;
            };
            ctx.spawn(Job::Open {
                target: expand(target, scope, false),
                app: action.app.clone(),
                followup,
            });
        }
        ActionType::Run | ActionType::Push => {
            let Some(command) = action.command.clone() else {
                ctx.fail(format!("{} action needs a command", action.kind.as_str()));
                return;
            };
            let Some(extension) = action
                .extension
                .clone()
                .or_else(|| owner.extension.as_ref().map(|ext| ext.alias.clone()))
            else {
                ctx.fail(format!("no extension to run `{command}` in"));
                return;
            };
            ctx.emit(Effect::Run(RunRequest {
                owner: ctx.id(),
                extension,
                command,
                params: resolve_params(&action.params, scope),
                push: action.kind == ActionType::Push,
                followup,
            }));
        }
        ActionType::Exec => {
            let Some(command) = action.command.as_deref() else {
                ctx.fail("exec action needs a command");
                return;
            };
            ctx.hand_off(
                HandOff::Shell {
                    command: expand(command, scope, true),
                    dir: action.dir.as_deref().map(|dir| expand(dir, scope, false)),
                },
                followup,
            );
        }
        ActionType::Edit => {
            let Some(path) = action.path.as_deref() else {
                ctx.fail("edit action needs a path");
                return;
            };
            ctx.hand_off(
                HandOff::Editor {
                    path: expand(path, scope, false),
                },
                followup,
            );
        }
        ActionType::Reload => {
            let target = ctx.id();
            ctx.emit(Effect::Deliver {
                target,
                message: PageMessage::Reload {
                    params: resolve_params(&action.params, scope),
                },
            });
        }
        ActionType::Config => {
            let Some(alias) = action
                .extension
                .clone()
                .or_else(|| owner.extension.as_ref().map(|ext| ext.alias.clone()))
            else {
                ctx.fail("no extension to configure");
                return;
            };
            let target = ctx.id();
            ctx.emit(Effect::Configure { target, alias });
        }
        ActionType::Exit => ctx.exit(),
    }
}

/// Bound values with templates expanded and collected inputs filled in.
pub fn resolve_params(
    params: &BTreeMap<String, ActionParam>,
    scope: &Scope,
) -> BTreeMap<String, ParamValue> {
    params
        .iter()
        .filter_map(|(name, param)| {
            let value = match param {
                ActionParam::Value(ParamValue::String(text)) => {
                    ParamValue::String(expand(text, scope, false))
                }
                ActionParam::Value(value) => value.clone(),
                ActionParam::Input { .. } => scope.inputs.get(name)?.clone(),
            };
            Some((name.clone(), value))
        })
        .collect()
}

/// Field for an input param, shaped after the target command's declaration
/// when the owner knows it.
fn input_spec(action: &Action, owner: &Owner, name: &str) -> InputSpec {
    let (default, required) = match action.params.get(name) {
        Some(ActionParam::Input { default, required }) => (default.clone(), *required),
        _ => (None, false),
    };
    let same_extension = action.extension.is_none()
        || owner
            .extension
            .as_ref()
            .is_some_and(|ext| action.extension.as_deref() == Some(ext.alias.as_str()));
    let declared = owner
        .extension
        .as_ref()
        .filter(|_| same_extension)
        .zip(action.command.as_deref())
        .and_then(|(ext, command)| ext.manifest.command(command)?.param(name).cloned());

    let mut spec = declared.unwrap_or_else(|| InputSpec::new(name, name, InputType::Text));
    if default.is_some() {
        spec.default = default;
    }
    spec.required = spec.required || required;
    spec
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use sunbeam_protocol::{Action, ActionParam, ActionType, ParamValue};
    use sunbeam_tui::default_keybindings_handle;

    use super::{dispatch, resolve_params, shortcut, Owner};
    use crate::page::{Effect, HandOff, Job, PageContext, PageMessage};
    use crate::template::Scope;

    fn owner() -> Owner {
        Owner::new(None, default_keybindings_handle())
    }

    fn run(action: &Action, scope: &Scope) -> Vec<Effect> {
        let mut ctx = PageContext::new(7);
        dispatch(action, &owner(), scope, &mut ctx);
        ctx.into_effects()
    }

    #[test]
    fn copy_expands_inputs_and_sets_notice() {
        let mut inputs = BTreeMap::new();
        inputs.insert("name".to_string(), ParamValue::from("abc"));
        let effects = run(&Action::copy("${input:name}"), &Scope::with_inputs(inputs));
        match effects.as_slice() {
            [Effect::Spawn {
                target: 7,
                job: Job::Copy { text, followup },
            }] => {
                assert_eq!(text, "abc");
                assert_eq!(followup.notice.as_deref(), Some("Copied!"));
            }
            _ => panic!("expected a copy job"),
        }
    }

    #[test]
    fn run_with_explicit_extension_emits_request() {
        let mut action = Action::run("show");
        action.extension = Some("gh".to_string());
        action.exit = true;
        action
            .params
            .insert("id".to_string(), ActionParam::Value(ParamValue::from("${query}")));
        let scope = Scope {
            query: Some("42".to_string()),
            ..Scope::default()
        };
        match run(&action, &scope).as_slice() {
            [Effect::Run(request)] => {
                assert_eq!(request.owner, 7);
                assert_eq!(request.extension, "gh");
                assert_eq!(request.params["id"], ParamValue::from("42"));
                assert!(request.followup.exit);
                assert!(!request.push);
            }
            _ => panic!("expected a run request"),
        }
    }

    #[test]
    fn run_without_extension_fails_the_page() {
        match run(&Action::run("show"), &Scope::default()).as_slice() {
            [Effect::Fail { target: 7, message }] => assert!(message.contains("show")),
            _ => panic!("expected a failure"),
        }
    }

    #[test]
    fn unresolved_inputs_push_a_form() {
        let mut action = Action::copy("${input:name}");
        action.params.insert(
            "name".to_string(),
            ActionParam::Input {
                default: None,
                required: true,
            },
        );
        assert!(matches!(run(&action, &Scope::default()).as_slice(), [Effect::Push(_)]));

        let mut inputs = BTreeMap::new();
        inputs.insert("name".to_string(), ParamValue::from("x"));
        assert!(matches!(
            run(&action, &Scope::with_inputs(inputs)).as_slice(),
            [Effect::Spawn { .. }]
        ));
    }

    #[test]
    fn exec_quotes_substitutions() {
        let mut action = Action::new(ActionType::Exec);
        action.command = Some("echo ${input:msg}".to_string());
        let mut inputs = BTreeMap::new();
        inputs.insert("msg".to_string(), ParamValue::from("a b"));
        match run(&action, &Scope::with_inputs(inputs)).as_slice() {
            [Effect::HandOff {
                request: HandOff::Shell { command, dir: None },
                ..
            }] => assert_eq!(command, "echo 'a b'"),
            _ => panic!("expected a shell hand-off"),
        }
    }

    #[test]
    fn reload_is_delivered_to_the_owner() {
        match run(&Action::new(ActionType::Reload), &Scope::default()).as_slice() {
            [Effect::Deliver {
                target: 7,
                message: PageMessage::Reload { params },
            }] => assert!(params.is_empty()),
            _ => panic!("expected a reload"),
        }
    }

    #[test]
    fn exit_action_exits() {
        assert!(matches!(
            run(&Action::new(ActionType::Exit), &Scope::default()).as_slice(),
            [Effect::Exit]
        ));
    }

    #[test]
    fn resolve_params_skips_missing_inputs() {
        let mut params = BTreeMap::new();
        params.insert("flag".to_string(), ActionParam::Value(ParamValue::from(true)));
        params.insert(
            "name".to_string(),
            ActionParam::Input {
                default: None,
                required: false,
            },
        );
        let resolved = resolve_params(&params, &Scope::default());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["flag"], ParamValue::from(true));
    }

    #[test]
    fn shortcuts_follow_action_order_and_keys() {
        let kb = default_keybindings_handle();
        let mut keyed = Action::copy("k");
        keyed.key = Some("c".to_string());
        let actions = vec![Action::copy("first"), Action::copy("second"), keyed];
        let pick = |key: &str| {
            shortcut(&actions, key, &kb)
                .and_then(|action| action.text.clone())
        };
        assert_eq!(pick("enter").as_deref(), Some("first"));
        assert_eq!(pick("alt+enter").as_deref(), Some("second"));
        assert_eq!(pick("alt+c").as_deref(), Some("k"));
        assert_eq!(pick("alt+z"), None);
    }
}
