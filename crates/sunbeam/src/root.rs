//! Root list: extension entry points and one-liners, most recent first.

use std::collections::BTreeMap;
use std::sync::Arc;

use extension_client::Extension;
use sunbeam_protocol::{Action, ActionParam, ActionType, List, ListItem, RootItem};
use sunbeam_store::{Config, History, Oneliner};
use sunbeam_tui::{FilterItem, InputEvent, KeybindingsHandle};

use crate::actions::{dispatch, Owner};
use crate::page::{Effect, Page, PageContext, PageMessage};
use crate::template::Scope;
use crate::views::{ListEntry, ListView, ViewEvent};

pub const ROOT_TITLE: &str = "Sunbeam";

/// Items for every extension and one-liner, in registry order.
pub fn root_items(
    extensions: &BTreeMap<String, Arc<Extension>>,
    config: &Config,
) -> Vec<ListItem> {
    let mut items = Vec::new();
    for (alias, extension) in extensions {
        let extra = config
            .extensions
            .get(alias)
            .map(|entry| entry.root.as_slice())
            .unwrap_or_default();
        items.extend(extension_items(extension, extra));
    }
    items.extend(config.oneliners.iter().map(oneliner_item));
    items
}

/// Root items of one extension: the manifest's own followed by `extra`.
/// Items naming an unknown command are skipped.
pub fn extension_items(extension: &Extension, extra: &[RootItem]) -> Vec<ListItem> {
    let manifest = &extension.manifest;
    let own = manifest.root_items();
    own.iter()
        .chain(extra)
        .filter_map(|root| {
            let spec = manifest.command(&root.command)?;
            let title = root.title.clone().unwrap_or_else(|| spec.title.clone());

            let mut run = Action::run(root.command.clone()).with_title("Run");
            run.extension = Some(extension.alias.clone());
            run.params = root.params.clone();
            let mut actions = vec![run];
            if !manifest.preferences.is_empty() {
                let mut configure =
                    Action::new(ActionType::Config).with_title("Configure Extension");
                configure.extension = Some(extension.alias.clone());
                actions.push(configure);
            }
            actions.push(
                Action::copy(command_line(&extension.alias, root)).with_title("Copy Command Line"),
            );

            Some(ListItem {
                id: Some(format!("{}/{}/{title}", extension.alias, root.command)),
                subtitle: Some(manifest.title.clone()),
                accessories: vec![extension.alias.clone()],
                actions,
                ..ListItem::new(title)
            })
        })
        .collect()
}

fn oneliner_item(oneliner: &Oneliner) -> ListItem {
    let mut exec = Action::new(ActionType::Exec).with_title("Run");
    exec.command = Some(oneliner.command.clone());
    exec.dir = oneliner.dir.clone();
    exec.exit = oneliner.exit;
    ListItem {
        id: Some(format!("oneliner/{}", oneliner.title)),
        subtitle: Some("Oneliner".to_string()),
        actions: vec![
            exec,
            Action::copy(oneliner.command.clone()).with_title("Copy Command"),
        ],
        ..ListItem::new(oneliner.title.clone())
    }
}

/// `sunbeam <alias> <command> -p name=value ...`, with bound params only.
fn command_line(alias: &str, root: &RootItem) -> String {
    let mut words = vec![
        "sunbeam".to_string(),
        alias.to_string(),
        root.command.clone(),
    ];
    for (name, param) in &root.params {
        if let ActionParam::Value(value) = param {
            words.push("-p".to_string());
            words.push(format!("{name}={value}"));
        }
    }
    shell_words::join(words)
}

pub struct RootPage {
    view: ListView,
    extensions: BTreeMap<String, Arc<Extension>>,
    keybindings: KeybindingsHandle,
}

impl RootPage {
    pub fn new(
        title: impl Into<String>,
        items: Vec<ListItem>,
        extensions: BTreeMap<String, Arc<Extension>>,
        history: Option<History>,
        keybindings: KeybindingsHandle,
    ) -> Self {
        let list = List {
            items,
            ..List::default()
        };
        let mut view = ListView::new(title, list, keybindings.clone());
        if let Some(history) = history {
            view.set_less(Box::new(move |a: &ListEntry, b: &ListEntry| {
                history.compare(a.id(), b.id())
            }));
        }
        Self {
            view,
            extensions,
            keybindings,
        }
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    fn owner(&self, action: &Action) -> Owner {
        let extension = action
            .extension
            .as_ref()
            .and_then(|alias| self.extensions.get(alias))
            .cloned();
        Owner::new(extension, self.keybindings.clone())
    }
}

impl Page for RootPage {
    fn title(&self) -> String {
        self.view.title().to_string()
    }

    fn set_size(&mut self, width: usize, height: usize) {
        self.view.set_size(width, height);
    }

    fn render(&mut self) -> Vec<String> {
        self.view.render()
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut PageContext) {
        match self.view.handle_event(event) {
            ViewEvent::Action(action) => {
                if let Some(id) = self.view.selected_id() {
                    ctx.emit(Effect::RecordHistory(id.to_string()));
                }
                let scope = Scope {
                    query: Some(self.view.query().to_string()),
                    ..Scope::default()
                };
                dispatch(&action, &self.owner(&action), &scope, ctx);
            }
            ViewEvent::Cancel => ctx.close(),
            ViewEvent::None | ViewEvent::QueryChanged(_) => {}
        }
    }

    fn on_message(&mut self, message: PageMessage, ctx: &mut PageContext) {
        match message {
            PageMessage::Dispatch { action, inputs } => {
                dispatch(&action, &self.owner(&action), &Scope::with_inputs(inputs), ctx);
            }
            PageMessage::ExtensionUpdated(extension) => {
                self.extensions.insert(extension.alias.clone(), extension);
            }
            PageMessage::Reload { .. } | PageMessage::Job(_) => {}
        }
    }
}
