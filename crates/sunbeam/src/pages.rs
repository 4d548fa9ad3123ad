//! Small pages: input prompts, preferences and errors.

use std::collections::BTreeMap;
use std::sync::Arc;

use extension_client::Extension;
use sunbeam_protocol::{Action, ActionType, Detail, InputSpec, ParamValue};
use sunbeam_tui::core::style;
use sunbeam_tui::{InputEvent, KeybindingsHandle};

use crate::actions::{dispatch, Owner, COPIED_NOTICE};
use crate::form::{Form, FormEvent};
use crate::page::{Effect, Followup, Job, Page, PageContext, PageId, PageMessage};
use crate::template::Scope;
use crate::views::{chrome, title_header, DetailView, ViewEvent, CHROME_ROWS};

const SUBMIT_HINT: &str = "Submit ctrl+s";

/// Renders `form` inside the page chrome.
pub fn render_form(
    form: &mut Form,
    title: &str,
    loading: bool,
    width: usize,
    height: usize,
) -> Vec<String> {
    let body_height = height.saturating_sub(CHROME_ROWS);
    let body = form.render(width, body_height);
    let footer = style::dim(&format!(" {title} · {SUBMIT_HINT}"));
    chrome(title_header(title, loading), body, footer, width, height)
}

/// Prompts for the inputs of an action, then hands the action back to the
/// page that dispatched it.
pub struct InputsPage {
    target: PageId,
    action: Action,
    form: Form,
    width: usize,
    height: usize,
}

impl InputsPage {
    pub fn new(
        target: PageId,
        action: Action,
        inputs: Vec<InputSpec>,
        keybindings: KeybindingsHandle,
    ) -> Self {
        Self {
            target,
            action,
            form: Form::new(inputs, keybindings),
            width: 0,
            height: 0,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }
}

impl Page for InputsPage {
    fn title(&self) -> String {
        self.action.display_title()
    }

    fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    fn render(&mut self) -> Vec<String> {
        let title = self.title();
        render_form(&mut self.form, &title, false, self.width, self.height)
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut PageContext) {
        match self.form.handle_event(event) {
            FormEvent::Submit(inputs) => {
                ctx.close();
                ctx.emit(Effect::Deliver {
                    target: self.target,
                    message: PageMessage::Dispatch {
                        action: self.action.clone(),
                        inputs,
                    },
                });
            }
            FormEvent::Cancel => ctx.close(),
            FormEvent::None => {}
        }
    }
}

/// Edits the preferences of one extension.
pub struct PreferencesPage {
    target: PageId,
    alias: String,
    title: String,
    form: Form,
    width: usize,
    height: usize,
}

impl PreferencesPage {
    pub fn new(target: PageId, extension: &Extension, keybindings: KeybindingsHandle) -> Self {
        Self {
            target,
            alias: extension.alias.clone(),
            title: format!("{} Preferences", extension.manifest.title),
            form: preferences_form(extension, keybindings),
            width: 0,
            height: 0,
        }
    }
}

/// Form over every preference, prefilled with the current values.
pub fn preferences_form(extension: &Extension, keybindings: KeybindingsHandle) -> Form {
    let inputs = extension
        .manifest
        .preferences
        .iter()
        .cloned()
        .map(|mut spec| {
            if let Some(value) = extension.preferences.get(&spec.name) {
                spec.default = Some(value.clone());
            }
            spec
        })
        .collect();
    Form::new(inputs, keybindings)
}

impl Page for PreferencesPage {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    fn render(&mut self) -> Vec<String> {
        render_form(&mut self.form, &self.title, false, self.width, self.height)
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut PageContext) {
        match self.form.handle_event(event) {
            FormEvent::Submit(values) => {
                ctx.close();
                ctx.emit(Effect::SavePreferences {
                    target: self.target,
                    alias: self.alias.clone(),
                    values,
                });
            }
            FormEvent::Cancel => ctx.close(),
            FormEvent::None => {}
        }
    }
}

/// Shows a failure in place of the page that hit it.
pub struct ErrorPage {
    message: String,
    view: DetailView,
    owner: Owner,
}

impl ErrorPage {
    pub fn new(message: impl Into<String>, keybindings: KeybindingsHandle) -> Self {
        let message = message.into();
        let detail = Detail {
            title: Some("Error".to_string()),
            text: Some(message.clone()),
            actions: vec![Action::new(ActionType::Copy).with_title("Copy Error")],
            ..Detail::default()
        };
        Self {
            message,
            view: DetailView::new("Error", detail, keybindings.clone()),
            owner: Owner::new(None, keybindings),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Page for ErrorPage {
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
            // The message is copied verbatim, never expanded as a template.
            ViewEvent::Action(action) if action.kind == ActionType::Copy => {
                ctx.spawn(Job::Copy {
                    text: self.message.clone(),
                    followup: Followup {
                        notice: Some(COPIED_NOTICE.to_string()),
                        ..Followup::default()
                    },
                });
            }
            ViewEvent::Action(action) => dispatch(&action, &self.owner, &Scope::default(), ctx),
            ViewEvent::Cancel => ctx.close(),
            ViewEvent::None | ViewEvent::QueryChanged(_) => {}
        }
    }
}

/// Copy of `extension` with `values` layered over its preferences.
pub fn merged_preferences(
    extension: &Arc<Extension>,
    values: BTreeMap<String, ParamValue>,
) -> Extension {
    let mut updated = Extension::clone(extension);
    let mut preferences = updated.preferences.clone();
    preferences.extend(values);
    updated.set_preferences(preferences);
    updated
}
