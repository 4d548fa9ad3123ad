//! Page that runs one extension command and shows what it prints.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use extension_client::{Extension, ExtensionError};
use sunbeam_protocol::{
    decode_command, decode_page, Action, CommandSpec, InputSpec, InputType, Mode, ParamValue,
};
use sunbeam_tui::core::style;
use sunbeam_tui::{lock_keybindings, InputEvent, KeyAction, KeybindingsHandle};

use crate::actions::{dispatch, Owner};
use crate::form::{Form, FormEvent};
use crate::page::{
    Effect, Followup, HandOff, Job, JobOutcome, Page, PageContext, PageId, PageMessage,
};
use crate::pages::{preferences_form, render_form};
use crate::template::Scope;
use crate::views::{chrome, title_header, DetailView, ListView, ViewEvent};

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

enum State {
    Loading,
    Preferences(Form),
    Params(Form),
    List(ListView),
    Detail(DetailView),
    Form {
        form: Form,
        title: String,
        submit: Option<Action>,
    },
}

/// Coarse view of what a runner currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerStatus {
    Loading,
    Preferences(Vec<String>),
    Params(Vec<String>),
    List,
    Detail,
    Form,
}

enum Step {
    None,
    Close,
    Dispatch(Action, Scope),
    Query(String),
    SavePreferences(BTreeMap<String, ParamValue>),
    Rerun(BTreeMap<String, ParamValue>),
}

pub struct Runner {
    extension: Arc<Extension>,
    spec: CommandSpec,
    params: BTreeMap<String, ParamValue>,
    keybindings: KeybindingsHandle,
    /// Page that asked for the run. Silent and tty results land there.
    owner: Option<PageId>,
    /// Applied to the owner once a silent or tty run succeeds.
    followup: Followup,
    state: State,
    loading: bool,
    /// Query the last command run was tagged with.
    query: Option<String>,
    /// Latest typed query, waiting for its debounce.
    pending_query: Option<String>,
    width: usize,
    height: usize,
}

impl Runner {
    pub fn new(
        extension: Arc<Extension>,
        command: &str,
        params: BTreeMap<String, ParamValue>,
        keybindings: KeybindingsHandle,
    ) -> Result<Self, ExtensionError> {
        let spec = extension.command(command)?.clone();
        Ok(Self {
            extension,
            spec,
            params,
            keybindings,
            owner: None,
            followup: Followup::default(),
            state: State::Loading,
            loading: false,
            query: None,
            pending_query: None,
            width: 0,
            height: 0,
        })
    }

    /// Routes silent output and tty completion to `owner`, then applies
    /// `followup` there.
    #[must_use]
    pub fn with_owner(mut self, owner: PageId, followup: Followup) -> Self {
        self.owner = Some(owner);
        self.followup = followup;
        self
    }

    pub fn status(&self) -> RunnerStatus {
        match &self.state {
            State::Loading => RunnerStatus::Loading,
            State::Preferences(form) => RunnerStatus::Preferences(names(form)),
            State::Params(form) => RunnerStatus::Params(names(form)),
            State::List(_) => RunnerStatus::List,
            State::Detail(_) => RunnerStatus::Detail,
            State::Form { .. } => RunnerStatus::Form,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn list(&self) -> Option<&ListView> {
        match &self.state {
            State::List(view) => Some(view),
            _ => None,
        }
    }

    /// Asks for preferences, then missing params, then runs the command.
    fn start(&mut self, ctx: &mut PageContext) {
        if !self.extension.missing_preferences().is_empty() {
            self.state = State::Preferences(preferences_form(
                &self.extension,
                self.keybindings.clone(),
            ));
            return;
        }
        let missing: Vec<InputSpec> = self
            .spec
            .params
            .iter()
            .filter(|param| param.required && !self.params.contains_key(&param.name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            self.state = State::Params(Form::new(missing, self.keybindings.clone()));
            return;
        }
        self.run(ctx);
    }

    fn run(&mut self, ctx: &mut PageContext) {
        if self.spec.mode == Mode::Tty {
            tracing::debug!(command = %self.spec.name, "handing the terminal to a command");
            let request = HandOff::Extension {
                extension: Arc::clone(&self.extension),
                command: self.spec.name.clone(),
                params: self.params.clone(),
            };
            match self.owner {
                Some(owner) => {
                    ctx.close();
                    ctx.emit(Effect::HandOff {
                        target: owner,
                        request,
                        followup: self.followup.clone(),
                    });
                }
                None => ctx.hand_off(
                    request,
                    Followup {
                        close: true,
                        ..self.followup.clone()
                    },
                ),
            }
            return;
        }
        self.set_loading(true);
        ctx.spawn(Job::RunCommand {
            extension: Arc::clone(&self.extension),
            command: self.spec.name.clone(),
            params: self.params.clone(),
            query: self.query.clone(),
        });
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        match &mut self.state {
            State::List(view) => view.set_loading(loading),
            State::Detail(view) => view.set_loading(loading),
            _ => {}
        }
    }

    fn show_missing_params(&mut self, names: &[String]) {
        let inputs = names
            .iter()
            .map(|name| {
                self.spec
                    .param(name)
                    .cloned()
                    .unwrap_or_else(|| InputSpec::new(name, name, InputType::Text))
            })
            .collect();
        self.state = State::Params(Form::new(inputs, self.keybindings.clone()));
    }

    fn show_output(&mut self, output: &[u8], ctx: &mut PageContext) {
        let validator = self.extension.client().validator();
        if self.spec.mode == Mode::Silent {
            if output.iter().all(u8::is_ascii_whitespace) {
                self.finish_silent(None, ctx);
                return;
            }
            match decode_command(validator, output) {
                Ok(action) => self.finish_silent(Some(action), ctx),
                Err(error) => ctx.fail(error.to_string()),
            }
            return;
        }

        let page = match decode_page(validator, output) {
            Ok(page) => page,
            Err(error) => {
                ctx.fail(error.to_string());
                return;
            }
        };
        let title = self.spec.title.clone();
        match page {
            sunbeam_protocol::Page::List(list) => {
                if let State::List(view) = &mut self.state {
                    view.set_list(list);
                } else {
                    let mut view = ListView::new(title, list, self.keybindings.clone());
                    view.set_size(self.width, self.height);
                    self.state = State::List(view);
                }
            }
            sunbeam_protocol::Page::Detail(detail) => {
                let mut view = DetailView::new(title, detail, self.keybindings.clone());
                view.set_size(self.width, self.height);
                self.state = State::Detail(view);
            }
            sunbeam_protocol::Page::Form(form) => {
                self.state = State::Form {
                    title: form.title.clone().unwrap_or(title),
                    form: Form::new(form.inputs, self.keybindings.clone()),
                    submit: form.submit_action,
                };
            }
        }
    }

    /// Pops this runner and hands the printed action and the followup to
    /// the owner. The command is never re-run from here.
    fn finish_silent(&self, action: Option<Action>, ctx: &mut PageContext) {
        let Some(owner) = self.owner else {
            if let Some(action) = action {
                self.dispatch(&action, Scope::default(), ctx);
            }
            ctx.close();
            return;
        };
        ctx.close();
        if let Some(action) = action {
            ctx.emit(Effect::Deliver {
                target: owner,
                message: PageMessage::Dispatch {
                    action,
                    inputs: BTreeMap::new(),
                },
            });
        }
        ctx.emit(Effect::Finish {
            target: owner,
            followup: self.followup.clone(),
        });
    }

    fn dispatch(&self, action: &Action, mut scope: Scope, ctx: &mut PageContext) {
        if scope.query.is_none() {
            scope.query = self.list().map(|view| view.query().to_string());
        }
        let owner = Owner::new(Some(Arc::clone(&self.extension)), self.keybindings.clone());
        dispatch(action, &owner, &scope, ctx);
    }

    fn apply(&mut self, step: Step, ctx: &mut PageContext) {
        match step {
            Step::None => {}
            Step::Close => ctx.close(),
            Step::Dispatch(action, scope) => self.dispatch(&action, scope, ctx),
            Step::Query(query) => {
                self.pending_query = Some(query.clone());
                ctx.spawn(Job::Debounce {
                    query,
                    delay: DEBOUNCE_DELAY,
                });
            }
            Step::SavePreferences(values) => {
                self.state = State::Loading;
                let target = ctx.id();
                ctx.emit(Effect::SavePreferences {
                    target,
                    alias: self.extension.alias.clone(),
                    values,
                });
            }
            Step::Rerun(values) => {
                self.params.extend(values);
                self.start(ctx);
            }
        }
    }
}

fn names(form: &Form) -> Vec<String> {
    form.field_names().into_iter().map(str::to_string).collect()
}

fn submit_action(action: &Action, values: &BTreeMap<String, ParamValue>) -> Action {
    let mut action = action.clone();
    for (name, value) in values {
        action
            .params
            .entry(name.clone())
            .or_insert_with(|| value.clone().into());
    }
    action
}

impl Page for Runner {
    fn title(&self) -> String {
        match &self.state {
            State::List(view) => view.title().to_string(),
            State::Detail(view) => view.title().to_string(),
            State::Form { title, .. } => title.clone(),
            _ => self.spec.title.clone(),
        }
    }

    fn init(&mut self, ctx: &mut PageContext) {
        self.start(ctx);
    }

    fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        match &mut self.state {
            State::List(view) => view.set_size(width, height),
            State::Detail(view) => view.set_size(width, height),
            _ => {}
        }
    }

    fn render(&mut self) -> Vec<String> {
        let (width, height, loading) = (self.width, self.height, self.loading);
        let title = self.title();
        match &mut self.state {
            State::Loading => chrome(
                title_header(&title, true),
                vec![style::dim("  Loading...")],
                String::new(),
                width,
                height,
            ),
            State::Preferences(form) => {
                let title = format!("{} Preferences", self.extension.manifest.title);
                render_form(form, &title, false, width, height)
            }
            State::Params(form) => render_form(form, &title, loading, width, height),
            State::List(view) => view.render(),
            State::Detail(view) => view.render(),
            State::Form { form, .. } => render_form(form, &title, loading, width, height),
        }
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut PageContext) {
        let loaded = matches!(
            self.state,
            State::List(_) | State::Detail(_) | State::Form { .. }
        );
        if loaded {
            if let Some(key_id) = event.key_id() {
                if lock_keybindings(&self.keybindings).matches(key_id, KeyAction::Reload) {
                    self.run(ctx);
                    return;
                }
            }
        }

        let step = match &mut self.state {
            State::Loading => match event.key_id() {
                Some(key_id)
                    if lock_keybindings(&self.keybindings).matches(key_id, KeyAction::Cancel) =>
                {
                    Step::Close
                }
                _ => Step::None,
            },
            State::Preferences(form) => match form.handle_event(event) {
                FormEvent::Submit(values) => Step::SavePreferences(values),
                FormEvent::Cancel => Step::Close,
                FormEvent::None => Step::None,
            },
            State::Params(form) => match form.handle_event(event) {
                FormEvent::Submit(values) => Step::Rerun(values),
                FormEvent::Cancel => Step::Close,
                FormEvent::None => Step::None,
            },
            State::List(view) => match view.handle_event(event) {
                ViewEvent::Action(action) => Step::Dispatch(action, Scope::default()),
                ViewEvent::QueryChanged(query) => Step::Query(query),
                ViewEvent::Cancel => Step::Close,
                ViewEvent::None => Step::None,
            },
            State::Detail(view) => match view.handle_event(event) {
                ViewEvent::Action(action) => Step::Dispatch(action, Scope::default()),
                ViewEvent::Cancel => Step::Close,
                ViewEvent::None | ViewEvent::QueryChanged(_) => Step::None,
            },
            State::Form { form, submit, .. } => match form.handle_event(event) {
                FormEvent::Submit(values) => match submit {
                    Some(action) => {
                        let action = submit_action(action, &values);
                        Step::Dispatch(action, Scope::with_inputs(values))
                    }
                    None => Step::Rerun(values),
                },
                FormEvent::Cancel => Step::Close,
                FormEvent::None => Step::None,
            },
        };
        self.apply(step, ctx);
    }

    fn on_message(&mut self, message: PageMessage, ctx: &mut PageContext) {
        match message {
            PageMessage::Job(JobOutcome::Command { query, result }) => {
                if query != self.query {
                    tracing::debug!(?query, current = ?self.query, "dropping stale command output");
                    return;
                }
                self.set_loading(false);
                match result {
                    Ok(output) => self.show_output(&output, ctx),
                    Err(ExtensionError::MissingParams { names }) => self.show_missing_params(&names),
                    Err(error) => ctx.fail(error.to_string()),
                }
            }
            PageMessage::Job(JobOutcome::Debounce { query }) => {
                if self.pending_query.as_ref() != Some(&query) {
                    return;
                }
                self.query = Some(query);
                self.run(ctx);
            }
            PageMessage::Job(other) => {
                tracing::debug!(outcome = ?other, "runner ignores outcome");
            }
            PageMessage::Reload { params } => {
                self.params.extend(params);
                self.start(ctx);
            }
            PageMessage::Dispatch { action, inputs } => {
                self.dispatch(&action, Scope::with_inputs(inputs), ctx);
            }
            PageMessage::ExtensionUpdated(extension) => {
                self.extension = extension;
                self.start(ctx);
            }
        }
    }
}
