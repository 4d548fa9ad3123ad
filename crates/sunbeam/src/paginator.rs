//! Page stack and effect interpreter.
//!
//! The paginator owns every page plus the launcher state pages may touch
//! through effects (extensions, preferences, history). Input goes to the top
//! page only; worker results are routed by [`PageId`] and dropped when their
//! page is gone.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use extension_client::Extension;
use sunbeam_protocol::{Mode, ParamValue};
use sunbeam_store::{History, PreferenceStore};
use sunbeam_tui::core::style;
use sunbeam_tui::{lock_keybindings, pad_to_width, InputEvent, KeyAction, KeybindingsHandle};

use crate::page::{
    AppMessage, Effect, Followup, HandOff, HostOps, Job, JobOutcome, Page, PageContext, PageId,
    PageMessage, RunRequest,
};
use crate::pages::{merged_preferences, ErrorPage, PreferencesPage};
use crate::runner::Runner;

/// Extensions by alias.
#[derive(Default, Clone)]
pub struct Registry {
    extensions: BTreeMap<String, Arc<Extension>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, extension: Extension) -> Arc<Extension> {
        let extension = Arc::new(extension);
        self.extensions
            .insert(extension.alias.clone(), Arc::clone(&extension));
        extension
    }

    pub fn get(&self, alias: &str) -> Option<&Arc<Extension>> {
        self.extensions.get(alias)
    }

    pub fn extensions(&self) -> &BTreeMap<String, Arc<Extension>> {
        &self.extensions
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

struct Frame {
    id: PageId,
    page: Box<dyn Page>,
}

pub struct Paginator {
    frames: Vec<Frame>,
    next_id: PageId,
    width: usize,
    height: usize,
    registry: Registry,
    preferences: Option<PreferenceStore>,
    history: Option<History>,
    keybindings: KeybindingsHandle,
    notice: Option<String>,
    should_exit: bool,
}

impl Paginator {
    pub fn new(registry: Registry, keybindings: KeybindingsHandle) -> Self {
        Self {
            frames: Vec::new(),
            next_id: 1,
            width: 80,
            height: 24,
            registry,
            preferences: None,
            history: None,
            keybindings,
            notice: None,
            should_exit: false,
        }
    }

    #[must_use]
    pub fn with_preferences(mut self, store: PreferenceStore) -> Self {
        self.preferences = Some(store);
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: History) -> Self {
        self.history = Some(history);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn keybindings(&self) -> &KeybindingsHandle {
        &self.keybindings
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn top_id(&self) -> Option<PageId> {
        self.frames.last().map(|frame| frame.id)
    }

    pub fn top_title(&self) -> Option<String> {
        self.frames.last().map(|frame| frame.page.title())
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    /// Sizes the page, puts it on top and runs its `init`.
    pub fn push(&mut self, mut page: Box<dyn Page>, host: &mut dyn HostOps) -> PageId {
        let id = self.next_id;
        self.next_id += 1;
        page.set_size(self.width, self.height);
        self.frames.push(Frame { id, page });
        tracing::debug!(id, depth = self.frames.len(), "page pushed");

        let mut ctx = PageContext::new(id);
        if let Some(frame) = self.frames.last_mut() {
            frame.page.init(&mut ctx);
        }
        self.apply(ctx.into_effects(), host);
        id
    }

    /// Drops the top page. The stack running empty ends the session.
    pub fn pop(&mut self) {
        if let Some(id) = self.top_id() {
            self.close(id);
        }
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        for frame in &mut self.frames {
            frame.page.set_size(width, height);
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent, host: &mut dyn HostOps) {
        if let InputEvent::Resize { columns, rows } = event {
            self.set_size(usize::from(*columns), usize::from(*rows));
            return;
        }
        if let Some(key_id) = event.key_id() {
            if lock_keybindings(&self.keybindings).matches(key_id, KeyAction::Quit) {
                self.should_exit = true;
                return;
            }
        }
        self.notice = None;

        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        let mut ctx = PageContext::new(frame.id);
        frame.page.handle_event(event, &mut ctx);
        self.apply(ctx.into_effects(), host);
    }

    pub fn handle_message(&mut self, message: AppMessage, host: &mut dyn HostOps) {
        let AppMessage { target, outcome } = message;
        match outcome {
            JobOutcome::Done { result, followup } => self.finish(target, result, followup, host),
            JobOutcome::Silent { result, followup } => match result {
                Ok(action) => {
                    if let Some(action) = action {
                        self.deliver(
                            target,
                            PageMessage::Dispatch {
                                action,
                                inputs: BTreeMap::new(),
                            },
                            host,
                        );
                    }
                    self.finish(target, Ok(()), followup, host);
                }
                Err(message) => self.fail(target, message),
            },
            outcome => self.deliver(target, PageMessage::Job(outcome), host),
        }
    }

    /// Completion of a terminal hand-off.
    pub fn hand_off_finished(
        &mut self,
        target: PageId,
        result: Result<(), String>,
        followup: Followup,
        host: &mut dyn HostOps,
    ) {
        self.finish(target, result, followup, host);
    }

    /// Top page plus the transient notice on the last row.
    pub fn render(&mut self) -> Vec<String> {
        let (width, height) = (self.width, self.height);
        let Some(frame) = self.frames.last_mut() else {
            return Vec::new();
        };
        let mut lines = frame.page.render();
        if let (Some(notice), Some(last)) = (self.notice.as_ref(), lines.last_mut()) {
            *last = pad_to_width(&style::green(&format!(" {notice}")), width);
        }
        lines.truncate(height);
        lines
    }

    fn apply(&mut self, effects: Vec<Effect>, host: &mut dyn HostOps) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            if self.should_exit {
                return;
            }
            match effect {
                Effect::Push(page) => {
                    self.push(page, host);
                }
                Effect::Close(id) => self.close(id),
                Effect::Fail { target, message } => self.fail(target, message),
                Effect::Exit => self.should_exit = true,
                Effect::Spawn { target, job } => {
                    tracing::debug!(target, job = job.name(), "spawning job");
                    host.spawn(target, job);
                }
                Effect::HandOff {
                    target,
                    request,
                    followup,
                } => host.hand_off(target, request, followup),
                Effect::Run(request) => self.run(request, host),
                Effect::Deliver { target, message } => self.deliver(target, message, host),
                Effect::Finish { target, followup } => {
                    self.finish(target, Ok(()), followup, host);
                }
                Effect::Configure { target, alias } => self.configure(target, &alias, host),
                Effect::SavePreferences {
                    target,
                    alias,
                    values,
                } => self.save_preferences(target, &alias, values, host),
                Effect::RecordHistory(id) => self.record_history(id),
            }
        }
    }

    fn deliver(&mut self, target: PageId, message: PageMessage, host: &mut dyn HostOps) {
        let Some(frame) = self.frames.iter_mut().find(|frame| frame.id == target) else {
            tracing::debug!(target, "dropping message for a closed page");
            return;
        };
        let mut ctx = PageContext::new(target);
        frame.page.on_message(message, &mut ctx);
        self.apply(ctx.into_effects(), host);
    }

    fn close(&mut self, id: PageId) {
        let Some(index) = self.frames.iter().position(|frame| frame.id == id) else {
            return;
        };
        self.frames.remove(index);
        tracing::debug!(id, depth = self.frames.len(), "page closed");
        if self.frames.is_empty() {
            self.should_exit = true;
        }
    }

    /// Replaces the target frame, or the top one when it is gone, with an
    /// error page.
    fn fail(&mut self, target: PageId, message: String) {
        tracing::warn!(target, %message, "page failed");
        let index = self
            .frames
            .iter()
            .position(|frame| frame.id == target)
            .or_else(|| self.frames.len().checked_sub(1));
        let mut page = Box::new(ErrorPage::new(message, self.keybindings.clone()));
        page.set_size(self.width, self.height);
        let id = self.next_id;
        self.next_id += 1;
        match index {
            Some(index) => self.frames[index] = Frame { id, page },
            None => self.frames.push(Frame { id, page }),
        }
    }

    fn finish(
        &mut self,
        target: PageId,
        result: Result<(), String>,
        followup: Followup,
        host: &mut dyn HostOps,
    ) {
        if let Err(message) = result {
            self.fail(target, message);
            return;
        }
        if followup.exit {
            self.should_exit = true;
            return;
        }
        if followup.close {
            self.close(target);
        }
        if followup.reload {
            self.deliver(
                target,
                PageMessage::Reload {
                    params: BTreeMap::new(),
                },
                host,
            );
        }
        if let Some(notice) = followup.notice {
            self.notice = Some(notice);
        }
    }

    fn run(&mut self, request: RunRequest, host: &mut dyn HostOps) {
        let Some(extension) = self.registry.get(&request.extension).cloned() else {
            self.fail(
                request.owner,
                format!("no extension named `{}`", request.extension),
            );
            return;
        };
        let spec = match extension.command(&request.command) {
            Ok(spec) => spec.clone(),
            Err(error) => {
                self.fail(request.owner, error.to_string());
                return;
            }
        };
        let missing_params = spec
            .params
            .iter()
            .any(|param| param.required && !request.params.contains_key(&param.name));
        let needs_page = request.push
            || spec.mode.is_page()
            || missing_params
            || !extension.missing_preferences().is_empty();

        if needs_page {
            match Runner::new(
                extension,
                &request.command,
                request.params,
                self.keybindings.clone(),
            ) {
                Ok(runner) => {
                    let runner = runner.with_owner(request.owner, request.followup);
                    self.push(Box::new(runner), host);
                }
                Err(error) => self.fail(request.owner, error.to_string()),
            }
            return;
        }

        match spec.mode {
            Mode::Tty => host.hand_off(
                request.owner,
                HandOff::Extension {
                    extension,
                    command: request.command,
                    params: request.params,
                },
                request.followup,
            ),
            _ => host.spawn(
                request.owner,
                Job::Silent {
                    extension,
                    command: request.command,
                    params: request.params,
                    followup: request.followup,
                },
            ),
        }
    }

    fn configure(&mut self, target: PageId, alias: &str, host: &mut dyn HostOps) {
        let Some(extension) = self.registry.get(alias).cloned() else {
            self.fail(target, format!("no extension named `{alias}`"));
            return;
        };
        let page = PreferencesPage::new(target, &extension, self.keybindings.clone());
        self.push(Box::new(page), host);
    }

    fn save_preferences(
        &mut self,
        target: PageId,
        alias: &str,
        values: BTreeMap<String, ParamValue>,
        host: &mut dyn HostOps,
    ) {
        let Some(current) = self.registry.get(alias).cloned() else {
            self.fail(target, format!("no extension named `{alias}`"));
            return;
        };
        let updated = merged_preferences(&current, values);
        if let Some(store) = self.preferences.as_mut() {
            store.set(
                alias,
                updated.origin.to_string(),
                updated.preferences.clone(),
            );
            if let Err(error) = store.save() {
                self.fail(target, error.to_string());
                return;
            }
        }
        let updated = self.registry.insert(updated);
        tracing::info!(alias, "preferences saved");
        self.deliver(target, PageMessage::ExtensionUpdated(updated), host);
    }

    fn record_history(&mut self, id: String) {
        let Some(history) = self.history.as_mut() else {
            return;
        };
        history.record(id);
        if let Err(error) = history.save() {
            tracing::warn!(%error, "failed to save history");
        }
    }
}
