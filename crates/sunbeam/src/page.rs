//! Page trait and the effects pages hand back to the paginator.
//!
//! Pages never block and never touch the terminal. Anything slow or external
//! (running an extension command, the clipboard, a child process that takes
//! over the TTY) is described as an [`Effect`] and carried out by the
//! paginator through [`HostOps`]. Results come back as [`PageMessage`]s
//! addressed by [`PageId`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use extension_client::{Extension, ExtensionError};
use sunbeam_protocol::{Action, App, ParamValue};
use sunbeam_tui::InputEvent;

/// Identity of one frame on the page stack. Never reused.
pub type PageId = u64;

/// Screen pushed on the page stack.
pub trait Page {
    fn title(&self) -> String;

    /// Called once, after the first [`Page::set_size`].
    fn init(&mut self, _ctx: &mut PageContext) {}

    fn set_size(&mut self, width: usize, height: usize);

    /// Exactly `height` lines, as set by the last [`Page::set_size`].
    fn render(&mut self) -> Vec<String>;

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut PageContext);

    fn on_message(&mut self, _message: PageMessage, _ctx: &mut PageContext) {}
}

/// Collects the effects of one page callback.
pub struct PageContext {
    id: PageId,
    effects: Vec<Effect>,
}

impl PageContext {
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            effects: Vec::new(),
        }
    }

    /// Id of the page being called.
    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn push(&mut self, page: impl Page + 'static) {
        self.emit(Effect::Push(Box::new(page)));
    }

    /// Pops the calling page.
    pub fn close(&mut self) {
        self.emit(Effect::Close(self.id));
    }

    /// Replaces the calling page with an error page.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.emit(Effect::Fail {
            target: self.id,
            message: message.into(),
        });
    }

    pub fn exit(&mut self) {
        self.emit(Effect::Exit);
    }

    /// Runs `job` off the loop. The outcome is addressed to the calling page.
    pub fn spawn(&mut self, job: Job) {
        self.emit(Effect::Spawn {
            target: self.id,
            job,
        });
    }

    pub fn hand_off(&mut self, request: HandOff, followup: Followup) {
        self.emit(Effect::HandOff {
            target: self.id,
            request,
            followup,
        });
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

/// Request from a page to the paginator.
pub enum Effect {
    Push(Box<dyn Page>),
    Close(PageId),
    /// Replace the frame with an error page, keeping the stack depth.
    Fail { target: PageId, message: String },
    Exit,
    Spawn { target: PageId, job: Job },
    HandOff {
        target: PageId,
        request: HandOff,
        followup: Followup,
    },
    /// Run an extension command, pushing a runner when it has a page.
    Run(RunRequest),
    Deliver { target: PageId, message: PageMessage },
    /// Apply `followup` to the target as if its job had succeeded.
    Finish { target: PageId, followup: Followup },
    /// Open the preferences form of an extension.
    Configure { target: PageId, alias: String },
    SavePreferences {
        target: PageId,
        alias: String,
        values: BTreeMap<String, ParamValue>,
    },
    RecordHistory(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Page that dispatched the action; receives errors and reloads.
    pub owner: PageId,
    pub extension: String,
    pub command: String,
    pub params: BTreeMap<String, ParamValue>,
    /// Always push a runner, even for silent and tty commands.
    pub push: bool,
    pub followup: Followup,
}

/// What happens once a job or hand-off succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Followup {
    pub exit: bool,
    pub reload: bool,
    /// Pop the addressed page.
    pub close: bool,
    pub notice: Option<String>,
}

impl Followup {
    pub fn exit_or_reload(exit: bool, reload: bool) -> Self {
        Self {
            exit,
            reload,
            ..Self::default()
        }
    }
}

/// Blocking work executed on a worker thread.
pub enum Job {
    RunCommand {
        extension: Arc<Extension>,
        command: String,
        params: BTreeMap<String, ParamValue>,
        query: Option<String>,
    },
    /// Runs a silent command and decodes the action it prints, if any.
    Silent {
        extension: Arc<Extension>,
        command: String,
        params: BTreeMap<String, ParamValue>,
        followup: Followup,
    },
    Copy { text: String, followup: Followup },
    Open {
        target: String,
        app: Option<App>,
        followup: Followup,
    },
    /// Echoes `query` back after `delay`.
    Debounce { query: String, delay: Duration },
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunCommand { .. } => "run-command",
            Self::Silent { .. } => "silent",
            Self::Copy { .. } => "copy",
            Self::Open { .. } => "open",
            Self::Debounce { .. } => "debounce",
        }
    }

    pub fn followup(&self) -> Followup {
        match self {
            Self::Silent { followup, .. }
            | Self::Copy { followup, .. }
            | Self::Open { followup, .. } => followup.clone(),
            Self::RunCommand { .. } | Self::Debounce { .. } => Followup::default(),
        }
    }
}

/// Child process that needs the terminal. The loop suspends the UI for it.
#[derive(Debug, Clone)]
pub enum HandOff {
    Extension {
        extension: Arc<Extension>,
        command: String,
        params: BTreeMap<String, ParamValue>,
    },
    Shell { command: String, dir: Option<String> },
    Editor { path: String },
}

#[derive(Debug)]
pub enum JobOutcome {
    Command {
        query: Option<String>,
        result: Result<Vec<u8>, ExtensionError>,
    },
    Debounce { query: String },
    Silent {
        result: Result<Option<Action>, String>,
        followup: Followup,
    },
    Done {
        result: Result<(), String>,
        followup: Followup,
    },
}

/// Message delivered on the runtime channel.
#[derive(Debug)]
pub struct AppMessage {
    pub target: PageId,
    pub outcome: JobOutcome,
}

#[derive(Debug)]
pub enum PageMessage {
    Job(JobOutcome),
    /// Re-run the page's command with `params` merged in.
    Reload { params: BTreeMap<String, ParamValue> },
    /// Dispatch `action` with `inputs` bound to `${input:...}`.
    Dispatch {
        action: Action,
        inputs: BTreeMap<String, ParamValue>,
    },
    ExtensionUpdated(Arc<Extension>),
}

/// Side effects the paginator cannot perform on its own.
pub trait HostOps {
    fn spawn(&mut self, target: PageId, job: Job);
    fn hand_off(&mut self, target: PageId, request: HandOff, followup: Followup);
}
