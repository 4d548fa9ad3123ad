#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use sunbeam_tui::Terminal;

type InputHandler = Box<dyn FnMut(String) + Send>;
type ResizeHandler = Box<dyn FnMut() + Send>;

/// Everything the runtime did to the fake terminal.
#[derive(Default)]
pub struct Screen {
    pub output: String,
    pub size: (u16, u16),
    pub sessions: usize,
    pub stops: usize,
    pub drains: Vec<(u64, u64)>,
    input: Option<InputHandler>,
    resize: Option<ResizeHandler>,
}

pub type SharedScreen = Arc<Mutex<Screen>>;

/// In-memory terminal that records writes into a shared [`Screen`].
pub struct FakeTerminal {
    screen: SharedScreen,
}

impl FakeTerminal {
    pub fn new(columns: u16, rows: u16) -> (Self, SharedScreen) {
        let screen = Arc::new(Mutex::new(Screen {
            size: (columns, rows),
            ..Screen::default()
        }));
        (
            Self {
                screen: Arc::clone(&screen),
            },
            screen,
        )
    }
}

impl Terminal for FakeTerminal {
    fn start(&mut self, on_input: InputHandler, on_resize: ResizeHandler) -> std::io::Result<()> {
        let mut screen = lock(&self.screen);
        screen.sessions += 1;
        screen.input = Some(on_input);
        screen.resize = Some(on_resize);
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        let mut screen = lock(&self.screen);
        screen.stops += 1;
        screen.input = None;
        screen.resize = None;
        Ok(())
    }

    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        lock(&self.screen).drains.push((max_ms, idle_ms));
    }

    fn write(&mut self, data: &str) {
        lock(&self.screen).output.push_str(data);
    }

    fn columns(&self) -> u16 {
        lock(&self.screen).size.0
    }

    fn rows(&self) -> u16 {
        lock(&self.screen).size.1
    }
}

/// Feeds raw bytes as if typed.
pub fn type_raw(screen: &SharedScreen, data: &str) {
    let mut screen = lock(screen);
    let Some(input) = screen.input.as_mut() else {
        panic!("terminal is not started");
    };
    input(data.to_string());
}

/// Changes the size and fires the resize notification.
pub fn resize(screen: &SharedScreen, columns: u16, rows: u16) {
    let mut screen = lock(screen);
    screen.size = (columns, rows);
    let Some(resize) = screen.resize.as_mut() else {
        panic!("terminal is not started");
    };
    resize();
}

/// Output written so far, cleared.
pub fn take_output(screen: &SharedScreen) -> String {
    std::mem::take(&mut lock(screen).output)
}

pub fn lock(screen: &SharedScreen) -> MutexGuard<'_, Screen> {
    match screen.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
