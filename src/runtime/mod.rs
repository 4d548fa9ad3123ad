//! Single-threaded event loop plumbing.
//!
//! Terminal input, resize notifications and worker results all arrive on one
//! channel as [`RuntimeEvent`]s. The owner of the [`Runtime`] pulls one event
//! at a time, updates its state and hands the next frame to
//! [`Runtime::render`]. Nothing but the loop thread touches UI state.

pub mod renderer;

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::core::terminal::Terminal;
use renderer::Renderer;

const ENTER_SCREEN: &str = "\x1b[?1049h\x1b[?25l\x1b[?2004h";
const LEAVE_SCREEN: &str = "\x1b[?2004l\x1b[?25h\x1b[?1049l";
const DRAIN_MAX_MS: u64 = 1000;
const DRAIN_IDLE_MS: u64 = 50;

/// Event delivered to the loop.
#[derive(Debug)]
pub enum RuntimeEvent<M> {
    /// One raw input sequence, as split by the terminal reader.
    Input(String),
    Resize,
    Message(M),
}

/// Cloneable sender used by workers and timers.
pub struct RuntimeHandle<M> {
    sender: Sender<RuntimeEvent<M>>,
}

impl<M> Clone for RuntimeHandle<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M: Send + 'static> RuntimeHandle<M> {
    /// Queues `message`. Returns `false` once the loop is gone.
    pub fn send(&self, message: M) -> bool {
        self.sender.send(RuntimeEvent::Message(message)).is_ok()
    }

    /// Runs `job` on a named thread and delivers its result as a message.
    pub fn spawn_worker<F>(&self, name: &str, job: F) -> io::Result<()>
    where
        F: FnOnce() -> M + Send + 'static,
    {
        let sender = self.sender.clone();
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let message = job();
                if sender.send(RuntimeEvent::Message(message)).is_err() {
                    tracing::debug!("worker finished after the event loop stopped");
                }
            })
            .map(|_| ())
    }

    /// Delivers `message` after `delay` without blocking the loop.
    pub fn send_after(&self, name: &str, delay: Duration, message: M) -> io::Result<()> {
        self.spawn_worker(name, move || {
            thread::sleep(delay);
            message
        })
    }
}

/// Terminal plus event channel.
pub struct Runtime<T: Terminal, M> {
    terminal: T,
    sender: Sender<RuntimeEvent<M>>,
    receiver: Receiver<RuntimeEvent<M>>,
    renderer: Renderer,
    started: bool,
}

impl<T: Terminal, M: Send + 'static> Runtime<T, M> {
    pub fn new(terminal: T) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            terminal,
            sender,
            receiver,
            renderer: Renderer::new(),
            started: false,
        }
    }

    pub fn handle(&self) -> RuntimeHandle<M> {
        RuntimeHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Enters raw mode and the alternate screen.
    pub fn start(&mut self) -> io::Result<()> {
        if self.started {
            return Ok(());
        }
        let input_sender = self.sender.clone();
        let resize_sender = self.sender.clone();
        self.terminal.start(
            Box::new(move |data| {
                let _ = input_sender.send(RuntimeEvent::Input(data));
            }),
            Box::new(move || {
                let _ = resize_sender.send(RuntimeEvent::Resize);
            }),
        )?;
        self.terminal.write(ENTER_SCREEN);
        self.renderer.reset();
        self.started = true;
        tracing::debug!("terminal started");
        Ok(())
    }

    /// Leaves the alternate screen and restores the terminal.
    pub fn stop(&mut self) -> io::Result<()> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.terminal.write(LEAVE_SCREEN);
        self.terminal.drain_input(DRAIN_MAX_MS, DRAIN_IDLE_MS);
        self.terminal.stop()
    }

    /// Blocks until the next event.
    pub fn next_event(&mut self) -> Option<RuntimeEvent<M>> {
        self.receiver.recv().ok()
    }

    pub fn next_event_timeout(&mut self, timeout: Duration) -> Option<RuntimeEvent<M>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_next_event(&mut self) -> Option<RuntimeEvent<M>> {
        self.receiver.try_recv().ok()
    }

    /// Terminal size as `(columns, rows)`.
    pub fn size(&self) -> (usize, usize) {
        (
            usize::from(self.terminal.columns()),
            usize::from(self.terminal.rows()),
        )
    }

    /// Paints `lines`, writing only rows that changed since the last frame.
    pub fn render(&mut self, lines: &[String]) {
        let (width, height) = self.size();
        let output = self.renderer.render(lines, width, height);
        if !output.is_empty() {
            self.terminal.write(&output);
        }
    }

    /// Hands the terminal to `f` (typically a child process with inherited
    /// stdio) and takes it back afterwards. The next render repaints fully.
    pub fn suspend<R>(&mut self, f: impl FnOnce() -> R) -> io::Result<R> {
        let was_started = self.started;
        if was_started {
            self.stop()?;
        }
        let result = f();
        if was_started {
            self.start()?;
        }
        Ok(result)
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }
}
