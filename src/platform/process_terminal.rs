//! Terminal backed by the process's own stdin/stdout.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::core::terminal::Terminal;
use crate::platform::input_splitter::InputSplitter;

#[cfg(unix)]
use libc::{self, c_int};
#[cfg(unix)]
use signal_hook::iterator::Signals;

type InputHandler = Arc<Mutex<Option<Box<dyn FnMut(String) + Send>>>>;
type ResizeHandler = Arc<Mutex<Option<Box<dyn FnMut() + Send>>>>;

const ESCAPE_TIMEOUT_MS: i32 = 50;
const IDLE_POLL_MS: i32 = 100;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Thin wrapper over a terminal file descriptor.
#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
struct Fd(c_int);

#[cfg(unix)]
impl Fd {
    /// Writes all of `bytes`, waiting out `EAGAIN` and retrying `EINTR`.
    fn write_all(self, mut bytes: &[u8]) -> io::Result<()> {
        while !bytes.is_empty() {
            let count = unsafe { libc::write(self.0, bytes.as_ptr().cast(), bytes.len()) };
            match count {
                0 => return Err(io::Error::new(io::ErrorKind::WriteZero, "terminal closed")),
                n if n > 0 => bytes = &bytes[n as usize..],
                _ => {
                    let error = io::Error::last_os_error();
                    match error.kind() {
                        io::ErrorKind::Interrupted => {}
                        io::ErrorKind::WouldBlock => {
                            self.poll(libc::POLLOUT, -1);
                        }
                        _ => return Err(error),
                    }
                }
            }
        }
        Ok(())
    }

    fn read(self, buffer: &mut [u8]) -> Option<usize> {
        let count = unsafe { libc::read(self.0, buffer.as_mut_ptr().cast(), buffer.len()) };
        usize::try_from(count).ok().filter(|count| *count > 0)
    }

    /// Whether `events` became ready within `timeout_ms`.
    fn poll(self, events: libc::c_short, timeout_ms: i32) -> bool {
        let mut entry = libc::pollfd {
            fd: self.0,
            events,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&mut entry, 1, timeout_ms) };
        ready > 0 && entry.revents & events != 0
    }

    /// `(columns, rows)`, if the descriptor is a sized terminal.
    fn size(self) -> Option<(u16, u16)> {
        let mut size: libc::winsize = unsafe { std::mem::zeroed() };
        let result = unsafe { libc::ioctl(self.0, libc::TIOCGWINSZ, &mut size) };
        (result == 0 && size.ws_col > 0 && size.ws_row > 0).then_some((size.ws_col, size.ws_row))
    }

    fn termios(self) -> io::Result<libc::termios> {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(self.0, &mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }

    fn set_termios(self, termios: &libc::termios) -> io::Result<()> {
        if unsafe { libc::tcsetattr(self.0, libc::TCSANOW, termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn discard_input(self) {
        unsafe {
            libc::tcflush(self.0, libc::TCIFLUSH);
        }
    }
}

/// Optional copy of the output stream, disabled after the first failure.
#[cfg(unix)]
#[derive(Debug, Default)]
struct WriteLog {
    path: Option<PathBuf>,
}

#[cfg(unix)]
impl WriteLog {
    fn append(&mut self, data: &str) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(data.as_bytes()));
        if let Err(error) = result {
            tracing::warn!(path = %path.display(), %error, "disabling terminal write log");
            self.path = None;
        }
    }
}

/// Raw-mode terminal on stdin/stdout.
///
/// A reader thread splits stdin into key sequences for the input callback.
/// `SIGWINCH` reaches the resize callback through a second thread.
#[cfg(unix)]
pub struct ProcessTerminal {
    input: Fd,
    output: Fd,
    saved_mode: Option<libc::termios>,
    on_input: InputHandler,
    on_resize: ResizeHandler,
    reader: Option<JoinHandle<()>>,
    stopping: Arc<AtomicBool>,
    /// While set, the reader swallows input instead of delivering it.
    draining: Arc<AtomicBool>,
    last_input_ms: Arc<AtomicU64>,
    signals: Option<(signal_hook::iterator::Handle, JoinHandle<()>)>,
    write_log: WriteLog,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self {
            input: Fd(libc::STDIN_FILENO),
            output: Fd(libc::STDOUT_FILENO),
            saved_mode: None,
            on_input: Arc::default(),
            on_resize: Arc::default(),
            reader: None,
            stopping: Arc::new(AtomicBool::new(false)),
            draining: Arc::new(AtomicBool::new(false)),
            last_input_ms: Arc::new(AtomicU64::new(now_ms())),
            signals: None,
            write_log: WriteLog::default(),
        }
    }

    /// Appends every byte written to the terminal to `path`.
    #[must_use]
    pub fn with_write_log(mut self, path: Option<PathBuf>) -> Self {
        self.write_log.path = path;
        self
    }

    fn enter_raw_mode(&mut self) -> io::Result<()> {
        let saved = match self.saved_mode {
            Some(saved) => saved,
            None => *self.saved_mode.insert(self.input.termios()?),
        };
        let mut raw = saved;
        unsafe { libc::cfmakeraw(&mut raw) };
        self.input.set_termios(&raw)
    }

    fn leave_raw_mode(&self) -> io::Result<()> {
        match self.saved_mode.as_ref() {
            Some(saved) => self.input.set_termios(saved),
            None => Ok(()),
        }
    }

    fn spawn_reader(&mut self) -> io::Result<()> {
        let input = self.input;
        let on_input = Arc::clone(&self.on_input);
        let stopping = Arc::clone(&self.stopping);
        let draining = Arc::clone(&self.draining);
        let last_input_ms = Arc::clone(&self.last_input_ms);

        let reader = thread::Builder::new()
            .name("terminal-input".to_string())
            .spawn(move || {
                let mut buffer = [0u8; 4096];
                let mut splitter = InputSplitter::new();
                while !stopping.load(Ordering::SeqCst) {
                    let timeout = if splitter.has_pending() {
                        ESCAPE_TIMEOUT_MS
                    } else {
                        IDLE_POLL_MS
                    };
                    let sequences = if input.poll(libc::POLLIN, timeout) {
                        let Some(count) = input.read(&mut buffer) else {
                            continue;
                        };
                        last_input_ms.store(now_ms(), Ordering::SeqCst);
                        splitter.push(&buffer[..count])
                    } else {
                        splitter.flush().into_iter().collect()
                    };
                    if sequences.is_empty() || draining.load(Ordering::SeqCst) {
                        continue;
                    }
                    if let Some(handler) = lock(&on_input).as_mut() {
                        sequences.into_iter().for_each(|sequence| handler(sequence));
                    }
                }
            })?;
        self.reader = Some(reader);
        Ok(())
    }

    fn spawn_resize_watcher(&mut self) -> io::Result<()> {
        let mut signals = Signals::new([libc::SIGWINCH])?;
        let handle = signals.handle();
        let on_resize = Arc::clone(&self.on_resize);
        let watcher = thread::Builder::new()
            .name("terminal-resize".to_string())
            .spawn(move || {
                for _ in signals.forever() {
                    if let Some(handler) = lock(&on_resize).as_mut() {
                        handler();
                    }
                }
            })?;
        self.signals = Some((handle, watcher));
        Ok(())
    }

    fn join_threads(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        if let Some((handle, watcher)) = self.signals.take() {
            handle.close();
            let _ = watcher.join();
        }
    }

    fn clear_handlers(&self) {
        lock(&self.on_input).take();
        lock(&self.on_resize).take();
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()> {
        *lock(&self.on_input) = Some(on_input);
        *lock(&self.on_resize) = Some(on_resize);
        self.stopping.store(false, Ordering::SeqCst);
        self.draining.store(false, Ordering::SeqCst);
        self.last_input_ms.store(now_ms(), Ordering::SeqCst);

        let started = self
            .enter_raw_mode()
            .and_then(|()| self.spawn_resize_watcher())
            .and_then(|()| self.spawn_reader());
        if let Err(error) = started {
            self.join_threads();
            self.clear_handlers();
            let _ = self.leave_raw_mode();
            return Err(error);
        }
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.join_threads();
        self.clear_handlers();
        // Pending bytes would otherwise reach the shell after exit.
        self.input.discard_input();
        self.leave_raw_mode()
    }

    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        self.draining.store(true, Ordering::SeqCst);
        self.last_input_ms.store(now_ms(), Ordering::SeqCst);
        let deadline = now_ms().saturating_add(max_ms);
        loop {
            let now = now_ms();
            let idle_for = now.saturating_sub(self.last_input_ms.load(Ordering::SeqCst));
            if now >= deadline || idle_for >= idle_ms {
                break;
            }
            thread::sleep(Duration::from_millis(idle_ms.min(deadline - now).max(1)));
        }
        self.draining.store(false, Ordering::SeqCst);
    }

    fn write(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        if let Err(error) = self.output.write_all(data.as_bytes()) {
            tracing::warn!(%error, "terminal write failed");
        }
        self.write_log.append(data);
    }

    fn columns(&self) -> u16 {
        self.output.size().map_or(80, |(columns, _)| columns)
    }

    fn rows(&self) -> u16 {
        self.output.size().map_or(24, |(_, rows)| rows)
    }
}

#[cfg(not(unix))]
pub struct ProcessTerminal;

#[cfg(not(unix))]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self
    }

    pub fn with_write_log(self, _path: Option<PathBuf>) -> Self {
        self
    }
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn start(
        &mut self,
        _on_input: Box<dyn FnMut(String) + Send>,
        _on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "raw terminal mode is only supported on unix",
        ))
    }

    fn stop(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}

    fn write(&mut self, data: &str) {
        let _ = io::stdout().write_all(data.as_bytes());
    }

    fn columns(&self) -> u16 {
        80
    }

    fn rows(&self) -> u16 {
        24
    }
}
