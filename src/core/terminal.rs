//! Terminal abstraction used by the runtime.

/// Minimal terminal interface.
pub trait Terminal {
    /// Enter raw mode and start delivering input and resize notifications.
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()>;

    /// Stop input delivery and restore the terminal state.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Discard pending input, waiting at most `max_ms` and returning early
    /// after `idle_ms` without data.
    fn drain_input(&mut self, max_ms: u64, idle_ms: u64);

    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
}
