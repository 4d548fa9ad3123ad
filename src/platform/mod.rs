//! Platform-specific terminal integrations.

pub mod input_splitter;
pub mod process_terminal;

pub use input_splitter::InputSplitter;
pub use process_terminal::ProcessTerminal;
