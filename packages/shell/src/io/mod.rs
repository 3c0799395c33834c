//! I/O abstraction for the shell.
//!
//! The shell core talks to the user only through [`IoHost`], so the
//! terminal can be replaced by an in-memory host in tests.

pub mod types;

#[cfg(test)]
pub mod test_host;

pub use types::*;

#[cfg(test)]
pub use test_host::TestHost;

/// Failures of the shell's host environment.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line editor error: {0}")]
    Editor(String),
}

pub trait IoHost {
    /// Block until the user produces a line or a signal.
    fn read_event(&mut self, prompt: &PromptConfig) -> Result<InputEvent, ShellError>;

    fn write_output(&mut self, output: Output) -> Result<(), ShellError>;

    fn flush(&mut self) -> Result<(), ShellError> {
        Ok(())
    }
}
