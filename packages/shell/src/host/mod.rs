//! Host implementations for the shell.

mod edit_mode;
mod prompt;
pub mod terminal;

pub use edit_mode::EditModePreference;
pub use terminal::TerminalHost;

const COMPLETION_MENU: &str = "completion_menu";
