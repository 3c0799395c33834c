//! Values exchanged between the shell core and its host.

/// What the host got from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl+C: drop the current line and keep going.
    Interrupt,
    /// Ctrl+D, or the end of scripted input.
    Eof,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    #[default]
    Normal,
    Error,
    /// Banners and hints, rendered dimmed.
    Notice,
}

/// Text for the host to show, already formatted apart from its style.
#[derive(Debug, Clone)]
pub struct Output {
    pub style: OutputStyle,
    pub text: String,
}

impl Output {
    pub fn new(style: OutputStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(OutputStyle::Normal, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(OutputStyle::Error, text)
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(OutputStyle::Notice, text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptConfig {
    /// Organizations currently present at the root.
    pub org_count: usize,
    /// Current directory, with a leading `/`.
    pub current_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    UserExit,
    Eof,
}
