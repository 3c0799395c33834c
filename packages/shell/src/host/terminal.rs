//! Interactive host on top of reedline.

use std::io::{self, Write};

use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, DefaultHinter, FileBackedHistory, MenuBuilder, Reedline, ReedlineMenu, Signal,
};
use tracing::debug;

use super::prompt::ShellPrompt;
use super::{EditModePreference, COMPLETION_MENU};
use crate::completer::ShellCompleter;
use crate::io::{InputEvent, IoHost, Output, OutputStyle, PromptConfig, ShellError};

const HISTORY_SIZE: usize = 1000;

pub struct TerminalHost {
    editor: Reedline,
}

impl TerminalHost {
    pub fn new(edit_mode: EditModePreference) -> Result<Self, ShellError> {
        let menu = ColumnarMenu::default()
            .with_name(COMPLETION_MENU)
            .with_text_style(Style::new().fg(Color::Cyan))
            .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Cyan));

        let mut editor = Reedline::create()
            .with_completer(Box::new(ShellCompleter::new()))
            .with_hinter(Box::new(
                DefaultHinter::default().with_style(Style::new().dimmed()),
            ))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(edit_mode.build());

        // A shell without history still works, so failures only get logged.
        if let Some(path) = dirs::data_dir().map(|d| d.join("mackerelfs").join("history.txt")) {
            if let Some(dir) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    debug!(error = %e, "cannot create history directory");
                }
            }
            match FileBackedHistory::with_file(HISTORY_SIZE, path) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => debug!(error = %e, "history disabled"),
            }
        }

        Ok(Self { editor })
    }
}

impl IoHost for TerminalHost {
    fn read_event(&mut self, prompt: &PromptConfig) -> Result<InputEvent, ShellError> {
        let signal = self
            .editor
            .read_line(&ShellPrompt { config: prompt })
            .map_err(|e| ShellError::Editor(e.to_string()))?;
        Ok(match signal {
            Signal::Success(line) => InputEvent::Line(line),
            Signal::CtrlC => InputEvent::Interrupt,
            Signal::CtrlD => InputEvent::Eof,
        })
    }

    fn write_output(&mut self, output: Output) -> Result<(), ShellError> {
        let mut out = io::stdout().lock();
        match output.style {
            OutputStyle::Normal => writeln!(out, "{}", output.text)?,
            OutputStyle::Error => writeln!(out, "{} {}", Color::Red.paint("error:"), output.text)?,
            OutputStyle::Notice => writeln!(out, "{}", Style::new().dimmed().paint(&output.text))?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ShellError> {
        io::stdout().flush()?;
        Ok(())
    }
}
