//! Platform-independent shell loop.

use mackerelfs_core::{read_dir, FsRef, Path};

use crate::commands::{self, CommandResult};
use crate::context::{format_path, ShellContext};
use crate::host::{EditModePreference, TerminalHost};
use crate::io::{ExitReason, InputEvent, IoHost, Output, PromptConfig, ShellError};

pub struct ReplCore {
    ctx: ShellContext,
}

impl ReplCore {
    pub fn new(fs: FsRef) -> Self {
        Self {
            ctx: ShellContext::new(fs),
        }
    }

    /// Read, execute and print until `exit` or end of input.
    pub fn run(&mut self, io: &mut impl IoHost) -> Result<ExitReason, ShellError> {
        io.write_output(Output::notice(BANNER))?;

        loop {
            let line = match io.read_event(&self.prompt())? {
                InputEvent::Line(line) => line,
                InputEvent::Interrupt => {
                    io.write_output(Output::notice("^C (use 'exit' to quit)"))?;
                    continue;
                }
                InputEvent::Eof => {
                    io.flush()?;
                    return Ok(ExitReason::Eof);
                }
            };

            let result = self.execute(&line);
            if matches!(result, CommandResult::Exit) {
                io.flush()?;
                return Ok(ExitReason::UserExit);
            }
            write_result(io, result)?;
            io.flush()?;
        }
    }

    /// Execute a single line outside the loop.
    pub fn execute(&mut self, line: &str) -> CommandResult {
        commands::execute(line, &mut self.ctx)
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    fn prompt(&self) -> PromptConfig {
        // Organizations are the directories at the root.
        let org_count = read_dir(self.ctx.fs(), &Path::root())
            .map(|entries| entries.iter().filter(|e| e.is_dir()).count())
            .unwrap_or(0);
        PromptConfig {
            org_count,
            current_path: format_path(self.ctx.current_path()),
        }
    }
}

/// Show a command's result through `io`.
pub fn write_result(io: &mut impl IoHost, result: CommandResult) -> Result<(), ShellError> {
    match result {
        CommandResult::Ok(None) | CommandResult::Exit => Ok(()),
        CommandResult::Ok(Some(text)) => io.write_output(Output::normal(text)),
        CommandResult::Error(msg) => io.write_output(Output::error(msg)),
        CommandResult::Help => io.write_output(Output::normal(commands::format_help())),
    }
}

/// Run the interactive shell over `fs` in the terminal.
pub fn run(fs: FsRef, edit_mode: EditModePreference) -> Result<ExitReason, ShellError> {
    let mut host = TerminalHost::new(edit_mode)?;
    ReplCore::new(fs).run(&mut host)
}

const BANNER: &str = r#"
mackerelfs: Mackerel organizations as files

Type 'help' for available commands, 'exit' to quit.
Add an organization with: write /ctl new <apikey>
"#;
