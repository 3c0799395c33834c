//! Shell command parsing and execution.
//!
//! Commands:
//! - `ls [-l] [path]` - List a directory
//! - `cat <path>` - Print a file
//! - `stat <path>` - Show an entry's metadata
//! - `write <path> <text>` - Write one line to a file (usually a `ctl`)
//! - `cd [path]` - Change the current directory
//! - `pwd` - Print the current directory
//! - `help` - Show help
//! - `exit` - Leave the shell
//!
//! Organizations are added by writing to the root control file:
//! `write /ctl new <apikey>`.

use std::time::UNIX_EPOCH;

use nu_ansi_term::{Color, Style};

use mackerelfs_core::{read_dir, read_file, write_file, DirEntry, Path, Status};

use crate::context::{format_path, ShellContext};

/// Result of executing a command
pub enum CommandResult {
    /// Succeeded, with optional text to show.
    Ok(Option<String>),
    Error(String),
    Exit,
    Help,
}

impl CommandResult {
    fn ok_display(display: impl Into<String>) -> Self {
        CommandResult::Ok(Some(display.into()))
    }

    fn ok_none() -> Self {
        CommandResult::Ok(None)
    }
}

/// Parse and execute one input line.
pub fn execute(input: &str, ctx: &mut ShellContext) -> CommandResult {
    let input = input.trim();
    if input.is_empty() {
        return CommandResult::ok_none();
    }

    let mut parts = input.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match command.to_lowercase().as_str() {
        "help" | "?" => CommandResult::Help,
        "exit" | "quit" | "q" => CommandResult::Exit,
        "ls" => cmd_ls(args, ctx),
        "cat" => cmd_cat(args, ctx),
        "stat" => cmd_stat(args, ctx),
        "write" | "w" => cmd_write(args, ctx),
        "cd" => cmd_cd(args, ctx),
        "pwd" => CommandResult::ok_display(format_path(ctx.current_path())),
        _ => CommandResult::Error(format!(
            "Unknown command: '{}'. Type 'help' for available commands.",
            command
        )),
    }
}

/// Format help text
pub fn format_help() -> String {
    let cmd_style = Style::new().bold().fg(Color::Cyan);
    let arg_style = Style::new().fg(Color::Yellow);

    let commands = [
        ("ls", "[-l] [path]", "List a directory (-l: with mode and size)"),
        ("cat", "<path>", "Print a file"),
        ("stat", "<path>", "Show name, type, mode, size and mtime"),
        ("write", "<path> <text>", "Write one line to a file (alias: w)"),
        ("cd", "[path]", "Change directory (default: /)"),
        ("pwd", "", "Print the current directory"),
        ("help", "", "Show this help (alias: ?)"),
        ("exit", "", "Leave the shell (alias: quit, q)"),
    ];

    let mut help = format!("{}\n\n", Style::new().bold().paint("mackerelfs commands"));
    for (cmd, args, desc) in commands {
        help.push_str(&format!(
            "  {} {:<16} {}\n",
            cmd_style.paint(format!("{cmd:<6}")),
            arg_style.paint(args),
            desc
        ));
    }
    help.push_str("\nControl files:\n");
    help.push_str("  write /ctl new <apikey>          add the organization of a key\n");
    help.push_str("  write /ctl delete <org>          remove an organization\n");
    help.push_str("  write /<org>/hosts/ctl reload    refetch the host list\n");
    help
}

fn resolve(args: &str, ctx: &ShellContext) -> Result<Path, CommandResult> {
    ctx.resolve_path(args)
        .map_err(|e| CommandResult::Error(format!("Invalid path: {e}")))
}

fn cmd_ls(args: &str, ctx: &mut ShellContext) -> CommandResult {
    let (long, target) = match args.strip_prefix("-l") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
            (true, rest.trim())
        }
        _ => (false, args),
    };
    let path = match resolve(target, ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };

    let entries = match read_dir(ctx.fs(), &path) {
        Ok(entries) => entries,
        Err(e) => return CommandResult::Error(e.to_string()),
    };
    if entries.is_empty() {
        return CommandResult::ok_none();
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            if long {
                format_long(entry)
            } else {
                format_name(entry)
            }
        })
        .collect();
    CommandResult::ok_display(lines.join("\n"))
}

fn format_name(entry: &DirEntry) -> String {
    if entry.is_dir() {
        format!("{}/", Color::Blue.bold().paint(entry.name()))
    } else {
        entry.name().to_string()
    }
}

fn format_long(entry: &DirEntry) -> String {
    match entry.info() {
        Ok(status) => format!(
            "{} {:>8} {}",
            status.mode_string(),
            status.size,
            format_name(entry)
        ),
        Err(e) => format!("{:<10} {:>8} {} ({e})", "?", "?", format_name(entry)),
    }
}

fn cmd_cat(args: &str, ctx: &mut ShellContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: cat <path>".to_string());
    }
    let path = match resolve(args, ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };
    match read_file(ctx.fs(), &path) {
        Ok(data) => {
            let text = String::from_utf8_lossy(&data);
            let text = text.strip_suffix('\n').unwrap_or(&text);
            if text.is_empty() {
                CommandResult::ok_none()
            } else {
                CommandResult::ok_display(text)
            }
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

fn cmd_stat(args: &str, ctx: &mut ShellContext) -> CommandResult {
    let path = match resolve(args, ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };
    match ctx.fs().stat(&path) {
        Ok(status) => CommandResult::ok_display(format_status(&status)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

fn format_status(status: &Status) -> String {
    let kind = if status.is_dir() { "directory" } else { "file" };
    let modified = status
        .modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(
        "name:     {}\ntype:     {kind}\nmode:     {}\nsize:     {}\nmodified: {modified}",
        status.name,
        status.mode_string(),
        status.size
    )
}

fn cmd_write(args: &str, ctx: &mut ShellContext) -> CommandResult {
    let Some((target, text)) = parse_write_args(args) else {
        return CommandResult::Error("Usage: write <path> <text>".to_string());
    };
    let path = match resolve(&target, ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let line = format!("{text}\n");
    match write_file(ctx.fs(), &path, line.as_bytes()) {
        Ok(()) => CommandResult::ok_none(),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Split `write` arguments into the path and the rest of the line.
fn parse_write_args(args: &str) -> Option<(String, String)> {
    let mut parts = args.splitn(2, char::is_whitespace);
    let path = parts.next().filter(|p| !p.is_empty())?;
    let text = parts.next().unwrap_or("").trim();
    if text.is_empty() {
        return None;
    }
    Some((path.to_string(), text.to_string()))
}

fn cmd_cd(args: &str, ctx: &mut ShellContext) -> CommandResult {
    let target = if args.is_empty() { "/" } else { args };
    let path = match resolve(target, ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };
    match ctx.fs().stat(&path) {
        Ok(status) if status.is_dir() => {
            ctx.set_current_path(path);
            CommandResult::ok_none()
        }
        Ok(_) => CommandResult::Error(format!("{}: not a directory", format_path(&path))),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}
