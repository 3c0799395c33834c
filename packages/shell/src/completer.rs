use reedline::{Completer, Span, Suggestion};

const COMMANDS: [&str; 10] = [
    "cat", "cd", "exit", "help", "ls", "pwd", "quit", "stat", "w", "write",
];

/// Completes command names at the start of the line.
#[derive(Default)]
pub struct ShellCompleter;

impl ShellCompleter {
    pub fn new() -> Self {
        Self
    }
}

impl Completer for ShellCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line_to_pos = &line[..pos];
        let words: Vec<&str> = line_to_pos.split_whitespace().collect();

        if !(words.is_empty() || (words.len() == 1 && !line_to_pos.ends_with(' '))) {
            return Vec::new();
        }

        let prefix = words.first().copied().unwrap_or("");
        let start = line_to_pos.rfind(prefix).unwrap_or(0);
        COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Suggestion {
                value: cmd.to_string(),
                description: Some(command_description(cmd).to_string()),
                style: None,
                extra: None,
                span: Span::new(start, pos),
                append_whitespace: true,
                match_indices: None,
            })
            .collect()
    }
}

fn command_description(cmd: &str) -> &'static str {
    match cmd {
        "cat" => "Print a file",
        "cd" => "Change directory",
        "exit" | "quit" => "Leave the shell",
        "help" => "Show help",
        "ls" => "List a directory",
        "pwd" => "Print working directory",
        "stat" => "Show entry metadata",
        "write" | "w" => "Write a line to a file",
        _ => "",
    }
}
