use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use mackerelfs_client::{ClientConfig, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL};
use mackerelfs_core::FsRef;
use mackerelfs_namespace::{HttpConnector, Namespace};
use mackerelfs_shell::commands::CommandResult;
use mackerelfs_shell::io::{InputEvent, IoHost, Output, OutputStyle, PromptConfig, ShellError};
use mackerelfs_shell::{repl, trc, EditModePreference, ReplCore};

/// mackerelfs - Mackerel organizations, hosts and metrics as files
#[derive(Parser, Debug)]
#[command(name = "mackerelfs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API key of an organization to open at startup
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Mackerel API endpoint
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Force vi editing mode
    #[arg(long, conflicts_with = "emacs")]
    vi: bool,

    /// Force emacs editing mode
    #[arg(long)]
    emacs: bool,

    /// Run one command and exit
    #[arg(short = 'c', long)]
    command: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = trc::init() {
        eprintln!("Warning: logging disabled: {e}");
    }

    let config = match ClientConfig::new("").with_base_url(&args.base_url) {
        Ok(config) => config.with_timeout(Duration::from_secs(args.timeout_secs)),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let namespace = Namespace::new(HttpConnector::new(config));
    if let Some(key) = &args.api_key {
        match namespace.add_org(key) {
            Ok(name) => info!(org = %name, "organization opened"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    let fs: FsRef = Arc::new(namespace);

    if let Some(command) = args.command {
        return run_once(fs, &command);
    }

    let edit_mode = if args.vi {
        EditModePreference::Vi
    } else if args.emacs {
        EditModePreference::Emacs
    } else {
        EditModePreference::Detect
    };
    match repl::run(fs, edit_mode) {
        Ok(reason) => {
            info!(?reason, "shell exited");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_once(fs: FsRef, command: &str) -> ExitCode {
    let mut core = ReplCore::new(fs);
    let result = core.execute(command);
    let failed = matches!(result, CommandResult::Error(_));
    if let Err(e) = repl::write_result(&mut Stdio, result) {
        warn!(error = %e, "writing output failed");
        return ExitCode::FAILURE;
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Plain stdout/stderr output for `-c`.
struct Stdio;

impl IoHost for Stdio {
    fn read_event(&mut self, _prompt: &PromptConfig) -> Result<InputEvent, ShellError> {
        Ok(InputEvent::Eof)
    }

    fn write_output(&mut self, output: Output) -> Result<(), ShellError> {
        match output.style {
            OutputStyle::Error => eprintln!("error: {}", output.text),
            _ => println!("{}", output.text),
        }
        Ok(())
    }
}
