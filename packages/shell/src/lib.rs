//! # mackerelfs-shell
//!
//! An interactive shell over the mackerelfs tree.
//!
//! ```bash
//! MACKEREL_APIKEY=... mackerelfs
//!
//! # Inside the shell:
//! % ls
//! % cd acme/hosts
//! % cat web-1/info
//! % write ctl reload
//! % cat web-1/metrics/loadavg5/1hour
//! ```

pub mod commands;
pub mod completer;
pub mod context;
pub mod host;
pub mod io;
pub mod repl;
pub mod trc;

pub use context::ShellContext;
pub use host::EditModePreference;
pub use io::ShellError;
pub use repl::{run, ReplCore};
