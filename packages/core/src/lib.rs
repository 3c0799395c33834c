//! Composable virtual filesystems.
//!
//! A namespace is built out of a few parts:
//! - [`MuxFs`]: a directory of leaf files, fixed sub-filesystems and one
//!   [`DynamicProvider`] of variable children
//! - [`ReaderFile`] and [`ControlFile`]: leaves that produce data on open or
//!   run a command per written line
//! - [`CachedProvider`] and [`TableProvider`]: providers with lazily fetched
//!   or explicitly edited snapshots
//! - [`MountTable`]: filesystems grafted at arbitrary paths, deepest first
//!
//! Everything implements [`Filesystem`], so parts nest freely. Errors carry
//! the path the caller asked for, never a path internal to a sub-filesystem.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use mackerelfs_core::{path, read_file, write_file, ControlFile, MuxFs, ReaderFile};
//!
//! let host = MuxFs::new()
//!     .file("info", ReaderFile::new(|| Ok("{\"name\":\"web-1\"}".into())))
//!     .file("ctl", ControlFile::new(|_line| Ok(())));
//! let root = MuxFs::new().fs("web-1", Arc::new(host));
//!
//! assert_eq!(read_file(&root, &path!("web-1/info")).unwrap(), b"{\"name\":\"web-1\"}");
//! write_file(&root, &path!("web-1/ctl"), b"reload\n").unwrap();
//! ```

mod ctl;
mod dir;
mod error;
mod file;
mod leaf;
mod memory;
mod mount;
mod node;
mod ops;
mod path;
mod path_trie;
mod provider;

pub use ctl::ControlFile;
pub use dir::DirHandle;
pub use error::{BoxError, Error, ErrorKind, Result};
pub use file::{
    DirEntry, File, FileType, Filesystem, FsRef, Handle, LazyStatus, OpenFlags, Status,
};
pub use leaf::{LeafFile, ReaderFile};
pub use memory::MemFs;
pub use mount::MountTable;
pub use node::{MuxFs, DIR_PERM};
pub use ops::{read_dir, read_file, write_file};
pub use path::{Ancestors, Path, ROOT};
pub use provider::{CachedProvider, DynamicProvider, Fetch, FsMap, TableProvider};

pub use bytes::Bytes;
