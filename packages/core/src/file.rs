//! Open files, filesystems and directory entries.
//!
//! [`Filesystem`] is the capability every part of a namespace implements:
//! namespace nodes, mount tables, in-memory trees and whatever an outer
//! crate plugs in. Opening a path yields a [`Handle`], a boxed [`File`].

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use bitflags::bitflags;

use crate::error::{Error, ErrorKind, Result};
use crate::Path;

bitflags! {
    /// The mode a file is opened with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const CREATE = 1 << 2;
        const TRUNCATE = 1 << 3;
        const APPEND = 1 << 4;
    }
}

impl OpenFlags {
    /// True if any flag asks for modification.
    pub fn wants_write(self) -> bool {
        self.intersects(Self::WRITE | Self::CREATE | Self::TRUNCATE | Self::APPEND)
    }
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self::READ
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    File,
    Directory,
}

/// Metadata for an open file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub name: String,
    pub file_type: FileType,
    pub size: u64,
    pub modified: SystemTime,
    /// Permission bits, carried for display only.
    pub perm: u32,
}

impl Status {
    pub fn file(name: impl Into<String>, perm: u32) -> Self {
        Self {
            name: name.into(),
            file_type: FileType::File,
            size: 0,
            modified: SystemTime::UNIX_EPOCH,
            perm,
        }
    }

    pub fn dir(name: impl Into<String>, perm: u32) -> Self {
        Self {
            name: name.into(),
            file_type: FileType::Directory,
            size: 0,
            modified: SystemTime::UNIX_EPOCH,
            perm,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = modified;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// `ls -l` style mode string, e.g. `dr-xr-xr-x` or `--w--w--w-`.
    pub fn mode_string(&self) -> String {
        let mut s = String::with_capacity(10);
        s.push(if self.is_dir() { 'd' } else { '-' });
        for shift in [6u32, 3, 0] {
            let bits = (self.perm >> shift) & 0o7;
            s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        s
    }
}

/// An open file or directory.
///
/// A handle is not meant to be shared between callers; each open gets its
/// own read cursor.
pub trait File: Send {
    fn stat(&self) -> Result<Status>;

    /// Read bytes. `Ok(0)` signals end of data.
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Err(Error::unsupported("read", self.name()))
    }

    fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(Error::unsupported("write", self.name()))
    }

    /// Read directory entries.
    ///
    /// With `max > 0`, returns up to `max` unread entries, or `None` once
    /// nothing is left. With `max == 0`, returns everything remaining and
    /// never `None`.
    fn read_dir(&mut self, _max: usize) -> Result<Option<Vec<DirEntry>>> {
        Err(Error::not_a_directory("readdir", self.name()))
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }

    /// Name used in errors raised by the default methods.
    fn name(&self) -> String {
        self.stat().map(|s| s.name).unwrap_or_default()
    }
}

/// An open file.
pub type Handle = Box<dyn File>;

/// Something paths can be opened on.
pub trait Filesystem: Send + Sync {
    fn open(&self, path: &Path, flags: OpenFlags) -> Result<Handle>;

    /// Status of the file at `path`.
    fn stat(&self, path: &Path) -> Result<Status> {
        let file = self.open(path, OpenFlags::READ)?;
        let status = file.stat();
        let closed = file.close();
        let status = status?;
        closed?;
        Ok(status)
    }
}

/// A shared filesystem.
pub type FsRef = Arc<dyn Filesystem>;

type StatFn = dyn Fn() -> Result<Status> + Send + Sync;

/// A status computed on first request.
///
/// Only a successful result is cached; a failed computation is retried on
/// the next call.
#[derive(Clone)]
pub struct LazyStatus {
    compute: Arc<StatFn>,
    cached: Arc<OnceLock<Status>>,
}

impl LazyStatus {
    pub fn new(compute: impl Fn() -> Result<Status> + Send + Sync + 'static) -> Self {
        Self {
            compute: Arc::new(compute),
            cached: Arc::new(OnceLock::new()),
        }
    }

    /// A status that is already known.
    pub fn ready(status: Status) -> Self {
        let cached = OnceLock::new();
        let _ = cached.set(status.clone());
        Self {
            compute: Arc::new(move || Ok(status.clone())),
            cached: Arc::new(cached),
        }
    }

    pub fn get(&self) -> Result<Status> {
        if let Some(status) = self.cached.get() {
            return Ok(status.clone());
        }
        let status = (self.compute)()?;
        Ok(self.cached.get_or_init(|| status).clone())
    }
}

impl fmt::Debug for LazyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyStatus")
            .field("cached", &self.cached.get())
            .finish_non_exhaustive()
    }
}

/// An entry returned by [`File::read_dir`].
#[derive(Clone, Debug)]
pub struct DirEntry {
    name: String,
    is_dir: bool,
    status: LazyStatus,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, is_dir: bool, status: LazyStatus) -> Self {
        Self {
            name: name.into(),
            is_dir,
            status,
        }
    }

    pub fn from_status(status: Status) -> Self {
        Self {
            name: status.name.clone(),
            is_dir: status.is_dir(),
            status: LazyStatus::ready(status),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Full status of the entry, computed on first call.
    ///
    /// The reported name is always the entry name.
    pub fn info(&self) -> Result<Status> {
        self.status.get().map(|s| s.with_name(self.name.clone()))
    }
}

/// Wrap `inner` so it reports `name` and attributes its errors to `path`.
///
/// Used when a sub-filesystem's root is reached through a parent: the
/// handle is opened as `"."` internally but the caller asked for `path`.
pub(crate) fn renamed(inner: Handle, name: &str, path: &Path) -> Handle {
    Box::new(Renamed {
        inner,
        name: name.to_string(),
        path: path.to_string(),
    })
}

struct Renamed {
    inner: Handle,
    name: String,
    path: String,
}

impl File for Renamed {
    fn stat(&self) -> Result<Status> {
        self.inner
            .stat()
            .map(|s| s.with_name(self.name.clone()))
            .map_err(|e| e.rewrite(self.path.clone()))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.inner
            .read(buf)
            .map_err(|e| e.rewrite(self.path.clone()))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.inner
            .write(buf)
            .map_err(|e| e.rewrite(self.path.clone()))
    }

    fn read_dir(&mut self, max: usize) -> Result<Option<Vec<DirEntry>>> {
        self.inner
            .read_dir(max)
            .map_err(|e| e.rewrite(self.path.clone()))
    }

    fn close(self: Box<Self>) -> Result<()> {
        let Renamed { inner, path, .. } = *self;
        inner.close().map_err(|e| e.rewrite(path))
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Return `err` with its path replaced by the caller-visible `path`.
pub(crate) fn attribute(err: Error, op: &'static str, path: &Path) -> Error {
    err.with_op(op).rewrite(path.to_string())
}

/// Reject a read on a directory.
pub(crate) fn is_a_directory(name: &str) -> Error {
    Error::new(ErrorKind::IsADirectory, "read", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Plain;

    impl File for Plain {
        fn stat(&self) -> Result<Status> {
            Ok(Status::file("internal", 0o444))
        }
    }

    #[test]
    fn default_methods_report_kind_and_name() {
        let mut f = Plain;
        let e = f.read(&mut [0; 4]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Unsupported);
        assert_eq!(e.path(), "internal");

        let e = f.write(b"x").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Unsupported);
        assert_eq!(e.op(), "write");

        let e = f.read_dir(0).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::NotADirectory);
    }

    #[test]
    fn renamed_handle_reports_outer_name_and_path() {
        let mut h = renamed(Box::new(Plain), "web-1", &crate::path!("hosts/web-1"));
        assert_eq!(h.stat().unwrap().name, "web-1");

        let e = h.read(&mut [0; 4]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Unsupported);
        assert_eq!(e.path(), "hosts/web-1");
        assert!(h.close().is_ok());
    }

    #[test]
    fn lazy_status_caches_success_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = LazyStatus::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(Error::upstream("first try fails"))
            } else {
                Ok(Status::dir("d", 0o555))
            }
        });

        assert!(lazy.get().is_err());
        assert!(lazy.get().unwrap().is_dir());
        assert!(lazy.get().unwrap().is_dir());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dir_entry_info_uses_entry_name() {
        let e = DirEntry::new("outer", true, LazyStatus::ready(Status::dir(".", 0o555)));
        assert_eq!(e.name(), "outer");
        assert!(e.is_dir());
        assert_eq!(e.info().unwrap().name, "outer");
    }

    #[test]
    fn mode_strings() {
        assert_eq!(Status::dir("d", 0o555).mode_string(), "dr-xr-xr-x");
        assert_eq!(Status::file("ctl", 0o222).mode_string(), "--w--w--w-");
        assert_eq!(Status::file("info", 0o444).mode_string(), "-r--r--r--");
    }

    #[test]
    fn open_flags_write_detection() {
        assert!(!OpenFlags::READ.wants_write());
        assert!(OpenFlags::WRITE.wants_write());
        assert!((OpenFlags::READ | OpenFlags::APPEND).wants_write());
        assert_eq!(OpenFlags::default(), OpenFlags::READ);
    }
}
