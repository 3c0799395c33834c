//! A table of filesystems mounted at arbitrary paths.

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::dir::DirHandle;
use crate::error::{Error, Result};
use crate::file::{
    attribute, renamed, DirEntry, Filesystem, FsRef, Handle, LazyStatus, OpenFlags, Status,
};
use crate::node::DIR_PERM;
use crate::path_trie::PathTrie;
use crate::Path;

/// Filesystems grafted onto paths, deepest mount first.
///
/// Opening a path delegates to the mount at its longest mounted ancestor,
/// with that ancestor stripped off. A path that only leads toward mounts
/// (an intermediate directory nobody mounted) opens as a synthesized,
/// read-only directory listing the next segments. The root always opens.
///
/// The lock is held only to find the filesystem; opens on mounted
/// filesystems run without it.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use mackerelfs_core::{path, read_file, MemFs, MountTable};
///
/// let table = MountTable::new();
/// table.mount(&path!("."), Arc::new(MemFs::new().with_dir("srv"))).unwrap();
/// table.mount(&path!("srv"), Arc::new(MemFs::new().with_file("motd", "hi"))).unwrap();
/// assert_eq!(read_file(&table, &path!("srv/motd")).unwrap(), b"hi");
/// ```
#[derive(Default)]
pub struct MountTable {
    mounts: RwLock<PathTrie<FsRef>>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `fsys` at `path`.
    ///
    /// `path` must already open as a directory through this table, either
    /// through an existing mount or as a synthesized directory. A previous
    /// mount at the same path is replaced.
    pub fn mount(&self, path: &Path, fsys: FsRef) -> Result<()> {
        let status = self
            .stat(path)
            .map_err(|e| Error::new(e.kind(), "mount", path.to_string()).with_source(e))?;
        if !status.is_dir() {
            return Err(Error::not_a_directory("mount", path.to_string()));
        }
        let replaced = self.mounts.write().insert(path, fsys).is_some();
        debug!(%path, replaced, "mounted");
        Ok(())
    }

    /// Remove the mount at exactly `path`. Mounts below it stay.
    pub fn unmount(&self, path: &Path) -> Result<()> {
        match self.mounts.write().remove(path) {
            Some(_) => {
                debug!(%path, "unmounted");
                Ok(())
            }
            None => Err(Error::not_exist("unmount", path.to_string())),
        }
    }

    /// Mounted paths in sorted order.
    pub fn mounts(&self) -> Vec<Path> {
        self.mounts
            .read()
            .entries()
            .into_iter()
            .map(|(p, _)| p)
            .collect()
    }

    /// The deepest mounted ancestor of `path` and its filesystem.
    fn lookup(&self, path: &Path) -> Option<(Path, FsRef)> {
        let mounts = self.mounts.read();
        path.ancestors()
            .find_map(|prefix| mounts.get(&prefix).cloned().map(|fsys| (prefix, fsys)))
    }

    /// Synthesize a directory for a path that leads toward mounts.
    fn fallback(&self, path: &Path) -> Result<Handle> {
        let children: Vec<(String, Option<FsRef>)> = {
            let mounts = self.mounts.read();
            match mounts.node(path) {
                Some(node) => node
                    .children()
                    .filter(|(_, child)| child.holds_values())
                    .map(|(name, child)| (name.to_string(), child.value().cloned()))
                    .collect(),
                None => Vec::new(),
            }
        };

        if children.is_empty() && !path.is_root() {
            return Err(Error::not_exist("open", path.to_string()));
        }

        let entries = children
            .into_iter()
            .map(|(name, mounted)| match mounted {
                Some(fsys) => {
                    DirEntry::new(name, true, LazyStatus::new(move || fsys.stat(&Path::root())))
                }
                None => {
                    let status = Status::dir(name, DIR_PERM);
                    DirEntry::from_status(status)
                }
            })
            .collect();

        trace!(%path, "synthesized directory");
        Ok(Box::new(DirHandle::new(
            Status::dir(path.base(), DIR_PERM),
            entries,
        )))
    }
}

impl Filesystem for MountTable {
    fn open(&self, path: &Path, flags: OpenFlags) -> Result<Handle> {
        let Some((prefix, fsys)) = self.lookup(path) else {
            return self.fallback(path);
        };
        let stripped = path
            .strip_prefix(&prefix)
            .ok_or_else(|| Error::not_exist("open", path.to_string()))?;

        trace!(%path, mount = %prefix, %stripped, "delegating open");
        let handle = fsys
            .open(&stripped, flags)
            .map_err(|e| attribute(e, "open", path))?;
        if stripped.is_root() {
            Ok(renamed(handle, path.base(), path))
        } else {
            Ok(handle)
        }
    }
}
