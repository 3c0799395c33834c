//! An in-memory, read-only filesystem.

use bytes::Bytes;

use crate::dir::DirHandle;
use crate::error::{Error, Result};
use crate::file::{DirEntry, Filesystem, Handle, OpenFlags, Status};
use crate::leaf::BytesFile;
use crate::node::DIR_PERM;
use crate::path_trie::PathTrie;
use crate::Path;

const FILE_PERM: u32 = 0o444;

#[derive(Debug, Clone)]
enum Node {
    File(Bytes),
    Dir,
}

/// A fixed tree of files held in memory.
///
/// Parent directories are implied by the files and directories added.
/// Adding a file or directory below an existing file panics.
///
/// ```rust
/// use mackerelfs_core::{path, read_file, MemFs};
///
/// let fs = MemFs::new()
///     .with_file("etc/motd", "welcome\n")
///     .with_dir("tmp");
/// assert_eq!(read_file(&fs, &path!("etc/motd")).unwrap(), b"welcome\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    tree: PathTrie<Node>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    ///
    /// # Panics
    ///
    /// Panics if `path` is invalid, is the root, or lies below a file.
    #[must_use]
    pub fn with_file(mut self, path: &str, data: impl Into<Bytes>) -> Self {
        let path = self.checked(path);
        self.tree.insert(&path, Node::File(data.into()));
        self
    }

    /// Add an empty directory.
    ///
    /// # Panics
    ///
    /// Panics if `path` is invalid, is the root, or lies below a file.
    #[must_use]
    pub fn with_dir(mut self, path: &str) -> Self {
        let path = self.checked(path);
        self.tree.insert(&path, Node::Dir);
        self
    }

    fn checked(&self, path: &str) -> Path {
        let path = Path::parse(path).unwrap_or_else(|e| panic!("invalid MemFs path: {e}"));
        assert!(!path.is_root(), "MemFs root is implicit");
        for ancestor in path.ancestors().skip(1) {
            assert!(
                !matches!(self.tree.get(&ancestor), Some(Node::File(_))),
                "{ancestor} is a file"
            );
        }
        path
    }

    fn entry(name: &str, node: &PathTrie<Node>) -> DirEntry {
        match node.value() {
            Some(Node::File(data)) => DirEntry::from_status(
                Status::file(name, FILE_PERM).with_size(data.len() as u64),
            ),
            _ => DirEntry::from_status(Status::dir(name, DIR_PERM)),
        }
    }
}

impl Filesystem for MemFs {
    fn open(&self, path: &Path, flags: OpenFlags) -> Result<Handle> {
        let node = self
            .tree
            .node(path)
            .ok_or_else(|| Error::not_exist("open", path.to_string()))?;

        match node.value() {
            Some(Node::File(data)) => {
                if flags.wants_write() {
                    return Err(Error::unsupported("open", path.to_string()));
                }
                let status =
                    Status::file(path.base(), FILE_PERM).with_size(data.len() as u64);
                Ok(Box::new(BytesFile::new(status, data.clone())))
            }
            _ => {
                let entries = node
                    .children()
                    .map(|(name, child)| Self::entry(name, child))
                    .collect();
                Ok(Box::new(DirHandle::new(
                    Status::dir(path.base(), DIR_PERM),
                    entries,
                )))
            }
        }
    }
}
