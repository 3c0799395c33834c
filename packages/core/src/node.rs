//! The namespace node: a directory built from leaf files, fixed
//! sub-filesystems and one dynamic provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::dir::DirHandle;
use crate::error::{Error, Result};
use crate::file::{
    attribute, renamed, DirEntry, Filesystem, FsRef, Handle, LazyStatus, OpenFlags, Status,
};
use crate::leaf::LeafFile;
use crate::provider::DynamicProvider;
use crate::Path;

/// Permission bits reported for synthesized directories.
pub const DIR_PERM: u32 = 0o555;

/// A composable directory.
///
/// Resolution order for a path is: a registered file matching the whole
/// path, then a fixed sub-filesystem named by the first segment, then the
/// provider. Files and fixed sub-filesystems are registered while building
/// the node, before it is shared.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use mackerelfs_core::{path, read_dir, read_file, MemFs, MuxFs, ReaderFile};
///
/// let fs = MuxFs::new()
///     .file("version", ReaderFile::new(|| Ok("1\n".into())))
///     .fs("docs", Arc::new(MemFs::new().with_file("README", "hi")));
///
/// let names: Vec<_> = read_dir(&fs, &path!("."))
///     .unwrap()
///     .iter()
///     .map(|e| e.name().to_string())
///     .collect();
/// assert_eq!(names, ["docs", "version"]);
/// assert_eq!(read_file(&fs, &path!("docs/README")).unwrap(), b"hi");
/// ```
#[derive(Default)]
pub struct MuxFs {
    files: BTreeMap<String, Arc<dyn LeafFile>>,
    dirs: BTreeMap<String, FsRef>,
    provider: Option<Arc<dyn DynamicProvider>>,
}

impl MuxFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a leaf file.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a single path segment.
    #[must_use]
    pub fn file(mut self, name: &str, leaf: impl LeafFile + 'static) -> Self {
        assert!(Path::is_valid_segment(name), "invalid file name {:?}", name);
        self.files.insert(name.to_string(), Arc::new(leaf));
        self
    }

    /// Register a fixed sub-filesystem.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a single path segment.
    #[must_use]
    pub fn fs(mut self, name: &str, fsys: FsRef) -> Self {
        assert!(Path::is_valid_segment(name), "invalid fs name {:?}", name);
        self.dirs.insert(name.to_string(), fsys);
        self
    }

    /// Install the dynamic provider, replacing any previous one.
    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn DynamicProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    fn open_root(&self) -> Result<Handle> {
        let mut entries = Vec::with_capacity(self.files.len() + self.dirs.len());

        for (name, leaf) in &self.files {
            let leaf = leaf.clone();
            let file_name = name.clone();
            entries.push(DirEntry::new(
                name.clone(),
                false,
                LazyStatus::new(move || {
                    let handle = leaf.open(&file_name, OpenFlags::READ)?;
                    let status = handle.stat();
                    handle.close()?;
                    status
                }),
            ));
        }

        for (name, fsys) in &self.dirs {
            let fsys = fsys.clone();
            entries.push(DirEntry::new(
                name.clone(),
                true,
                LazyStatus::new(move || fsys.stat(&Path::root())),
            ));
        }

        if let Some(provider) = &self.provider {
            let keys = provider
                .keys()
                .map_err(|e| attribute(e, "open", &Path::root()))?;
            for key in keys {
                // Shadowed keys can never be opened.
                if self.files.contains_key(&key) || self.dirs.contains_key(&key) {
                    continue;
                }
                let provider = provider.clone();
                let lookup = key.clone();
                entries.push(DirEntry::new(
                    key,
                    true,
                    LazyStatus::new(move || match provider.resolve(&lookup)? {
                        Some(fsys) => fsys.stat(&Path::root()),
                        None => Err(Error::not_exist("stat", lookup.clone())),
                    }),
                ));
            }
        }

        Ok(Box::new(DirHandle::new(Status::dir(".", DIR_PERM), entries)))
    }

    fn lookup(&self, segment: &str) -> Result<Option<FsRef>> {
        if let Some(fsys) = self.dirs.get(segment) {
            return Ok(Some(fsys.clone()));
        }
        // A leaf name shadows a provider key all the way down.
        if self.files.contains_key(segment) {
            return Ok(None);
        }
        match &self.provider {
            Some(provider) => provider.resolve(segment),
            None => Ok(None),
        }
    }
}

impl Filesystem for MuxFs {
    fn open(&self, path: &Path, flags: OpenFlags) -> Result<Handle> {
        let Some((head, rest)) = path.split_first() else {
            return self.open_root();
        };

        if rest.is_root() {
            if let Some(leaf) = self.files.get(head) {
                return leaf
                    .open(head, flags)
                    .map_err(|e| attribute(e, "open", path));
            }
        }

        let fsys = self
            .lookup(head)
            .map_err(|e| attribute(e, "open", path))?
            .ok_or_else(|| Error::not_exist("open", path.to_string()))?;

        trace!(%path, sub = head, rest = %rest, "delegating open");
        let handle = fsys
            .open(&rest, flags)
            .map_err(|e| attribute(e, "open", path))?;
        if rest.is_root() {
            Ok(renamed(handle, head, path))
        } else {
            Ok(handle)
        }
    }
}
