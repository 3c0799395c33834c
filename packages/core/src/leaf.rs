//! Leaf files: factories invoked once per open.

use bytes::Bytes;

use crate::error::Result;
use crate::file::{File, Handle, OpenFlags, Status};

/// Produces a fresh handle for a registered file on every open.
///
/// `name` is the segment the file is registered under. Closures of the
/// form `Fn(&str, OpenFlags) -> Result<Handle>` implement this trait.
pub trait LeafFile: Send + Sync {
    fn open(&self, name: &str, flags: OpenFlags) -> Result<Handle>;
}

impl<F> LeafFile for F
where
    F: Fn(&str, OpenFlags) -> Result<Handle> + Send + Sync,
{
    fn open(&self, name: &str, flags: OpenFlags) -> Result<Handle> {
        self(name, flags)
    }
}

/// A read-only file whose content is produced at open time.
///
/// ```rust
/// use mackerelfs_core::{read_file, MuxFs, ReaderFile, path};
///
/// let fs = MuxFs::new().file("motd", ReaderFile::new(|| Ok("hello\n".into())));
/// assert_eq!(read_file(&fs, &path!("motd")).unwrap(), b"hello\n");
/// ```
pub struct ReaderFile {
    produce: Box<dyn Fn() -> Result<Bytes> + Send + Sync>,
}

impl ReaderFile {
    pub const PERM: u32 = 0o444;

    pub fn new(produce: impl Fn() -> Result<Bytes> + Send + Sync + 'static) -> Self {
        Self {
            produce: Box::new(produce),
        }
    }
}

impl LeafFile for ReaderFile {
    fn open(&self, name: &str, _flags: OpenFlags) -> Result<Handle> {
        let data = (self.produce)()?;
        let status = Status::file(name, Self::PERM).with_size(data.len() as u64);
        Ok(Box::new(BytesFile::new(status, data)))
    }
}

/// An open file over an in-memory buffer.
#[derive(Debug)]
pub(crate) struct BytesFile {
    status: Status,
    data: Bytes,
    pos: usize,
}

impl BytesFile {
    pub(crate) fn new(status: Status, data: Bytes) -> Self {
        Self {
            status,
            data,
            pos: 0,
        }
    }
}

impl File for BytesFile {
    fn stat(&self) -> Result<Status> {
        Ok(self.status.clone())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let rest = &self.data[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }

    fn name(&self) -> String {
        self.status.name.clone()
    }
}
