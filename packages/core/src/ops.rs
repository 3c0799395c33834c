//! Whole-file helpers over the [`Filesystem`] capability.

use crate::error::{ErrorKind, Result};
use crate::file::{DirEntry, File, Filesystem, OpenFlags};
use crate::Path;

const READ_CHUNK: usize = 8 * 1024;

/// Read the whole file at `path`.
pub fn read_file(fs: &dyn Filesystem, path: &Path) -> Result<Vec<u8>> {
    let mut file = fs.open(path, OpenFlags::READ)?;
    let read = read_to_end(file.as_mut());
    let closed = file.close();
    let data = read?;
    closed?;
    Ok(data)
}

fn read_to_end(file: &mut dyn File) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            return Ok(data);
        }
        data.extend_from_slice(&chunk[..n]);
    }
}

/// Every entry of the directory at `path`, sorted by name.
pub fn read_dir(fs: &dyn Filesystem, path: &Path) -> Result<Vec<DirEntry>> {
    let mut dir = fs.open(path, OpenFlags::READ)?;
    let listed = dir.read_dir(0);
    let closed = dir.close();
    let mut entries = listed?.unwrap_or_default();
    closed?;
    entries.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(entries)
}

/// Write `data` to the file at `path` and close it.
///
/// The close result is returned, so a control file's handler failure is
/// reported here. If the handler stopped before all of `data` was written,
/// the handler's error wins over the write failure it caused.
pub fn write_file(fs: &dyn Filesystem, path: &Path, data: &[u8]) -> Result<()> {
    let mut file = fs.open(path, OpenFlags::WRITE)?;
    let written = write_all(file.as_mut(), data);
    let closed = file.close();
    match (written, closed) {
        (Err(w), Err(c)) if w.kind() == ErrorKind::Closed => Err(c),
        (Err(w), _) => Err(w),
        (Ok(()), closed) => closed,
    }
}

fn write_all(file: &mut dyn File, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
        let n = file.write(data)?;
        if n == 0 {
            return Err(crate::Error::new(ErrorKind::Closed, "write", file.name()));
        }
        data = &data[n..];
    }
    Ok(())
}
