//! Synthesized directory handles.

use crate::error::Result;
use crate::file::{is_a_directory, DirEntry, File, Status};

/// A directory handle over a listing built at open time.
///
/// Each handle owns its cursor; two opens of the same directory page
/// through their listings independently.
#[derive(Debug)]
pub struct DirHandle {
    status: Status,
    entries: Vec<DirEntry>,
    offset: usize,
}

impl DirHandle {
    pub fn new(status: Status, entries: Vec<DirEntry>) -> Self {
        Self {
            status,
            entries,
            offset: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.entries.len() - self.offset
    }
}

impl File for DirHandle {
    fn stat(&self) -> Result<Status> {
        Ok(self.status.clone())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Err(is_a_directory(&self.status.name))
    }

    fn read_dir(&mut self, max: usize) -> Result<Option<Vec<DirEntry>>> {
        let n = if max == 0 {
            self.remaining()
        } else if self.remaining() == 0 {
            return Ok(None);
        } else {
            max.min(self.remaining())
        };
        let start = self.offset;
        self.offset += n;
        Ok(Some(self.entries[start..self.offset].to_vec()))
    }

    fn name(&self) -> String {
        self.status.name.clone()
    }
}
