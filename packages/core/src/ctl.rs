//! Control files: write-only files whose content is a stream of commands.
//!
//! Every open starts a worker thread that splits the written bytes into
//! lines and hands each line to the handler, in write order. The first
//! handler error stops the worker; later input is dropped unprocessed and
//! the error is returned from [`File::close`].
//!
//! Writes block once the worker falls behind by more than a few chunks.
//! Control handles use blocking channel operations and must not be driven
//! from inside an async runtime.

use std::sync::Arc;
use std::thread::JoinHandle;

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::file::{File, Handle, OpenFlags, Status};
use crate::leaf::LeafFile;

/// Chunks buffered between writer and worker before writes block.
const CHANNEL_CAPACITY: usize = 16;

type LineHandler = dyn Fn(&str) -> Result<()> + Send + Sync;

/// A leaf file that runs `handler` on every line written to it.
///
/// ```rust
/// use mackerelfs_core::{path, write_file, ControlFile, MuxFs};
///
/// let fs = MuxFs::new().file("ctl", ControlFile::new(|line| {
///     println!("command: {line}");
///     Ok(())
/// }));
/// write_file(&fs, &path!("ctl"), b"reload\n").unwrap();
/// ```
#[derive(Clone)]
pub struct ControlFile {
    handler: Arc<LineHandler>,
}

impl ControlFile {
    pub const PERM: u32 = 0o222;

    pub fn new(handler: impl Fn(&str) -> Result<()> + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl LeafFile for ControlFile {
    fn open(&self, name: &str, _flags: OpenFlags) -> Result<Handle> {
        Ok(Box::new(ControlHandle::spawn(name, self.handler.clone())?))
    }
}

struct ControlHandle {
    name: String,
    tx: Option<mpsc::Sender<Bytes>>,
    worker: Option<JoinHandle<Result<()>>>,
}

impl ControlHandle {
    fn spawn(name: &str, handler: Arc<LineHandler>) -> Result<Self> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let worker_name = name.to_string();
        let worker = std::thread::Builder::new()
            .name(format!("ctl:{name}"))
            .spawn(move || run(rx, &worker_name, handler.as_ref()))?;
        Ok(Self {
            name: name.to_string(),
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    fn closed(&self) -> Error {
        Error::new(ErrorKind::Closed, "write", self.name.clone())
    }
}

impl File for ControlHandle {
    fn stat(&self) -> Result<Status> {
        Ok(Status::file(self.name.clone(), ControlFile::PERM))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let Some(tx) = &self.tx else {
            return Err(self.closed());
        };
        if buf.is_empty() {
            return Ok(0);
        }
        // A send fails only when the worker has already stopped.
        tx.blocking_send(Bytes::copy_from_slice(buf))
            .map_err(|_| self.closed())?;
        Ok(buf.len())
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        drop(self.tx.take());
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        match worker.join() {
            Ok(result) => result,
            Err(_) => Err(Error::upstream("control handler panicked")
                .with_op("close")
                .rewrite(self.name.clone())),
        }
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

fn run(mut rx: mpsc::Receiver<Bytes>, name: &str, handler: &LineHandler) -> Result<()> {
    let mut pending = BytesMut::new();
    // Bytes of `pending` already known to hold no newline.
    let mut scanned = 0;
    while let Some(chunk) = rx.blocking_recv() {
        pending.extend_from_slice(&chunk);
        while let Some(offset) = pending[scanned..].iter().position(|&b| b == b'\n') {
            let pos = scanned + offset;
            let line = pending.split_to(pos + 1);
            scanned = 0;
            dispatch(&line[..pos], name, handler)?;
        }
        scanned = pending.len();
    }
    if !pending.is_empty() {
        dispatch(&pending, name, handler)?;
    }
    Ok(())
}

fn dispatch(raw: &[u8], name: &str, handler: &LineHandler) -> Result<()> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);
    debug!(file = name, line = %line, "control command");
    handler(&line).map_err(|e| {
        warn!(file = name, line = %line, error = %e, "control command failed");
        let e = e.with_op("write");
        if e.path().is_empty() {
            e.rewrite(name)
        } else {
            e
        }
    })
}
