//! Error types for filesystem operations.
//!
//! Every error carries the operation that failed and the path as the caller
//! saw it. When a request crosses a delegation boundary (a sub-filesystem, a
//! mount) the path is rewritten with [`Error::rewrite`] so callers never see
//! the stripped, internal path.

use std::fmt;

/// Boxed error from an external collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for filesystem operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The category of a filesystem error.
///
/// The kind is preserved unchanged through path rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The path is malformed (not clean, not relative, or contains `.`/`..`).
    InvalidPath,
    /// No entry exists at the path.
    NotExist,
    /// A directory was required but something else was found.
    NotADirectory,
    /// A byte read was attempted on a directory.
    IsADirectory,
    /// The operation is not implemented by the underlying file.
    Unsupported,
    /// An external collaborator (API fetch, provider population) failed.
    Upstream,
    /// The file was already closed or its consumer has stopped.
    Closed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidPath => "invalid argument",
            ErrorKind::NotExist => "file does not exist",
            ErrorKind::NotADirectory => "not a directory",
            ErrorKind::IsADirectory => "is a directory",
            ErrorKind::Unsupported => "not implemented",
            ErrorKind::Upstream => "upstream failure",
            ErrorKind::Closed => "file already closed",
        };
        f.write_str(s)
    }
}

/// A filesystem error attributed to an operation and a caller-visible path.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    op: &'static str,
    path: String,
    source: Option<BoxError>,
}

impl Error {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, op: &'static str, path: impl Into<String>) -> Self {
        Self {
            kind,
            op,
            path: path.into(),
            source: None,
        }
    }

    pub fn invalid_path(op: &'static str, path: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPath, op, path)
    }

    pub fn not_exist(op: &'static str, path: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotExist, op, path)
    }

    pub fn not_a_directory(op: &'static str, path: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotADirectory, op, path)
    }

    pub fn unsupported(op: &'static str, path: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, op, path)
    }

    /// Wrap a collaborator failure.
    ///
    /// The operation and path are left empty; the delegation boundary that
    /// observes the error fills them in with [`Error::rewrite`] and
    /// [`Error::with_op`].
    pub fn upstream(source: impl Into<BoxError>) -> Self {
        Self {
            kind: ErrorKind::Upstream,
            op: "",
            path: String::new(),
            source: Some(source.into()),
        }
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the operation if none was recorded yet.
    #[must_use]
    pub fn with_op(mut self, op: &'static str) -> Self {
        if self.op.is_empty() {
            self.op = op;
        }
        self
    }

    /// Replace the path with the one the original caller used.
    ///
    /// The kind, operation and source are kept as they are.
    #[must_use]
    pub fn rewrite(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_not_exist(&self) -> bool {
        self.kind == ErrorKind::NotExist
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.op.is_empty() {
            write!(f, "{} ", self.op)?;
        }
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path)?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::upstream(e)
    }
}
