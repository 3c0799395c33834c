//! Validated slash-separated paths.
//!
//! A [`Path`] is either the root (spelled `"."`) or a clean, relative
//! sequence of non-empty segments. Paths never begin or end with `/` and
//! never contain `.` or `..` segments.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The spelling of the root path.
pub const ROOT: &str = ".";

/// A validated path in a virtual filesystem.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Path {
            components: Vec::new(),
        }
    }

    /// Parse a path string.
    ///
    /// # Path Syntax
    ///
    /// - `"."` is the root
    /// - Components are separated by a single `/`
    /// - Leading or trailing `/`, empty components, `.` and `..` are rejected
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mackerelfs_core::Path;
    ///
    /// let path = Path::parse("org/hosts/web-1").unwrap();
    /// assert_eq!(path.base(), "web-1");
    /// assert!(Path::parse(".").unwrap().is_root());
    /// assert!(Path::parse("/org").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, Error> {
        if !Self::is_valid(s) {
            return Err(Error::invalid_path("parse", s));
        }
        if s == ROOT {
            return Ok(Self::root());
        }
        Ok(Path {
            components: s.split('/').map(str::to_string).collect(),
        })
    }

    /// Report whether `s` is a valid path: the root, or clean, relative and
    /// free of `.`/`..` and empty segments.
    pub fn is_valid(s: &str) -> bool {
        if s == ROOT {
            return true;
        }
        !s.is_empty() && s.split('/').all(Self::is_valid_segment)
    }

    /// Report whether `s` is usable as a single path segment.
    pub fn is_valid_segment(s: &str) -> bool {
        !s.is_empty() && s != "." && s != ".." && !s.contains('/')
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    fn prefix(&self, depth: usize) -> Path {
        Path {
            components: self.components[..depth].to_vec(),
        }
    }

    /// The last segment, or `"."` for the root.
    pub fn base(&self) -> &str {
        self.components.last().map_or(ROOT, String::as_str)
    }

    /// The parent path; the root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Path {
        self.prefix(self.components.len().saturating_sub(1))
    }

    /// The first segment and everything after it, which is the root for a
    /// single-segment path. `None` for the root.
    pub fn split_first(&self) -> Option<(&str, Path)> {
        let (head, rest) = self.components.split_first()?;
        let rest = Path {
            components: rest.to_vec(),
        };
        Some((head.as_str(), rest))
    }

    /// # Panics
    ///
    /// Panics if `segment` is not a valid path segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Path {
        assert!(
            Self::is_valid_segment(segment),
            "invalid path segment {segment:?}"
        );
        let mut child = self.clone();
        child.components.push(segment.to_owned());
        child
    }

    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        Path {
            components: [self.components.as_slice(), other.components.as_slice()].concat(),
        }
    }

    /// Whole-segment prefix test; every path has the root as a prefix.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        self.components.starts_with(&prefix.components)
    }

    /// The part of this path below `prefix`: the root when they are equal,
    /// `None` when `prefix` is not this path or an ancestor of it.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if !self.has_prefix(prefix) {
            return None;
        }
        Some(Path {
            components: self.components[prefix.components.len()..].to_vec(),
        })
    }

    /// This path, then each parent in turn, ending with the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            path: self,
            remaining: self.components.len() + 1,
        }
    }
}

/// Iterator returned by [`Path::ancestors`]. Paths are built as they are
/// requested.
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    path: &'a Path,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        self.remaining = self.remaining.checked_sub(1)?;
        Some(self.path.prefix(self.remaining))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Ancestors<'_> {}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.components.as_slice() {
            [] => f.write_str(ROOT),
            segments => f.write_str(&segments.join("/")),
        }
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use mackerelfs_core::path;
///
/// let p = path!("org/hosts/web-1");
/// assert_eq!(p.to_string(), "org/hosts/web-1");
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}
