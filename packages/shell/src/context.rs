//! The filesystem the shell browses and its current directory.

use mackerelfs_core::{Filesystem, FsRef, Path};

pub struct ShellContext {
    fs: FsRef,
    cwd: Path,
}

impl ShellContext {
    pub fn new(fs: FsRef) -> Self {
        Self {
            fs,
            cwd: Path::root(),
        }
    }

    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    pub fn current_path(&self) -> &Path {
        &self.cwd
    }

    pub fn set_current_path(&mut self, path: Path) {
        self.cwd = path;
    }

    /// Resolve user input against the current directory.
    ///
    /// A leading `/` starts from the root. Empty segments and `.` are
    /// skipped; `..` goes up one level and stops at the root.
    pub fn resolve_path(&self, input: &str) -> Result<Path, String> {
        let mut components = if input.starts_with('/') {
            Vec::new()
        } else {
            self.cwd.components.clone()
        };
        for segment in input.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                s => components.push(s.to_string()),
            }
        }
        if components.is_empty() {
            return Ok(Path::root());
        }
        Path::parse(&components.join("/")).map_err(|e| e.to_string())
    }
}

/// `/` for the root, `/a/b` otherwise.
pub fn format_path(path: &Path) -> String {
    format!("/{}", path.components.join("/"))
}
