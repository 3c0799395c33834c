//! Control-file handlers shared by the directories of the tree.

use std::sync::Arc;

use mackerelfs_core::{ControlFile, DynamicProvider};

/// Reload `provider` on every non-empty line.
pub(crate) fn reload_on_any_line(provider: Arc<dyn DynamicProvider>) -> ControlFile {
    ControlFile::new(move |line| {
        if line.is_empty() {
            return Ok(());
        }
        provider.reload()
    })
}

/// Reload `provider` on lines whose first word is `reload`; other lines are
/// accepted and ignored.
pub(crate) fn reload_command(provider: Arc<dyn DynamicProvider>) -> ControlFile {
    ControlFile::new(move |line| match line.split_whitespace().next() {
        Some("reload") => provider.reload(),
        _ => Ok(()),
    })
}
