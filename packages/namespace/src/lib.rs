//! Mackerel organizations as a tree of files.
//!
//! Every variable directory (hosts, services, roles, metric names) is a
//! cached provider over one API call, populated on first use and replaced
//! wholesale when its `ctl` file asks for a reload. Leaf files fetch on open.
//!
//! The tree is built against [`MackerelApi`], so any implementation of it,
//! including an in-memory fake, can stand in for the HTTP client.

mod control;
mod hosts;
mod metrics;
mod org;
mod root;
mod services;

use std::sync::Arc;

use mackerelfs_client::MackerelApi;
use mackerelfs_core::{FsMap, FsRef, Path};
use tracing::warn;

pub use hosts::{host_fs, hosts_fs};
pub use metrics::HOUR_FILE;
pub use org::org_fs;
pub use root::{Connector, HttpConnector, Namespace};
pub use services::{role_fs, service_fs, services_fs};

/// Shared handle to the API of one organization.
pub type Api = Arc<dyn MackerelApi>;

/// Collect `(name, fs)` pairs into a snapshot, dropping names that cannot be
/// a path segment. A repeated name keeps its last entry.
fn named(kind: &str, entries: impl IntoIterator<Item = (String, FsRef)>) -> FsMap {
    let mut map = FsMap::new();
    for (name, fs) in entries {
        if !Path::is_valid_segment(&name) {
            warn!(kind, name = %name, "skipping entry whose name is not a valid path segment");
            continue;
        }
        map.insert(name, fs);
    }
    map
}
