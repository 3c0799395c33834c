//! Host directories.
//!
//! ```text
//! hosts/
//!     ctl
//!     <host>/
//!         info
//!         ctl
//!         metrics/
//! ```

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use mackerelfs_client::HostQuery;
use mackerelfs_core::{
    Bytes, CachedProvider, ControlFile, DynamicProvider, FsMap, FsRef, MuxFs, ReaderFile, Result,
};
use tracing::debug;

use crate::control::reload_on_any_line;
use crate::metrics::{metrics_fs, HostMetrics};
use crate::{named, Api};

/// The hosts matching `query`, one directory each, fetched on first use.
pub(crate) fn host_list(api: Api, query: HostQuery) -> Arc<dyn DynamicProvider> {
    Arc::new(CachedProvider::new(move || -> Result<FsMap> {
        let hosts = api.hosts(&query)?;
        debug!(count = hosts.len(), ?query, "hosts fetched");
        Ok(named(
            "host",
            hosts.into_iter().map(|h| {
                let fs: FsRef = Arc::new(host_fs(api.clone(), h.id));
                (h.name, fs)
            }),
        ))
    }))
}

/// `hosts/`: every host of the organization plus a `ctl` that reloads the
/// list on any non-empty line.
pub fn hosts_fs(api: Api) -> MuxFs {
    let hosts = host_list(api, HostQuery::all());
    MuxFs::new()
        .file("ctl", reload_on_any_line(hosts.clone()))
        .provider(hosts)
}

/// A single host, addressed by its id.
pub fn host_fs(api: Api, id: String) -> MuxFs {
    let info = Arc::new(HostInfo::new(api.clone(), id.clone()));
    let reader = info.clone();
    let reloader = info;
    MuxFs::new()
        .file("info", ReaderFile::new(move || reader.get()))
        .file(
            "ctl",
            ControlFile::new(move |line| {
                if line.is_empty() {
                    return Ok(());
                }
                reloader.reload().map(|_| ())
            }),
        )
        .fs(
            "metrics",
            Arc::new(metrics_fs(Arc::new(HostMetrics { api, id }))),
        )
}

/// The host document rendered as indented JSON, fetched once and kept until
/// the next reload.
struct HostInfo {
    api: Api,
    id: String,
    rendered: ArcSwapOption<Bytes>,
}

impl HostInfo {
    fn new(api: Api, id: String) -> Self {
        Self {
            api,
            id,
            rendered: ArcSwapOption::empty(),
        }
    }

    fn get(&self) -> Result<Bytes> {
        match self.rendered.load_full() {
            Some(b) => Ok(Bytes::clone(&b)),
            None => self.reload(),
        }
    }

    fn reload(&self) -> Result<Bytes> {
        let host = self.api.host(&self.id)?;
        let mut out =
            serde_json::to_vec_pretty(&host).map_err(mackerelfs_client::Error::from)?;
        out.push(b'\n');
        let out = Bytes::from(out);
        self.rendered.store(Some(Arc::new(out.clone())));
        debug!(id = %self.id, "host info fetched");
        Ok(out)
    }
}
