//! Service, role and role-member directories.
//!
//! ```text
//! services/
//!     ctl
//!     <service>/
//!         ctl
//!         metrics/
//!         <role>/
//!             memo
//!             ctl
//!             <host>/
//! ```

use std::sync::Arc;

use mackerelfs_client::{HostQuery, Role};
use mackerelfs_core::{Bytes, CachedProvider, FsMap, FsRef, MuxFs, ReaderFile, Result};
use tracing::debug;

use crate::control::reload_command;
use crate::hosts::host_list;
use crate::metrics::{metrics_fs, ServiceMetrics};
use crate::{named, Api};

/// `services/`: one directory per service, reloaded by writing `reload` to
/// `ctl`.
pub fn services_fs(api: Api) -> MuxFs {
    let services = Arc::new(CachedProvider::new(move || -> Result<FsMap> {
        let services = api.services()?;
        debug!(count = services.len(), "services fetched");
        Ok(named(
            "service",
            services.into_iter().map(|s| {
                let fs: FsRef = Arc::new(service_fs(api.clone(), s.name.clone()));
                (s.name, fs)
            }),
        ))
    }));
    MuxFs::new()
        .file("ctl", reload_command(services.clone()))
        .provider(services)
}

/// A service: its metrics, a `ctl` and one directory per role.
///
/// A role named `ctl` or `metrics` is hidden behind the fixed entries.
pub fn service_fs(api: Api, service: String) -> MuxFs {
    let roles_api = api.clone();
    let roles_service = service.clone();
    let roles = Arc::new(CachedProvider::new(move || -> Result<FsMap> {
        let roles = roles_api.roles(&roles_service)?;
        debug!(service = %roles_service, count = roles.len(), "roles fetched");
        Ok(named(
            "role",
            roles.into_iter().map(|role| {
                let name = role.name.clone();
                let fs: FsRef =
                    Arc::new(role_fs(roles_api.clone(), roles_service.clone(), role));
                (name, fs)
            }),
        ))
    }));

    MuxFs::new()
        .file("ctl", reload_command(roles.clone()))
        .fs(
            "metrics",
            Arc::new(metrics_fs(Arc::new(ServiceMetrics { api, service }))),
        )
        .provider(roles)
}

/// A role: its memo, a `ctl` and the hosts that carry the role.
pub fn role_fs(api: Api, service: String, role: Role) -> MuxFs {
    let hosts = host_list(api, HostQuery::role(service, role.name));
    let memo = Bytes::from(role.memo);
    MuxFs::new()
        .file("memo", ReaderFile::new(move || Ok(memo.clone())))
        .file("ctl", reload_command(hosts.clone()))
        .provider(hosts)
}
