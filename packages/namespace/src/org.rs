use std::sync::Arc;

use mackerelfs_core::MuxFs;

use crate::hosts::hosts_fs;
use crate::services::services_fs;
use crate::Api;

/// An organization: its hosts and its services.
pub fn org_fs(api: Api) -> MuxFs {
    MuxFs::new()
        .fs("hosts", Arc::new(hosts_fs(api.clone())))
        .fs("services", Arc::new(services_fs(api)))
}
