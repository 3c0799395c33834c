//! `metrics/` directories: one subdirectory per metric name, each holding a
//! `1hour` file with the values of the last hour.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use mackerelfs_client::MetricValue;
use mackerelfs_core::{Bytes, CachedProvider, FsMap, FsRef, MuxFs, ReaderFile, Result};

use crate::control::reload_on_any_line;
use crate::{named, Api};

pub const HOUR_FILE: &str = "1hour";

const HOUR_SECS: i64 = 60 * 60;

/// Where a `metrics/` directory gets its series from.
pub(crate) trait MetricSource: Send + Sync {
    fn names(&self) -> mackerelfs_client::Result<Vec<String>>;

    fn values(&self, name: &str, from: i64, to: i64)
        -> mackerelfs_client::Result<Vec<MetricValue>>;
}

pub(crate) struct HostMetrics {
    pub api: Api,
    pub id: String,
}

impl MetricSource for HostMetrics {
    fn names(&self) -> mackerelfs_client::Result<Vec<String>> {
        self.api.host_metric_names(&self.id)
    }

    fn values(
        &self,
        name: &str,
        from: i64,
        to: i64,
    ) -> mackerelfs_client::Result<Vec<MetricValue>> {
        self.api.host_metric_values(&self.id, name, from, to)
    }
}

pub(crate) struct ServiceMetrics {
    pub api: Api,
    pub service: String,
}

impl MetricSource for ServiceMetrics {
    fn names(&self) -> mackerelfs_client::Result<Vec<String>> {
        self.api.service_metric_names(&self.service)
    }

    fn values(
        &self,
        name: &str,
        from: i64,
        to: i64,
    ) -> mackerelfs_client::Result<Vec<MetricValue>> {
        self.api.service_metric_values(&self.service, name, from, to)
    }
}

/// `ctl` plus one directory per metric name.
pub(crate) fn metrics_fs(source: Arc<dyn MetricSource>) -> MuxFs {
    let provider = Arc::new(CachedProvider::new(move || -> Result<FsMap> {
        let names = source.names()?;
        Ok(named(
            "metric",
            names.into_iter().map(|name| {
                let fs = metric_fs(source.clone(), name.clone());
                (name, fs)
            }),
        ))
    }));
    MuxFs::new()
        .file("ctl", reload_on_any_line(provider.clone()))
        .provider(provider)
}

fn metric_fs(source: Arc<dyn MetricSource>, name: String) -> FsRef {
    let hour = ReaderFile::new(move || {
        let to = now();
        let values = source.values(&name, to - HOUR_SECS, to)?;
        Ok(Bytes::from(format_values(&name, &values)))
    });
    Arc::new(MuxFs::new().file(HOUR_FILE, hour))
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// One `name\tvalue\ttime` line per point, value with six decimals.
pub(crate) fn format_values(name: &str, values: &[MetricValue]) -> String {
    let mut out = String::new();
    for v in values {
        // writing to a String cannot fail
        let _ = writeln!(out, "{name}\t{:.6}\t{}", v.value, v.time);
    }
    out
}
