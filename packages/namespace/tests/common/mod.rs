//! An in-memory stand-in for the Mackerel API.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use mackerelfs_client::{
    Error, Host, HostQuery, MackerelApi, MetricValue, Org, Result, Role, Service,
};
use mackerelfs_core::{read_dir, Filesystem, Path};
use mackerelfs_namespace::{Api, Namespace};

pub const API_KEY: &str = "acme-key";

#[derive(Clone, Default)]
pub struct FakeHost {
    pub id: String,
    pub name: String,
    pub service: Option<String>,
    pub roles: Vec<String>,
    pub memo: String,
}

impl FakeHost {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn in_role(mut self, service: &str, role: &str) -> Self {
        self.service = Some(service.into());
        self.roles.push(role.into());
        self
    }
}

#[derive(Default)]
pub struct State {
    pub hosts: Vec<FakeHost>,
    pub services: Vec<Service>,
    pub roles: BTreeMap<String, Vec<Role>>,
    pub host_metrics: BTreeMap<String, BTreeMap<String, Vec<MetricValue>>>,
    pub service_metrics: BTreeMap<String, BTreeMap<String, Vec<MetricValue>>>,
    pub unavailable: bool,
}

#[derive(Default)]
pub struct FakeApi {
    pub state: Mutex<State>,
    /// One entry per call, e.g. `"hosts"` or `"host h1"`.
    pub calls: Mutex<Vec<String>>,
    /// The `(from, to)` of the last metric values request.
    pub last_range: Mutex<Option<(i64, i64)>>,
}

impl FakeApi {
    /// An organization with two hosts, one service with two roles, and a
    /// few metrics.
    pub fn acme() -> Arc<Self> {
        let api = Self::default();
        {
            let mut s = api.state.lock();
            s.hosts = vec![
                FakeHost::new("h1", "web-1").in_role("shop", "app"),
                FakeHost::new("h2", "db-1").in_role("shop", "db"),
            ];
            s.services = vec![Service {
                name: "shop".into(),
                memo: String::new(),
                roles: vec!["app".into(), "db".into()],
            }];
            s.roles.insert(
                "shop".into(),
                vec![
                    Role {
                        name: "app".into(),
                        memo: "frontends\n".into(),
                    },
                    Role {
                        name: "db".into(),
                        memo: String::new(),
                    },
                ],
            );
            s.host_metrics.insert(
                "h1".into(),
                BTreeMap::from([(
                    "loadavg5".to_string(),
                    vec![
                        MetricValue {
                            time: 100,
                            value: 0.25,
                        },
                        MetricValue {
                            time: 160,
                            value: 1.5,
                        },
                    ],
                )]),
            );
            s.service_metrics.insert(
                "shop".into(),
                BTreeMap::from([(
                    "orders".to_string(),
                    vec![MetricValue {
                        time: 42,
                        value: 7.0,
                    }],
                )]),
            );
        }
        Arc::new(api)
    }

    pub fn calls_to(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().push(call);
        if self.state.lock().unavailable {
            return Err(Error::Status {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

fn not_found(what: &str) -> Error {
    Error::Status {
        status: 404,
        message: format!("{what} not found"),
    }
}

impl MackerelApi for FakeApi {
    fn org(&self) -> Result<Org> {
        self.record("org".into())?;
        Ok(Org {
            name: "acme".into(),
        })
    }

    fn hosts(&self, query: &HostQuery) -> Result<Vec<Host>> {
        self.record("hosts".into())?;
        let state = self.state.lock();
        Ok(state
            .hosts
            .iter()
            .filter(|h| query.service.is_none() || h.service == query.service)
            .filter(|h| query.roles.iter().all(|r| h.roles.contains(r)))
            .map(|h| Host {
                id: h.id.clone(),
                name: h.name.clone(),
                display_name: None,
                status: Some("working".into()),
            })
            .collect())
    }

    fn host(&self, id: &str) -> Result<serde_json::Value> {
        self.record(format!("host {id}"))?;
        let state = self.state.lock();
        let h = state
            .hosts
            .iter()
            .find(|h| h.id == id)
            .ok_or_else(|| not_found("host"))?;
        Ok(json!({"id": h.id, "name": h.name, "memo": h.memo}))
    }

    fn host_metric_names(&self, id: &str) -> Result<Vec<String>> {
        self.record(format!("host_metric_names {id}"))?;
        let state = self.state.lock();
        Ok(state
            .host_metrics
            .get(id)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn host_metric_values(
        &self,
        id: &str,
        name: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<MetricValue>> {
        self.record(format!("host_metric_values {id} {name}"))?;
        *self.last_range.lock() = Some((from, to));
        let state = self.state.lock();
        state
            .host_metrics
            .get(id)
            .and_then(|m| m.get(name))
            .cloned()
            .ok_or_else(|| not_found("metric"))
    }

    fn services(&self) -> Result<Vec<Service>> {
        self.record("services".into())?;
        Ok(self.state.lock().services.clone())
    }

    fn roles(&self, service: &str) -> Result<Vec<Role>> {
        self.record(format!("roles {service}"))?;
        let state = self.state.lock();
        state
            .roles
            .get(service)
            .cloned()
            .ok_or_else(|| not_found("service"))
    }

    fn service_metric_names(&self, service: &str) -> Result<Vec<String>> {
        self.record(format!("service_metric_names {service}"))?;
        let state = self.state.lock();
        Ok(state
            .service_metrics
            .get(service)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn service_metric_values(
        &self,
        service: &str,
        name: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<MetricValue>> {
        self.record(format!("service_metric_values {service} {name}"))?;
        *self.last_range.lock() = Some((from, to));
        let state = self.state.lock();
        state
            .service_metrics
            .get(service)
            .and_then(|m| m.get(name))
            .cloned()
            .ok_or_else(|| not_found("metric"))
    }
}

/// A namespace whose connector hands out `api` for [`API_KEY`] and rejects
/// every other key.
pub fn namespace(api: Arc<FakeApi>) -> Namespace {
    Namespace::new(move |key: &str| -> Result<Api> {
        if key == API_KEY {
            let api: Api = api.clone();
            Ok(api)
        } else {
            Err(Error::Status {
                status: 403,
                message: "invalid api key".into(),
            })
        }
    })
}

/// Names in the directory at `path`, sorted.
pub fn names(fs: &dyn Filesystem, path: &str) -> Vec<String> {
    let path = Path::parse(path).unwrap();
    read_dir(fs, &path)
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect()
}
