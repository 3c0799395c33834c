//! Request and response shapes of the Mackerel API.

use serde::{Deserialize, Serialize};

/// The organization an API key belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    pub name: String,
}

/// A host as listed by `GET /api/v0/hosts`.
///
/// Only the fields the namespace needs are typed; the full document is
/// available through [`MackerelApi::host`](crate::MackerelApi::host).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub memo: String,
}

/// One point of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub value: f64,
}

/// Filters for listing hosts.
///
/// An empty query lists every host of the organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostQuery {
    pub service: Option<String>,
    pub roles: Vec<String>,
}

impl HostQuery {
    pub fn all() -> Self {
        Self::default()
    }

    /// Hosts belonging to `role` of `service`.
    pub fn role(service: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            roles: vec![role.into()],
        }
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(service) = &self.service {
            pairs.push(("service", service.as_str()));
        }
        for role in &self.roles {
            pairs.push(("role", role.as_str()));
        }
        pairs
    }
}

// Response envelopes.

#[derive(Deserialize)]
pub(crate) struct HostsResponse {
    pub hosts: Vec<Host>,
}

#[derive(Deserialize)]
pub(crate) struct HostResponse {
    pub host: serde_json::Value,
}

#[derive(Deserialize)]
pub(crate) struct NamesResponse {
    pub names: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct MetricsResponse {
    pub metrics: Vec<MetricValue>,
}

#[derive(Deserialize)]
pub(crate) struct ServicesResponse {
    pub services: Vec<Service>,
}

#[derive(Deserialize)]
pub(crate) struct RolesResponse {
    pub roles: Vec<Role>,
}
