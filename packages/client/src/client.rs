//! The API seam and its reqwest implementation.

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{
    Host, HostQuery, HostResponse, HostsResponse, MetricValue, MetricsResponse, NamesResponse,
    Org, Role, RolesResponse, Service, ServicesResponse,
};

const API_KEY_HEADER: &str = "X-Api-Key";

/// Everything the namespace asks of the monitoring service.
///
/// Time ranges are Unix seconds, inclusive on both ends.
pub trait MackerelApi: Send + Sync {
    fn org(&self) -> Result<Org>;

    fn hosts(&self, query: &HostQuery) -> Result<Vec<Host>>;

    /// The full host document, as returned by the API.
    fn host(&self, id: &str) -> Result<serde_json::Value>;

    fn host_metric_names(&self, id: &str) -> Result<Vec<String>>;

    fn host_metric_values(&self, id: &str, name: &str, from: i64, to: i64)
        -> Result<Vec<MetricValue>>;

    fn services(&self) -> Result<Vec<Service>>;

    fn roles(&self, service: &str) -> Result<Vec<Role>>;

    fn service_metric_names(&self, service: &str) -> Result<Vec<String>>;

    fn service_metric_values(
        &self,
        service: &str,
        name: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<MetricValue>>;
}

/// Blocking HTTP client for the Mackerel API.
///
/// Must not be called from inside an async runtime; wrap calls in
/// `spawn_blocking` there.
pub struct Client {
    http: HttpClient,
    base_url: Url,
}

impl Client {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut key = HeaderValue::from_str(&config.api_key).map_err(|_| Error::Config {
            message: "API key contains characters not allowed in a header".into(),
        })?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// `{base}/api/v0/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(["api", "v0"])
            .extend(segments);
        Ok(url)
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");

        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn metric_values(
        &self,
        segments: &[&str],
        name: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<MetricValue>> {
        let (from, to) = (from.to_string(), to.to_string());
        let query = [("name", name), ("from", from.as_str()), ("to", to.as_str())];
        let response: MetricsResponse = self.get(segments, &query)?;
        Ok(response.metrics)
    }
}

/// The message of an API error body `{"error":{"message":...}}`, or the
/// raw body when it has another shape.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

impl MackerelApi for Client {
    fn org(&self) -> Result<Org> {
        self.get(&["org"], &[])
    }

    fn hosts(&self, query: &HostQuery) -> Result<Vec<Host>> {
        let response: HostsResponse = self.get(&["hosts"], &query.pairs())?;
        Ok(response.hosts)
    }

    fn host(&self, id: &str) -> Result<serde_json::Value> {
        let response: HostResponse = self.get(&["hosts", id], &[])?;
        Ok(response.host)
    }

    fn host_metric_names(&self, id: &str) -> Result<Vec<String>> {
        let response: NamesResponse = self.get(&["hosts", id, "metric-names"], &[])?;
        Ok(response.names)
    }

    fn host_metric_values(
        &self,
        id: &str,
        name: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<MetricValue>> {
        self.metric_values(&["hosts", id, "metrics"], name, from, to)
    }

    fn services(&self) -> Result<Vec<Service>> {
        let response: ServicesResponse = self.get(&["services"], &[])?;
        Ok(response.services)
    }

    fn roles(&self, service: &str) -> Result<Vec<Role>> {
        let response: RolesResponse = self.get(&["services", service, "roles"], &[])?;
        Ok(response.roles)
    }

    fn service_metric_names(&self, service: &str) -> Result<Vec<String>> {
        let response: NamesResponse = self.get(&["services", service, "metric-names"], &[])?;
        Ok(response.names)
    }

    fn service_metric_values(
        &self,
        service: &str,
        name: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<MetricValue>> {
        self.metric_values(&["services", service, "metrics"], name, from, to)
    }
}
