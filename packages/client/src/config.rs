//! Client configuration.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.mackerelio.com/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_KEY_ENV: &str = "MACKEREL_APIKEY";
pub const BASE_URL_ENV: &str = "MACKEREL_BASE_URL";

/// Where and how to reach the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    pub api_key: String,
    #[serde(default = "default_timeout", with = "secs")]
    pub timeout: Duration,
}

fn default_base_url() -> Url {
    // DEFAULT_BASE_URL is a constant known to parse.
    Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|_| unreachable!())
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

impl ClientConfig {
    /// A configuration for `api_key` against the public API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `MACKEREL_APIKEY` and, if set, `MACKEREL_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| Error::Config {
            message: format!("{API_KEY_ENV} is not set"),
        })?;
        let mut config = Self::new(api_key);
        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            config = config.with_base_url(&base)?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        let mut url = Url::parse(base)?;
        if url.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("{base} cannot be used as a base URL"),
            });
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The same endpoint and timeout with a different key.
    #[must_use]
    pub fn for_key(&self, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..self.clone()
        }
    }
}
