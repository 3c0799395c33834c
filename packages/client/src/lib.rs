//! Blocking client for the Mackerel monitoring API.
//!
//! [`MackerelApi`] is the seam the namespace is built against; [`Client`] is
//! its HTTP implementation.
//!
//! ```no_run
//! use mackerelfs_client::{Client, ClientConfig, MackerelApi};
//!
//! let config = ClientConfig::from_env()?;
//! let client = Client::new(&config)?;
//! println!("{}", client.org()?.name);
//! # Ok::<(), mackerelfs_client::Error>(())
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{Client, MackerelApi};
pub use config::{ClientConfig, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use types::{Host, HostQuery, MetricValue, Org, Role, Service};
