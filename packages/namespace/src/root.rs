//! The top of the tree: one directory per organization and a `ctl` file
//! that adds and removes them.
//!
//! ```text
//! ctl                 new <apikey> | delete <org>
//! <org>/
//!     hosts/
//!     services/
//! ```

use std::sync::Arc;

use mackerelfs_client::{Client, ClientConfig};
use mackerelfs_core::{
    ControlFile, DynamicProvider, Error, ErrorKind, Filesystem, Handle, MuxFs, OpenFlags, Path,
    Result, TableProvider,
};
use tracing::{debug, info};

use crate::Api;

/// Turns an API key into a client for that key's organization.
pub trait Connector: Send + Sync {
    fn connect(&self, api_key: &str) -> mackerelfs_client::Result<Api>;
}

impl<F> Connector for F
where
    F: Fn(&str) -> mackerelfs_client::Result<Api> + Send + Sync,
{
    fn connect(&self, api_key: &str) -> mackerelfs_client::Result<Api> {
        self(api_key)
    }
}

/// Connects over HTTP, reusing one endpoint and timeout for every key.
pub struct HttpConnector {
    config: ClientConfig,
}

impl HttpConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl Connector for HttpConnector {
    fn connect(&self, api_key: &str) -> mackerelfs_client::Result<Api> {
        let client = Client::new(&self.config.for_key(api_key))?;
        Ok(Arc::new(client))
    }
}

struct Orgs {
    table: Arc<TableProvider>,
    connector: Box<dyn Connector>,
}

impl Orgs {
    fn add(&self, api_key: &str) -> Result<String> {
        let api = self.connector.connect(api_key)?;
        let org = api.org()?;
        if !Path::is_valid_segment(&org.name) {
            return Err(Error::invalid_path("new", org.name));
        }
        let replaced = self
            .table
            .insert(&org.name, Arc::new(crate::org::org_fs(api)));
        info!(org = %org.name, replaced, "organization added");
        Ok(org.name)
    }

    fn remove(&self, name: &str) -> bool {
        let removed = self.table.remove(name);
        if removed {
            info!(org = name, "organization removed");
        }
        removed
    }

    fn control(&self, line: &str) -> Result<()> {
        let mut fields = line.split_whitespace();
        let Some(verb) = fields.next() else {
            return Ok(());
        };
        match verb {
            "new" => {
                let key = fields.next().ok_or_else(|| usage("new <apikey>"))?;
                self.add(key).map(|_| ())
            }
            "delete" => {
                let name = fields.next().ok_or_else(|| usage("delete <org>"))?;
                if !self.remove(name) {
                    debug!(org = name, "delete of unknown organization ignored");
                }
                Ok(())
            }
            other => {
                debug!(verb = other, "unknown root command ignored");
                Ok(())
            }
        }
    }
}

fn usage(form: &str) -> Error {
    Error::new(ErrorKind::InvalidPath, "write", "")
        .with_source(format!("missing arguments: usage {form}"))
}

/// The whole tree.
///
/// ```no_run
/// use mackerelfs_client::ClientConfig;
/// use mackerelfs_core::{path, read_dir, write_file};
/// use mackerelfs_namespace::{HttpConnector, Namespace};
///
/// let ns = Namespace::new(HttpConnector::new(ClientConfig::new("")));
/// write_file(&ns, &path!("ctl"), b"new MY-API-KEY\n")?;
/// for entry in read_dir(&ns, &path!("."))? {
///     println!("{}", entry.name());
/// }
/// # Ok::<(), mackerelfs_core::Error>(())
/// ```
pub struct Namespace {
    orgs: Arc<Orgs>,
    root: MuxFs,
}

impl Namespace {
    pub fn new(connector: impl Connector + 'static) -> Self {
        let orgs = Arc::new(Orgs {
            table: Arc::new(TableProvider::new()),
            connector: Box::new(connector),
        });
        let ctl = orgs.clone();
        let root = MuxFs::new()
            .file("ctl", ControlFile::new(move |line| ctl.control(line)))
            .provider(orgs.table.clone());
        Self { orgs, root }
    }

    /// Add the organization `api_key` belongs to and return its name.
    pub fn add_org(&self, api_key: &str) -> Result<String> {
        self.orgs.add(api_key).map_err(|e| e.with_op("new"))
    }

    /// Returns false if no organization is named `name`.
    pub fn remove_org(&self, name: &str) -> bool {
        self.orgs.remove(name)
    }

    pub fn orgs(&self) -> Vec<String> {
        // a table never fails to list
        self.orgs.table.keys().unwrap_or_default()
    }
}

impl Filesystem for Namespace {
    fn open(&self, path: &Path, flags: OpenFlags) -> Result<Handle> {
        self.root.open(path, flags)
    }
}
