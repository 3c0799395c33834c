//! Dynamic providers of named sub-filesystems.
//!
//! A [`MuxFs`](crate::MuxFs) consults its provider for any first segment
//! that is not a fixed sub-filesystem. Providers own their cache; the node
//! only asks for keys and resolutions.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use tracing::{debug, warn};

use crate::error::Result;
use crate::file::FsRef;

/// A snapshot of a provider's children.
pub type FsMap = BTreeMap<String, FsRef>;

/// An enumerable, reloadable set of named sub-filesystems.
pub trait DynamicProvider: Send + Sync {
    /// Currently known keys. May populate the provider as a side effect.
    fn keys(&self) -> Result<Vec<String>>;

    /// Look up a key, populating first if nothing is cached.
    fn resolve(&self, key: &str) -> Result<Option<FsRef>>;

    /// Repopulate, replacing the current contents wholesale.
    fn reload(&self) -> Result<()>;
}

impl<P: DynamicProvider + ?Sized> DynamicProvider for Arc<P> {
    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn resolve(&self, key: &str) -> Result<Option<FsRef>> {
        (**self).resolve(key)
    }

    fn reload(&self) -> Result<()> {
        (**self).reload()
    }
}

/// The source a [`CachedProvider`] populates from.
pub trait Fetch: Send + Sync {
    fn fetch(&self) -> Result<FsMap>;
}

impl<F> Fetch for F
where
    F: Fn() -> Result<FsMap> + Send + Sync,
{
    fn fetch(&self) -> Result<FsMap> {
        self()
    }
}

/// A lazily populated provider backed by a [`Fetch`].
///
/// The cache is an immutable snapshot swapped in whole, so a reader sees
/// either the previous or the new set of children. An empty snapshot counts
/// as unpopulated and is fetched again on the next access. A failed fetch
/// leaves the previous snapshot in place.
///
/// Fetches run without any lock held. Two callers hitting an unpopulated
/// cache at once may both fetch; the later swap wins.
pub struct CachedProvider<F> {
    fetch: F,
    cache: ArcSwapOption<FsMap>,
}

impl<F: Fetch> CachedProvider<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            cache: ArcSwapOption::empty(),
        }
    }

    fn snapshot(&self) -> Result<Arc<FsMap>> {
        match self.cache.load_full() {
            Some(snapshot) if !snapshot.is_empty() => Ok(snapshot),
            _ => self.populate(),
        }
    }

    fn populate(&self) -> Result<Arc<FsMap>> {
        let fresh = Arc::new(self.fetch.fetch().inspect_err(|e| {
            warn!(error = %e, "provider population failed");
        })?);
        debug!(keys = fresh.len(), "provider populated");
        self.cache.store(Some(fresh.clone()));
        Ok(fresh)
    }
}

impl<F: Fetch> DynamicProvider for CachedProvider<F> {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.keys().cloned().collect())
    }

    fn resolve(&self, key: &str) -> Result<Option<FsRef>> {
        Ok(self.snapshot()?.get(key).cloned())
    }

    fn reload(&self) -> Result<()> {
        self.populate().map(|_| ())
    }
}

/// A provider whose children are added and removed explicitly.
///
/// Every change copies the current snapshot, edits the copy and swaps it
/// in, so readers never block and never see a half-applied change.
pub struct TableProvider {
    table: ArcSwap<FsMap>,
}

impl TableProvider {
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(FsMap::new()),
        }
    }

    /// Add or replace a child. Returns true if `key` was already present.
    pub fn insert(&self, key: &str, fs: FsRef) -> bool {
        let mut replaced = false;
        self.table.rcu(|current| {
            let mut next = FsMap::clone(current);
            replaced = next.insert(key.to_string(), fs.clone()).is_some();
            next
        });
        debug!(key, replaced, "table entry inserted");
        replaced
    }

    /// Remove a child. Returns false if `key` was not present.
    pub fn remove(&self, key: &str) -> bool {
        let mut removed = false;
        self.table.rcu(|current| {
            let mut next = FsMap::clone(current);
            removed = next.remove(key).is_some();
            next
        });
        debug!(key, removed, "table entry removed");
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.load().contains_key(key)
    }
}

impl Default for TableProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicProvider for TableProvider {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.table.load().keys().cloned().collect())
    }

    fn resolve(&self, key: &str) -> Result<Option<FsRef>> {
        Ok(self.table.load().get(key).cloned())
    }

    /// Nothing to fetch; the table only changes through `insert`/`remove`.
    fn reload(&self) -> Result<()> {
        Ok(())
    }
}
