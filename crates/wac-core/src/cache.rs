//! Time-bounded document cache.
//!
//! Policy, group and profile documents are fetched far more often than they
//! change, so [`DocumentCache`] keeps them for a short time-to-live. Concurrent
//! misses for the same identifier share one fetch. Failed fetches are not
//! cached: the next request retries.
//!
//! Writers must call [`DocumentCache::invalidate`] after changing a document
//! so later checks do not see a stale policy.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::store::{Document, ResourceStore};
use crate::{Error, Result};

/// Shared cache of fetched documents, keyed by identifier.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Clone)]
pub struct DocumentCache {
    entries: Cache<String, Arc<Document>>,
    ttl: Duration,
}

impl DocumentCache {
    /// Create a cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder().time_to_live(ttl).build();
        Self { entries, ttl }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached document for `uri`, or run `fetch` to load it.
    ///
    /// Concurrent callers for the same `uri` wait on a single `fetch`.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `fetch`. Errors are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, uri: &str, fetch: F) -> Result<Arc<Document>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Document>>,
    {
        self.entries
            .try_get_with(uri.to_string(), async move { fetch().await.map(Arc::new) })
            .await
            .map_err(Error::from)
    }

    /// Fetch a document through `store`, using the cache.
    ///
    /// # Errors
    ///
    /// Propagates store errors, including not-found.
    pub async fn fetch(&self, store: &dyn ResourceStore, uri: &str) -> Result<Arc<Document>> {
        self.get_or_fetch(uri, || store.fetch_document(uri)).await
    }

    /// Fetch a document with a media-type preference, using the cache.
    ///
    /// # Errors
    ///
    /// Propagates store errors, including not-found.
    pub async fn fetch_graph(
        &self,
        store: &dyn ResourceStore,
        uri: &str,
        content_type: Option<&str>,
    ) -> Result<Arc<Document>> {
        self.get_or_fetch(uri, || store.fetch_graph(uri, content_type))
            .await
    }

    /// Drop the entry for `uri`, or every entry when `uri` is `None`.
    pub async fn invalidate(&self, uri: Option<&str>) {
        match uri {
            Some(uri) => {
                log::debug!("Invalidating cached document {uri}");
                self.entries.invalidate(uri).await;
            }
            None => {
                log::debug!("Invalidating all cached documents");
                self.entries.invalidate_all();
            }
        }
    }

    /// Whether a live entry exists for `uri`.
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(crate::traits::DEFAULT_CACHE_TTL)
    }
}

impl std::fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
