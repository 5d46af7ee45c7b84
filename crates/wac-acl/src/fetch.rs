//! Cached document access for one authorization.

use std::sync::Arc;

use wac_core::graph::turtle;
use wac_core::{Document, DocumentCache, ResourceStore, Result};

/// A store paired with the process-wide document cache.
///
/// Every policy, group and profile document an authorization reads goes
/// through here, so repeated checks within the cache TTL cost no I/O.
#[derive(Clone)]
pub struct PolicyFetcher {
    store: Arc<dyn ResourceStore>,
    cache: DocumentCache,
}

impl PolicyFetcher {
    /// Pair `store` with `cache`.
    pub fn new(store: Arc<dyn ResourceStore>, cache: DocumentCache) -> Self {
        Self { store, cache }
    }

    /// Fetch a policy document.
    ///
    /// # Errors
    ///
    /// Not-found when the document does not exist; any other store error
    /// otherwise.
    pub async fn document(&self, uri: &str) -> Result<Arc<Document>> {
        self.cache.fetch(self.store.as_ref(), uri).await
    }

    /// Fetch a profile or group document.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn graph(&self, uri: &str) -> Result<Arc<Document>> {
        self.cache
            .fetch_graph(self.store.as_ref(), uri, Some(turtle::CONTENT_TYPE))
            .await
    }
}

impl std::fmt::Debug for PolicyFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyFetcher")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
