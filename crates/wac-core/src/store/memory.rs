//! In-memory resource store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Document, ResourceStore};
use crate::graph::{ntriples, Graph};
use crate::uri::ResourceUri;
use crate::{Error, Result};

/// A [`ResourceStore`] backed by hash maps.
///
/// Documents and plain resources are registered up front. Failures can be
/// injected per identifier, and every fetch is counted so callers can
/// assert on caching behaviour.
///
/// Cloning is cheap; clones share the same contents.
///
/// # Example
///
/// ```
/// use wac_core::{Graph, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.insert_document("https://pod.example/.acl", Graph::new());
/// store.add_resource("https://pod.example/notes.ttl");
/// assert_eq!(store.fetch_count("https://pod.example/.acl"), 0);
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    documents: HashMap<String, Graph>,
    resources: HashSet<String>,
    failures: HashMap<String, String>,
    fetches: HashMap<String, usize>,
    latency: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.inner.write().latency = Some(latency);
        self
    }

    /// Register a document. The document also counts as an existing resource.
    pub fn insert_document(&self, uri: impl Into<String>, graph: Graph) {
        let uri = uri.into();
        let mut inner = self.inner.write();
        inner.resources.insert(uri.clone());
        inner.documents.insert(uri, graph);
    }

    /// Register a document written in N-Triples, resolved against its own URI.
    ///
    /// # Errors
    ///
    /// Returns a parse error if `source` is not valid N-Triples.
    pub fn insert_ntriples(&self, uri: impl Into<String>, source: &str) -> Result<()> {
        let uri = uri.into();
        let graph = ntriples::parse(source, Some(&uri))?;
        self.insert_document(uri, graph);
        Ok(())
    }

    /// Remove a document and its resource entry.
    pub fn remove_document(&self, uri: &str) {
        let mut inner = self.inner.write();
        inner.documents.remove(uri);
        inner.resources.remove(uri);
    }

    /// Register a resource that exists but is not an RDF document.
    pub fn add_resource(&self, uri: impl Into<String>) {
        self.inner.write().resources.insert(uri.into());
    }

    /// Make every fetch of `uri` fail with a transport error.
    pub fn fail_with(&self, uri: impl Into<String>, message: impl Into<String>) {
        self.inner.write().failures.insert(uri.into(), message.into());
    }

    /// Number of fetches made for `uri`.
    pub fn fetch_count(&self, uri: &str) -> usize {
        self.inner.read().fetches.get(uri).copied().unwrap_or(0)
    }

    /// Number of fetches made for any identifier.
    pub fn total_fetches(&self) -> usize {
        self.inner.read().fetches.values().sum()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn fetch_document(&self, uri: &str) -> Result<Document> {
        let latency = {
            let mut inner = self.inner.write();
            *inner.fetches.entry(uri.to_string()).or_insert(0) += 1;
            inner.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let inner = self.inner.read();
        if let Some(message) = inner.failures.get(uri) {
            return Err(Error::fetch(uri, message.clone()));
        }
        inner
            .documents
            .get(uri)
            .map(|graph| {
                Document::new(uri, graph.clone()).with_content_type(ntriples::CONTENT_TYPE)
            })
            .ok_or_else(|| Error::not_found(uri))
    }

    async fn exists(&self, uri: &ResourceUri) -> Result<bool> {
        Ok(self.inner.read().resources.contains(uri.as_str()))
    }
}
