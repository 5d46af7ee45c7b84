//! Resource store abstraction.
//!
//! The authorization engine never reads storage directly. It asks a
//! [`ResourceStore`] for documents (policies, group lists, profiles) and for
//! the existence of the resource being authorized. A missing document must be
//! reported as [`Error::NotFound`](crate::Error::NotFound) so the policy walk
//! can continue to the next candidate; every other error aborts it.
//!
//! # Modules
//!
//! - [`memory`]: in-memory store for tests and embedding

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::uri::ResourceUri;
use crate::Result;

pub use memory::MemoryStore;

/// A fetched RDF document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier the document was fetched from.
    pub uri: String,
    /// Media type the document was read as, when known.
    pub content_type: Option<String>,
    /// Parsed statements.
    pub graph: Graph,
}

impl Document {
    /// Create a document with no declared media type.
    pub fn new(uri: impl Into<String>, graph: Graph) -> Self {
        Self {
            uri: uri.into(),
            content_type: None,
            graph,
        }
    }

    /// Set the media type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Source of documents and resource metadata.
///
/// Implementations decide whether an identifier is served locally or fetched
/// over the network.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch and parse the document at `uri`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no document exists at `uri`.
    async fn fetch_document(&self, uri: &str) -> Result<Document>;

    /// Fetch a document, preferring the given media type.
    ///
    /// Stores that only know one syntax can rely on the default, which
    /// ignores the preference.
    async fn fetch_graph(&self, uri: &str, content_type: Option<&str>) -> Result<Document> {
        let _ = content_type;
        self.fetch_document(uri).await
    }

    /// Whether a resource exists at `uri`.
    async fn exists(&self, uri: &ResourceUri) -> Result<bool>;

    /// Whether `uri` names an existing container.
    async fn is_container(&self, uri: &ResourceUri) -> Result<bool> {
        Ok(uri.is_container() && self.exists(uri).await?)
    }
}
