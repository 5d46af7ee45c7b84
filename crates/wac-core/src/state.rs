//! Application state management.
//!
//! Provides [`AppState<C>`], a thread-safe container for the state shared by
//! every authorization check: the configuration and the document cache.
//!
//! # Example
//!
//! ```
//! use std::path::PathBuf;
//! use wac_core::{AppState, ConfigProvider, Result};
//!
//! #[derive(Clone)]
//! struct PodConfig {
//!     trusted: Vec<String>,
//! }
//!
//! impl ConfigProvider for PodConfig {
//!     fn project_name(&self) -> &str { "pod" }
//!     fn server_uri(&self) -> &str { "https://pod.example" }
//!     fn trusted_origins(&self) -> &[String] { &self.trusted }
//!     fn data_root(&self) -> Result<PathBuf> { Ok(PathBuf::from("/srv/pod")) }
//! }
//!
//! let state = AppState::new(PodConfig { trusted: vec![] });
//! assert_eq!(state.project_name(), "pod");
//! assert_eq!(state.cache().ttl(), state.config().cache_ttl());
//! ```

use std::sync::Arc;

use crate::cache::DocumentCache;
use crate::traits::ConfigProvider;

/// Thread-safe shared application state.
///
/// Generic over `C: ConfigProvider`. Cloning is cheap: the configuration
/// sits behind an `Arc` and the cache shares its entries between clones.
#[derive(Debug)]
pub struct AppState<C: ConfigProvider> {
    config: Arc<C>,
    cache: DocumentCache,
}

impl<C: ConfigProvider> AppState<C> {
    /// Create state with a cache sized from the configuration's TTL.
    pub fn new(config: C) -> Self {
        let cache = DocumentCache::new(config.cache_ttl());
        Self {
            config: Arc::new(config),
            cache,
        }
    }

    /// Create state from an existing Arc-wrapped configuration.
    pub fn from_arc(config: Arc<C>) -> Self {
        let cache = DocumentCache::new(config.cache_ttl());
        Self { config, cache }
    }

    /// Replace the document cache, e.g. to share one between servers.
    pub fn with_cache(mut self, cache: DocumentCache) -> Self {
        self.cache = cache;
        self
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Get a cloneable handle to the configuration.
    pub fn config_arc(&self) -> Arc<C> {
        Arc::clone(&self.config)
    }

    /// The shared document cache.
    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Get the project name from the configuration.
    pub fn project_name(&self) -> &str {
        self.config.project_name()
    }
}

impl<C: ConfigProvider> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            cache: self.cache.clone(),
        }
    }
}
