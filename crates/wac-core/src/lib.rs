//! WAC Core: shared types, traits, errors and document access.
//!
//! This crate provides the foundational types used by the authorization
//! engine. It has no internal WAC dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`uri`]: Hierarchical resource identifiers
//! - [`graph`]: In-memory RDF graphs with N-Triples and Turtle readers
//! - [`vocab`]: Access control vocabulary
//! - [`store`]: Document and resource store abstraction
//! - [`cache`]: Time-bounded, coalescing document cache
//! - [`state`]: Generic application state container
//! - [`traits`]: Configuration provider trait

#![doc = include_str!("../README.md")]

pub mod cache;
pub mod error;
pub mod graph;
pub mod state;
pub mod store;
pub mod traits;
pub mod uri;
pub mod vocab;

// Re-export key types at crate root for convenience
pub use cache::DocumentCache;
pub use error::{Error, Result};
pub use graph::{Graph, Literal, Term, Triple};
pub use state::AppState;
pub use store::{Document, MemoryStore, ResourceStore};
pub use traits::ConfigProvider;
pub use uri::ResourceUri;
