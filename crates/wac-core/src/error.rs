//! Error types for WAC operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all WAC crates. Uses `thiserror` for derive macros.
//!
//! Business outcomes (access denied, authentication required) are *not*
//! errors: they are captured as decisions by the authorization engine. The
//! variants here are the failures that abort a resolution, plus the
//! `NotFound` control-flow signal that advances the ACL walk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur in WAC operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document or resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A document could not be parsed into a graph.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A URI could not be interpreted as an absolute resource identifier.
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// Transport failure while fetching a document.
    #[error("Failed to fetch {uri}: {message}")]
    Fetch {
        /// Document being fetched.
        uri: String,
        /// Failure description.
        message: String,
    },

    /// No policy document exists anywhere up to the authority root.
    #[error("No ACL found for {resource}, searched in:\n- {}", searched.join("\n- "))]
    ResolutionExhausted {
        /// Resource being authorized.
        resource: String,
        /// Every candidate that was probed, nearest first.
        searched: Vec<String>,
    },

    /// An `On-Behalf-Of` claim arrived without an authenticated secretary.
    #[error("Invalid delegation request: {0}")]
    InvalidDelegation(String),

    /// A creation request names an auxiliary resource.
    #[error("Invalid creation name: {0}")]
    InvalidCreationName(String),

    /// An error shared between coalesced callers.
    #[error(transparent)]
    Shared(Arc<Error>),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid URI error.
    pub fn invalid_uri(msg: impl Into<String>) -> Self {
        Self::InvalidUri(msg.into())
    }

    /// Create a fetch error for `uri`.
    pub fn fetch(uri: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            uri: uri.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid delegation error.
    pub fn invalid_delegation(msg: impl Into<String>) -> Self {
        Self::InvalidDelegation(msg.into())
    }

    /// Create an invalid creation name error.
    pub fn invalid_creation_name(msg: impl Into<String>) -> Self {
        Self::InvalidCreationName(msg.into())
    }

    /// Wrap an I/O error together with the path that produced it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error means "the document does not exist".
    ///
    /// Looks through shared errors, and treats I/O `NotFound` the same way
    /// so stores can propagate filesystem errors with `?`.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) | Self::IoWithPath { source: e, .. } => {
                e.kind() == std::io::ErrorKind::NotFound
            }
            Self::Shared(inner) => inner.is_not_found(),
            _ => false,
        }
    }

    /// HTTP status a request handler should answer with for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::Shared(inner) => inner.status(),
            _ if self.is_not_found() => 404,
            Self::InvalidUri(_) | Self::InvalidDelegation(_) | Self::InvalidCreationName(_) => 400,
            _ => 500,
        }
    }
}

impl From<Arc<Error>> for Error {
    fn from(shared: Arc<Error>) -> Self {
        match Arc::try_unwrap(shared) {
            Ok(error) => error,
            Err(shared) => Self::Shared(shared),
        }
    }
}

/// Result type alias using the WAC Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_found() {
        assert!(Error::not_found("x").is_not_found());
        assert_eq!(Error::not_found("x").status(), 404);
    }

    #[test]
    fn test_io_not_found_is_not_found() {
        let err = Error::io_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/tmp/x",
        );
        assert!(err.is_not_found());

        let err: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no").into();
        assert!(!err.is_not_found());
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_shared_looks_through() {
        let shared = Arc::new(Error::not_found("a"));
        let _other = Arc::clone(&shared);
        let err = Error::from(shared);
        assert!(matches!(err, Error::Shared(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_unique_arc_unwraps() {
        let err = Error::from(Arc::new(Error::parse("bad")));
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::invalid_delegation("x").status(), 400);
        assert_eq!(Error::invalid_creation_name("x.acl").status(), 400);
        assert_eq!(Error::fetch("https://a/", "timeout").status(), 500);
        let exhausted = Error::ResolutionExhausted {
            resource: "https://a/b".into(),
            searched: vec!["https://a/b.acl".into(), "https://a/.acl".into()],
        };
        assert_eq!(exhausted.status(), 500);
        let message = exhausted.to_string();
        assert!(message.contains("- https://a/b.acl"));
        assert!(message.contains("- https://a/.acl"));
    }
}
