//! Hierarchical resource identifiers.
//!
//! A [`ResourceUri`] is an absolute `scheme://authority/path` identifier. A
//! trailing `/` marks a container. The authority root (`scheme://host[:port]/`)
//! is the upper bound of every ancestor walk: [`ResourceUri::parent`] returns
//! `None` there, so [`ResourceUri::ancestors`] cannot step past it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// An absolute, hierarchical resource identifier.
///
/// Query strings and fragments are dropped on parse; authorization applies
/// to the resource, not to a representation or a fragment of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceUri {
    raw: String,
    root_len: usize,
}

impl ResourceUri {
    /// Parse an absolute URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`] when the input is not absolute or has no
    /// host.
    ///
    /// # Example
    ///
    /// ```
    /// use wac_core::ResourceUri;
    ///
    /// let uri = ResourceUri::parse("https://pod.example/a/b/c.ttl").unwrap();
    /// assert_eq!(uri.root(), "https://pod.example/");
    /// assert!(!uri.is_container());
    /// ```
    pub fn parse(uri: &str) -> Result<Self> {
        let parsed = Url::parse(uri).map_err(|e| Error::invalid_uri(format!("{uri}: {e}")))?;
        if !parsed.has_host() {
            return Err(Error::invalid_uri(format!("{uri}: missing host")));
        }

        let without_fragment = uri.split(['?', '#']).next().unwrap_or(uri);
        let authority_start = without_fragment
            .find("://")
            .map(|i| i + 3)
            .ok_or_else(|| Error::invalid_uri(format!("{uri}: not hierarchical")))?;

        let (raw, root_len) = match without_fragment[authority_start..].find('/') {
            Some(i) => (without_fragment.to_string(), authority_start + i + 1),
            None => (format!("{without_fragment}/"), without_fragment.len() + 1),
        };

        Ok(Self { raw, root_len })
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The authority root, `scheme://host[:port]/`.
    pub fn root(&self) -> &str {
        &self.raw[..self.root_len]
    }

    /// The web origin, `scheme://host[:port]` (no trailing slash).
    pub fn origin(&self) -> &str {
        &self.raw[..self.root_len - 1]
    }

    /// The path below the root, without its leading `/`.
    pub fn path(&self) -> &str {
        &self.raw[self.root_len..]
    }

    /// Host name of the authority.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.raw)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Whether this identifies a container.
    pub fn is_container(&self) -> bool {
        self.raw.ends_with('/')
    }

    /// Whether this is the authority root itself.
    pub fn is_root(&self) -> bool {
        self.raw.len() == self.root_len
    }

    /// The container holding this resource, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let path = self.path().trim_end_matches('/');
        let cut = match path.rfind('/') {
            Some(i) => self.root_len + i + 1,
            None => self.root_len,
        };
        Some(Self {
            raw: self.raw[..cut].to_string(),
            root_len: self.root_len,
        })
    }

    /// This resource if it is a container, otherwise its parent.
    pub fn container(&self) -> Self {
        if self.is_container() {
            self.clone()
        } else {
            self.parent().unwrap_or_else(|| self.clone())
        }
    }

    /// Every ancestor container, nearest first, ending with the root.
    ///
    /// The root yields an empty sequence.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Whether the identifier ends with `suffix`.
    pub fn has_suffix(&self, suffix: &str) -> bool {
        !suffix.is_empty() && self.path().ends_with(suffix)
    }

    /// The identifier with `suffix` appended.
    ///
    /// `suffix` is taken as a plain path segment tail.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self {
            raw: format!("{}{suffix}", self.raw),
            root_len: self.root_len,
        }
    }

    /// The resource named by removing `suffix`, if the identifier carries it.
    ///
    /// `https://h/a/.acl` strips to the container `https://h/a/`.
    pub fn strip_suffix(&self, suffix: &str) -> Option<Self> {
        if !self.has_suffix(suffix) {
            return None;
        }
        Some(Self {
            raw: self.raw[..self.raw.len() - suffix.len()].to_string(),
            root_len: self.root_len,
        })
    }

    /// Whether `other` lives under this container (or is this resource).
    pub fn contains(&self, other: &ResourceUri) -> bool {
        self.is_container() && other.raw.starts_with(&self.raw)
    }
}

/// Iterator over the ancestor containers of a [`ResourceUri`].
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<ResourceUri>,
}

impl Iterator for Ancestors {
    type Item = ResourceUri;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for ResourceUri {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl FromStr for ResourceUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceUri {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ResourceUri> for String {
    fn from(uri: ResourceUri) -> Self {
        uri.raw
    }
}

/// Strip the fragment from an IRI, leaving the document it lives in.
pub fn document_of(iri: &str) -> &str {
    iri.split('#').next().unwrap_or(iri)
}
