//! Access modes, agents and request methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wac_core::vocab::acl;
use wac_core::Error;

// ============================================================================
// Access modes
// ============================================================================

/// A WAC access mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessMode {
    /// Read the resource.
    Read,
    /// Replace or delete the resource.
    Write,
    /// Add to the resource without removing anything.
    Append,
    /// Read and change the resource's policy.
    Control,
}

impl AccessMode {
    /// All modes.
    pub const ALL: [AccessMode; 4] = [Self::Read, Self::Write, Self::Append, Self::Control];

    /// IRI of the mode in the ACL vocabulary.
    pub fn iri(self) -> &'static str {
        match self {
            Self::Read => acl::READ,
            Self::Write => acl::WRITE,
            Self::Append => acl::APPEND,
            Self::Control => acl::CONTROL,
        }
    }

    /// Mode named by an IRI, if it is one of the four.
    pub fn from_iri(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.iri() == iri)
    }

    /// Short name, e.g. `Read`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Write => "Write",
            Self::Append => "Append",
            Self::Control => "Control",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = Error;

    /// Accepts a short name in any case, or the full IRI.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mode) = Self::from_iri(s) {
            return Ok(mode);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_data(format!("unknown access mode: {s}")))
    }
}

// ============================================================================
// Agents
// ============================================================================

/// The party a request acts as.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    /// No authenticated identity.
    Anonymous,
    /// An authenticated WebID.
    WebId(String),
}

impl Agent {
    /// Agent for an optional WebID.
    pub fn from_web_id(web_id: Option<&str>) -> Self {
        match web_id {
            Some(id) if !id.is_empty() => Self::WebId(id.to_string()),
            _ => Self::Anonymous,
        }
    }

    /// The WebID, unless anonymous.
    pub fn web_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::WebId(id) => Some(id),
        }
    }

    /// Whether this is the anonymous agent.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::WebId(id) => f.write_str(id),
        }
    }
}

impl From<&str> for Agent {
    fn from(web_id: &str) -> Self {
        Self::from_web_id(Some(web_id))
    }
}

// ============================================================================
// Methods
// ============================================================================

/// HTTP-style request method, as far as authorization cares.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `COPY`
    Copy,
    /// `DELETE`
    Delete,
    /// Any other method, upper-cased.
    Other(String),
}

impl Method {
    /// Whether the method may create the target resource.
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Put | Self::Patch | Self::Copy)
    }

    /// Whether the method deletes the target resource.
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }

    /// Upper-case method name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Copy => "COPY",
            Self::Delete => "DELETE",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "COPY" => Self::Copy,
            "DELETE" => Self::Delete,
            "" => return Err(Error::invalid_data("empty method")),
            _ => Self::Other(upper),
        })
    }
}

/// Modes a handler checks for `method`, in the order it checks them.
///
/// `PUT` and `PATCH` check `Append` first and then `Write` when the target
/// already exists; `OPTIONS` needs nothing.
pub fn required_modes(method: &Method) -> &'static [AccessMode] {
    match method {
        Method::Get | Method::Head => &[AccessMode::Read],
        Method::Put | Method::Patch => &[AccessMode::Append, AccessMode::Write],
        Method::Post => &[AccessMode::Append],
        Method::Copy | Method::Delete => &[AccessMode::Write],
        Method::Options | Method::Other(_) => &[],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_iri_roundtrip() {
        for mode in AccessMode::ALL {
            assert_eq!(AccessMode::from_iri(mode.iri()), Some(mode));
        }
        assert_eq!(AccessMode::from_iri("http://example.org/Other"), None);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("read".parse::<AccessMode>().unwrap(), AccessMode::Read);
        assert_eq!("CONTROL".parse::<AccessMode>().unwrap(), AccessMode::Control);
        assert_eq!(acl::APPEND.parse::<AccessMode>().unwrap(), AccessMode::Append);
        assert!("Delete".parse::<AccessMode>().is_err());
    }

    #[test]
    fn test_agent() {
        assert!(Agent::from_web_id(None).is_anonymous());
        assert!(Agent::from_web_id(Some("")).is_anonymous());
        let alice = Agent::from("https://alice.example/#me");
        assert_eq!(alice.web_id(), Some("https://alice.example/#me"));
        assert_eq!(alice.to_string(), "https://alice.example/#me");
        assert_eq!(Agent::Anonymous.to_string(), "anonymous");
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::Delete);
        assert_eq!(
            "propfind".parse::<Method>().unwrap(),
            Method::Other("PROPFIND".into())
        );
        assert!("".parse::<Method>().is_err());
    }

    #[test]
    fn test_method_classes() {
        assert!(Method::Put.is_create());
        assert!(Method::Patch.is_create());
        assert!(Method::Copy.is_create());
        assert!(!Method::Post.is_create());
        assert!(Method::Delete.is_delete());
    }

    #[test]
    fn test_required_modes() {
        assert_eq!(required_modes(&Method::Get), [AccessMode::Read]);
        assert_eq!(required_modes(&Method::Head), [AccessMode::Read]);
        assert_eq!(
            required_modes(&Method::Put),
            [AccessMode::Append, AccessMode::Write]
        );
        assert_eq!(required_modes(&Method::Post), [AccessMode::Append]);
        assert_eq!(required_modes(&Method::Copy), [AccessMode::Write]);
        assert_eq!(required_modes(&Method::Delete), [AccessMode::Write]);
        assert!(required_modes(&Method::Options).is_empty());
    }
}
