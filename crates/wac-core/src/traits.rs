//! Core traits for WAC configuration.
//!
//! These traits define the extension points that server applications implement
//! to customise the authorization engine. The primary trait is [`ConfigProvider`],
//! which abstracts deployment-specific configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::Result;

/// Suffix naming the companion policy document of a resource.
pub const DEFAULT_ACL_SUFFIX: &str = ".acl";

/// Suffix naming the companion metadata document of a resource.
pub const DEFAULT_META_SUFFIX: &str = ".meta";

/// How long fetched policy documents stay cached.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);

/// Trait for deployment-specific configuration.
///
/// Every server built on the WAC crates implements this trait to provide the
/// settings the engine needs: the ACL suffix, cache lifetime, origin policy
/// and where local resources live.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use wac_core::traits::ConfigProvider;
/// use wac_core::Result;
///
/// #[derive(Clone)]
/// struct PodConfig {
///     root: PathBuf,
///     trusted: Vec<String>,
/// }
///
/// impl ConfigProvider for PodConfig {
///     fn project_name(&self) -> &str {
///         "pod"
///     }
///
///     fn server_uri(&self) -> &str {
///         "https://pod.example"
///     }
///
///     fn trusted_origins(&self) -> &[String] {
///         &self.trusted
///     }
///
///     fn data_root(&self) -> Result<PathBuf> {
///         Ok(self.root.clone())
///     }
/// }
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for env var prefixes and default paths.
    fn project_name(&self) -> &str;

    /// Base URI of this server; resources on its host are read locally.
    fn server_uri(&self) -> &str;

    /// Origins trusted regardless of policy `acl:origin` statements.
    fn trusted_origins(&self) -> &[String];

    /// Directory holding local resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn data_root(&self) -> Result<PathBuf>;

    /// Suffix appended to a resource identifier to name its policy document.
    fn acl_suffix(&self) -> &str {
        DEFAULT_ACL_SUFFIX
    }

    /// Suffix appended to a resource identifier to name its metadata document.
    fn meta_suffix(&self) -> &str {
        DEFAULT_META_SUFFIX
    }

    /// Time-to-live of cached policy, group and profile documents.
    fn cache_ttl(&self) -> Duration {
        DEFAULT_CACHE_TTL
    }

    /// Whether request `Origin` headers are checked against policies.
    fn strict_origin(&self) -> bool {
        true
    }

    /// Whether the server hosts several pods under subdomains of `server_uri`.
    fn multiuser(&self) -> bool {
        false
    }
}
