//! Configuration for the `wac` command.
//!
//! Provides the [`WacConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `WAC_CONFIG` environment variable
//! 3. XDG default: `~/.config/wac/config.toml`
//! 4. Built-in defaults
//!
//! `WAC_*` environment variables (`WAC_SERVER_URI`, `WAC_ACL_SUFFIX`, ...)
//! are overlaid on whatever the file provides.

use std::path::PathBuf;
use std::time::Duration;

use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use wac_core::traits::{ConfigProvider, DEFAULT_ACL_SUFFIX, DEFAULT_META_SUFFIX};
use wac_core::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "WAC_CONFIG";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the `wac` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WacConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Policy resolution settings.
    pub acl: AclConfig,

    /// The server whose resources are checked.
    pub server: ServerConfig,
}

/// Policy resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Suffix naming policy documents.
    pub suffix: String,

    /// Suffix naming metadata documents.
    pub meta_suffix: String,

    /// Seconds fetched documents stay cached.
    pub cache_ttl_secs: u64,

    /// Check request origins against policies.
    pub strict_origin: bool,

    /// Origins trusted without `acl:origin` statements.
    pub trusted_origins: Vec<String>,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URI; resources on its host are read from `root`.
    pub uri: String,

    /// Pods live under subdomains of `uri`, one directory per host.
    pub multiuser: bool,

    /// Directory holding local resources.
    pub root: Option<String>,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for WacConfig {
    fn default() -> Self {
        Self {
            project_name: "wac".to_string(),
            acl: AclConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_ACL_SUFFIX.to_string(),
            meta_suffix: DEFAULT_META_SUFFIX.to_string(),
            cache_ttl_secs: 10,
            strict_origin: true,
            trusted_origins: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            uri: "https://localhost:8443".to_string(),
            multiuser: false,
            root: None,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl WacConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file or environment cannot be
    /// read or does not deserialize.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("WAC");
        env_opts.add_section("acl");
        env_opts.add_section("server");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("wac").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `WAC_` prefix.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config cannot be converted.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "WAC", &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for WacConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn server_uri(&self) -> &str {
        &self.server.uri
    }

    fn trusted_origins(&self) -> &[String] {
        &self.acl.trusted_origins
    }

    fn data_root(&self) -> Result<PathBuf> {
        match &self.server.root {
            Some(p) => Ok(PathBuf::from(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine data root: {e}"))),
        }
    }

    fn acl_suffix(&self) -> &str {
        &self.acl.suffix
    }

    fn meta_suffix(&self) -> &str {
        &self.acl.meta_suffix
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.acl.cache_ttl_secs)
    }

    fn strict_origin(&self) -> bool {
        self.acl.strict_origin
    }

    fn multiuser(&self) -> bool {
        self.server.multiuser
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
