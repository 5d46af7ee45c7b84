//! The `wac` application.
//!
//! Wires configuration, logging, the shared application state and the
//! local-or-remote store into command dispatch.

use std::io::Write;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wac_core::{AppState, ConfigProvider, ResourceStore, Result};

use crate::acl_handlers;
use crate::cli::{CliArgs, Command};
use crate::config::WacConfig;
use crate::config_handlers;
use crate::store::FsStore;

// ============================================================================
// WacCli
// ============================================================================

/// CLI application parameterized over a config provider.
pub struct WacCli<C: ConfigProvider> {
    name: String,
    version: String,
    state: AppState<C>,
    store: Arc<dyn ResourceStore>,
}

impl WacCli<WacConfig> {
    /// Create from CLI args, loading config from file/env.
    ///
    /// # Errors
    ///
    /// Configuration errors, or a data root that cannot be determined.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = WacConfig::load(args.config.as_deref())?;
        let store = FsStore::from_config(&config)?;
        Ok(Self::new(name, config, Arc::new(store)))
    }
}

impl<C: ConfigProvider> WacCli<C> {
    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: C, store: Arc<dyn ResourceStore>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            state: AppState::new(config),
            store,
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Get a reference to the config provider.
    pub fn config(&self) -> &C {
        self.state.config()
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
    /// Library crates log through `log`; the subscriber picks those records up.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments, writing results to `out`.
    ///
    /// Returns whether the command succeeded; a denied `check` is `false`.
    ///
    /// # Errors
    ///
    /// Configuration, resolution and I/O failures.
    pub async fn run(&self, args: CliArgs, out: &mut impl Write) -> Result<bool> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(Command::Check(check)) => {
                tracing::debug!(uri = %check.uri, method = %check.method, "checking access");
                let report =
                    acl_handlers::check(&self.state, Arc::clone(&self.store), &check).await?;
                acl_handlers::print_report(&report, check.json, out)?;
                Ok(report.granted)
            }
            Some(Command::Chain { uri }) => {
                acl_handlers::chain(&uri, self.config().acl_suffix(), out)?;
                Ok(true)
            }
            Some(Command::Version) => {
                writeln!(out, "{} {}", self.name, self.version)?;
                Ok(true)
            }
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(
                    args.config.as_deref(),
                    config_cmd.command,
                    out,
                )?;
                Ok(true)
            }
            None => {
                writeln!(out, "{} {}: use --help for usage", self.name, self.version)?;
                Ok(true)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
