//! Command-line front end for WAC authorization.
//!
//! The `wac` binary loads configuration, reads policies from a local data
//! root (or over HTTP for other hosts) and reports authorization decisions.
//!
//! # Modules
//!
//! - [`cli`]: Argument parsing
//! - [`config`]: `WacConfig`, loaded with `confyg`
//! - [`store`]: Local-or-remote resource store
//! - [`app`]: Logging setup and command dispatch
//! - [`acl_handlers`]: `check` and `chain`
//! - [`config_handlers`]: `config` subcommands

#![doc = include_str!("../README.md")]

pub mod acl_handlers;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod store;

pub use app::WacCli;
pub use cli::CliArgs;
pub use config::WacConfig;
pub use store::FsStore;
