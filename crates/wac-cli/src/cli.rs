//! CLI argument parsing and command definitions.

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level arguments for the `wac` command.
#[derive(Parser, Debug)]
#[command(name = "wac", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "WAC_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decide whether an agent may access a resource.
    Check(CheckArgs),

    /// List the candidate policy documents for a resource.
    Chain {
        /// Resource URI.
        uri: String,
    },

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Arguments of `wac check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Resource URI.
    pub uri: String,

    /// WebID of the requesting agent; anonymous when omitted.
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Access mode (read, write, append, control); derived from the method
    /// when omitted.
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Request method.
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Request `Origin` header.
    #[arg(long)]
    pub origin: Option<String>,

    /// Request `On-Behalf-Of` header.
    #[arg(long)]
    pub on_behalf_of: Option<String>,

    /// Request `Slug` header.
    #[arg(long)]
    pub slug: Option<String>,

    /// Print the decision as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Print the effective configuration as TOML.
    Show,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "acl.suffix").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "acl.suffix").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
