//! CLI interface for sessiongate

pub mod commands;
mod output;

pub use output::*;

use crate::auth::{Capability, Role};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sessiongate")]
#[command(author = "Krakaw")]
#[command(version)]
#[command(about = "Inspect and manage the local marketplace session", long_about = None)]
pub struct Cli {
    /// Path to sessiongate.toml (searched upward from the current directory by default)
    #[arg(short, long, global = true, env = "SESSIONGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sessiongate.toml configuration file
    Init,

    /// Start a session, replacing any existing one
    Login {
        /// User identifier to issue tokens for
        #[arg(short, long)]
        subject: String,

        /// Role of the session (seller, worker, admin)
        #[arg(short, long)]
        role: Role,
    },

    /// Show the state of the stored session
    Status {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Check whether the current session grants a capability
    Check {
        /// Capability such as orders:approve or route:/admin
        capability: Capability,
    },

    /// Mint a new access token from the refresh token
    Refresh,

    /// Clear the stored session
    Logout,

    /// List capabilities per role
    Permissions {
        /// Only show this role
        #[arg(short, long)]
        role: Option<Role>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
