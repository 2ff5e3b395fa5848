//! CLI interface for crms-auth

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crms-auth")]
#[command(version)]
#[command(about = "CRMS authentication service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default crms-auth.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON file with the identities to serve
        #[arg(short, long, env = "CRMS_USERS_FILE")]
        users: Option<PathBuf>,
    },

    /// Print a bcrypt hash for a password, for use in the identities file.
    /// Prompts on a terminal, otherwise reads one line from stdin.
    HashPassword {
        /// Take the password from this variable instead of prompting
        #[arg(long, value_name = "VAR")]
        from_env: Option<String>,

        /// bcrypt cost factor
        #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
        cost: u32,
    },

    /// Load and validate the configuration, then print the effective settings
    CheckConfig {
        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
