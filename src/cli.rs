//! Command-line interface definition and argument parsing
//!
//! This module uses clap to define and parse command-line arguments.

use clap::{Parser, Subcommand};
use sessiongate::config::Config;
use std::path::PathBuf;

/// Command-line arguments for sessiongate
#[derive(Parser, Debug)]
#[command(
    name = "sessiongate",
    about = "Manage an authenticated session against a REST API",
    version
)]
pub struct Cli {
    /// Base URL of the authentication API
    #[arg(long)]
    pub api_url: Option<String>,

    /// File used to persist the session token
    #[arg(long)]
    pub token_path: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Log session activity to stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for sessiongate
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account and store the session token
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the user owning the stored session
    Whoami,

    /// Check whether navigating to a path is allowed
    Navigate {
        /// Route path, e.g. `/` or `/login`
        path: String,
    },
}

/// Overlay command-line flags on a configuration loaded from the environment
pub fn apply_cli(cli: &Cli, mut config: Config) -> Config {
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(path) = &cli.token_path {
        config.token_path = path.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    config
}
