//! # roster
//!
//! Command-line front end for a remote user list.
//!
//! ## Commands
//!
//! - `init`: Write a `roster.toml` for the data directory
//! - `list`: Fetch and print the user list
//! - `add`: Create a user on the service
//! - `delete`: Delete a user on the service
//! - `copy`: Duplicate a user, remotely or in the local cache only
//! - `status`: Show configuration, cache, and service reachability
//!
//! ## Example
//!
//! ```bash
//! # Point the CLI at a service
//! roster init --base-url http://localhost:3000
//!
//! # Create and list users
//! roster add --set name=Alice --set age=30
//! roster list
//!
//! # Duplicate a user only in the local cache
//! roster copy 1f0c... --local
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{add, copy, delete, init, list, status};

/// Command-line front end for a remote user list.
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the configuration and the cached user list
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Service root URL (overrides roster.toml)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a roster.toml for the data directory
    Init {
        /// Per-request timeout in seconds (0 = none)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Overwrite an existing roster.toml
        #[arg(long)]
        force: bool,
    },

    /// Fetch and print the user list
    List {
        /// Print the records as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Create a user on the service
    Add {
        /// Attribute assignment `name=value`; values parse as JSON, else as text
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = commands::parse_assignment)]
        set: Vec<(String, Value)>,
    },

    /// Delete a user on the service
    Delete {
        /// Key of the user to delete
        key: String,
    },

    /// Duplicate a user under a fresh key
    Copy {
        /// Key of the user to duplicate
        key: String,

        /// Only duplicate in the local cache, without contacting the service
        #[arg(long)]
        local: bool,
    },

    /// Show configuration, cache, and service reachability
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let mut config = config::load(&data_dir)
        .await
        .context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    match cli.command {
        Commands::Init {
            timeout_secs,
            force,
        } => {
            if let Some(secs) = timeout_secs {
                config.request_timeout_secs = secs;
            }
            init::run(&data_dir, &config, force).await?;
        }
        Commands::List { json } => {
            list::run(&data_dir, config, json).await?;
        }
        Commands::Add { set } => {
            add::run(&data_dir, config, set).await?;
        }
        Commands::Delete { key } => {
            delete::run(&data_dir, config, &key).await?;
        }
        Commands::Copy { key, local } => {
            copy::run(&data_dir, config, &key, local).await?;
        }
        Commands::Status => {
            status::run(&data_dir, config).await?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }
}

/// Get the default data directory for roster.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "roster")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
