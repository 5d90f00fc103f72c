//! Show configuration, cache, and service reachability.

use anyhow::Result;
use roster_client::persist::load_collection;
use roster_client::{ClientConfig, FileSnapshots, HttpUserService, UserService};
use std::path::Path;

use crate::config;

/// Run the status command.
pub async fn run(data_dir: &Path, config: ClientConfig) -> Result<()> {
    println!("=== roster status ===");
    println!();

    println!("Configuration:");
    println!("  Data dir: {}", data_dir.display());
    if config::exists(data_dir) {
        println!("  File:     {}", config::config_path(data_dir).display());
    } else {
        println!("  File:     none (defaults)");
    }
    let service = HttpUserService::with_timeout(&config.base_url, config.request_timeout())?;
    println!("  Service:  {}", service.base_url());
    println!();

    // Cache
    let snapshots = FileSnapshots::new(data_dir);
    println!("Cache:");
    println!("  Path:   {}", snapshots.path_for(&config.snapshot_key).display());
    match load_collection(&snapshots, &config.snapshot_key) {
        Ok(Some(collection)) => println!("  Users:  {}", collection.len()),
        Ok(None) => println!("  Users:  none cached"),
        Err(e) => println!("  Users:  unreadable ({})", e),
    }
    println!();

    // Service
    println!("Service:");
    match service.list_users().await {
        Ok(users) => {
            println!("  Status: ONLINE");
            println!("  Users:  {}", users.len());
        }
        Err(e) => {
            println!("  Status: OFFLINE");
            println!("  Error:  {}", e);
        }
    }

    Ok(())
}
