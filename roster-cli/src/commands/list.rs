//! Fetch and print the user list.

use anyhow::Result;
use roster_client::ClientConfig;
use std::path::Path;

use super::{open, render_user};

/// Run the list command.
///
/// Prints the cached list when the service cannot be reached.
pub async fn run(data_dir: &Path, config: ClientConfig, json: bool) -> Result<()> {
    let client = open(data_dir, config).await?;
    let users = client.store().users();

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }
    for user in &users {
        println!("{}", render_user(user));
    }
    println!();
    println!("{} user(s)", users.len());

    Ok(())
}
