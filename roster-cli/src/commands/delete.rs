//! Delete a user on the service.

use anyhow::Result;
use roster_client::{ClientConfig, UserKey};
use std::path::Path;

use super::open;

/// Run the delete command.
pub async fn run(data_dir: &Path, config: ClientConfig, key: &str) -> Result<()> {
    let client = open(data_dir, config).await?;
    let key = UserKey::from(key);

    client.delete_remote(&key).await?;

    println!("Deleted {}", key);
    println!("{} user(s) remaining", client.store().len());
    Ok(())
}
