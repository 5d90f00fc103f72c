//! Duplicate a user under a fresh key.

use anyhow::{Context, Result};
use roster_client::{ClientConfig, UserKey};
use std::path::Path;

use super::{open, render_user};

/// Run the copy command.
///
/// With `local`, the duplicate only exists in the cached list and gets a
/// locally generated key. Otherwise the service creates it and assigns the key.
pub async fn run(data_dir: &Path, config: ClientConfig, key: &str, local: bool) -> Result<()> {
    let client = open(data_dir, config).await?;
    let key = UserKey::from(key);

    if local {
        let new_key = client.store().copy(&key)?;
        println!("Copied {} to {} (local only)", key, new_key);
        return Ok(());
    }

    let source = client
        .store()
        .get(&key)
        .with_context(|| format!("User {} not found", key))?;
    let created = client.copy_remote(&source.to_draft()).await?;

    println!("Copied {} to {}", key, render_user(&created));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{offline_config, read_cache, seed_cache};
    use roster_client::UserRecord;
    use tempfile::tempdir;

    #[tokio::test]
    async fn local_copy_updates_cache() {
        let dir = tempdir().unwrap();
        let alice = UserRecord::bare("a").with("name", "Alice");
        seed_cache(dir.path(), vec![alice.clone()]);

        run(dir.path(), offline_config(), "a", true).await.unwrap();

        let cached = read_cache(dir.path());
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0], alice);
        assert_ne!(cached[1].key, alice.key);
        assert_eq!(cached[1].attributes, alice.attributes);
    }

    #[tokio::test]
    async fn local_copy_of_missing_user_fails() {
        let dir = tempdir().unwrap();
        seed_cache(dir.path(), vec![UserRecord::bare("a")]);

        let result = run(dir.path(), offline_config(), "ghost", true).await;

        assert!(result.is_err());
        assert_eq!(read_cache(dir.path()), vec![UserRecord::bare("a")]);
    }

    #[tokio::test]
    async fn remote_copy_offline_fails() {
        let dir = tempdir().unwrap();
        seed_cache(dir.path(), vec![UserRecord::bare("a")]);

        let result = run(dir.path(), offline_config(), "a", false).await;

        assert!(result.is_err());
        assert_eq!(read_cache(dir.path()), vec![UserRecord::bare("a")]);
    }
}
