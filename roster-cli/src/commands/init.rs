//! Write the CLI configuration.

use anyhow::Result;
use roster_client::{ClientConfig, HttpUserService};
use std::path::Path;

use crate::config;

/// Run the init command.
pub async fn run(data_dir: &Path, config: &ClientConfig, force: bool) -> Result<()> {
    // Check if already initialized
    if config::exists(data_dir) && !force {
        anyhow::bail!(
            "Already initialized. Pass --force or delete {} to reinitialize.",
            config::config_path(data_dir).display()
        );
    }

    // Reject unusable URLs before they are written down
    HttpUserService::new(&config.base_url)?;

    config::save(data_dir, config).await?;

    println!("Configuration written!");
    println!();
    println!("  Service:  {}", config.base_url);
    println!("  Timeout:  {}", describe_timeout(config.request_timeout_secs));
    println!("  Data dir: {}", data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Fetch the user list: roster list");
    println!("  2. Create a user: roster add --set name=<name>");

    Ok(())
}

fn describe_timeout(secs: u64) -> String {
    if secs == 0 {
        "none".to_string()
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn init_writes_config() {
        let dir = tempdir().unwrap();
        let config = ClientConfig::new("http://users.test:8080").with_request_timeout_secs(3);

        run(dir.path(), &config, false).await.unwrap();

        assert!(dir.path().join("roster.toml").exists());
        assert_eq!(config::load(dir.path()).await.unwrap(), config);
    }

    #[tokio::test]
    async fn init_fails_if_already_initialized() {
        let dir = tempdir().unwrap();

        // First init should succeed
        run(dir.path(), &ClientConfig::new("http://one.test"), false)
            .await
            .unwrap();

        // Second init should fail
        let result = run(dir.path(), &ClientConfig::new("http://two.test"), false).await;
        assert!(result.is_err());
        assert_eq!(
            config::load(dir.path()).await.unwrap().base_url,
            "http://one.test"
        );
    }

    #[tokio::test]
    async fn init_force_overwrites() {
        let dir = tempdir().unwrap();
        run(dir.path(), &ClientConfig::new("http://one.test"), false)
            .await
            .unwrap();

        run(dir.path(), &ClientConfig::new("http://two.test"), true)
            .await
            .unwrap();

        assert_eq!(
            config::load(dir.path()).await.unwrap().base_url,
            "http://two.test"
        );
    }

    #[tokio::test]
    async fn init_rejects_invalid_url() {
        let dir = tempdir().unwrap();
        let result = run(dir.path(), &ClientConfig::new("not a url"), false).await;
        assert!(result.is_err());
        assert!(!config::exists(dir.path()));
    }

    #[test]
    fn timeout_description() {
        assert_eq!(describe_timeout(0), "none");
        assert_eq!(describe_timeout(30), "30s");
    }
}
