//! Create a user on the service.

use anyhow::Result;
use roster_client::{ClientConfig, UserDraft};
use serde_json::Value;
use std::path::Path;

use super::{open, render_user};

/// Build the request body from `--set` assignments. Later assignments win.
pub fn draft_from(assignments: Vec<(String, Value)>) -> UserDraft {
    assignments
        .into_iter()
        .fold(UserDraft::new(), |draft, (name, value)| draft.with(&name, value))
}

/// Run the add command.
pub async fn run(data_dir: &Path, config: ClientConfig, set: Vec<(String, Value)>) -> Result<()> {
    let client = open(data_dir, config).await?;
    let created = client.add_remote(&draft_from(set)).await?;

    println!("Added {}", render_user(&created));
    Ok(())
}
