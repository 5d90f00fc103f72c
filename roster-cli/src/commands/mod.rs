//! CLI command implementations.

pub mod add;
pub mod copy;
pub mod delete;
pub mod init;
pub mod list;
pub mod status;

use anyhow::{Context, Result};
use roster_client::{ClientConfig, FileSnapshots, HttpUserService, RosterClient, UserRecord};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Start a client backed by the service in `config` and the cache in `data_dir`.
///
/// Waits for the initial fetch. A failed fetch is logged and the cached list
/// stays in place, so commands keep working offline.
pub async fn open(data_dir: &Path, config: ClientConfig) -> Result<RosterClient<HttpUserService>> {
    let service = HttpUserService::with_timeout(&config.base_url, config.request_timeout())
        .with_context(|| format!("Invalid service URL {}", config.base_url))?;
    let snapshots = Arc::new(FileSnapshots::new(data_dir));
    let client = RosterClient::start(config, service, snapshots);

    if let Err(e) = client.ready().await {
        tracing::warn!(
            error = %e,
            base_url = %client.config().base_url,
            "service unavailable, using cached users"
        );
    }
    Ok(client)
}

/// Parse a `name=value` attribute assignment.
///
/// The value is read as JSON when it parses, otherwise taken as a string.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing attribute name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

/// One-line rendering of a record: key, then its attributes as JSON.
pub fn render_user(user: &UserRecord) -> String {
    if user.attributes.is_empty() {
        user.key.to_string()
    } else {
        format!(
            "{}  {}",
            user.key,
            Value::Object(user.attributes.clone())
        )
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignment_parses_json_values() {
        assert_eq!(parse_assignment("age=30").unwrap(), ("age".into(), json!(30)));
        assert_eq!(
            parse_assignment("admin=true").unwrap(),
            ("admin".into(), json!(true))
        );
        assert_eq!(
            parse_assignment("tags=[\"a\",\"b\"]").unwrap(),
            ("tags".into(), json!(["a", "b"]))
        );
    }

    #[test]
    fn assignment_falls_back_to_text() {
        assert_eq!(
            parse_assignment("name=Alice").unwrap(),
            ("name".into(), json!("Alice"))
        );
        assert_eq!(
            parse_assignment("motto=a=b").unwrap(),
            ("motto".into(), json!("a=b"))
        );
        assert_eq!(parse_assignment("empty=").unwrap(), ("empty".into(), json!("")));
    }

    #[test]
    fn assignment_rejects_malformed_input() {
        assert!(parse_assignment("name").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn render_shows_key_and_attributes() {
        let user = UserRecord::bare("a").with("name", "Alice");
        assert_eq!(render_user(&user), r#"a  {"name":"Alice"}"#);
        assert_eq!(render_user(&UserRecord::bare("b")), "b");
    }
}
