//! HTTP implementation of [`UserService`] over `/api/users`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Response, Url};
use roster_types::{UserDraft, UserKey, UserRecord};
use std::time::Duration;

use super::{ServiceError, UserService};

/// Path segments of the collection endpoint, relative to the base URL.
const USERS_PATH: [&str; 2] = ["api", "users"];

/// Client for the user service HTTP API.
#[derive(Debug, Clone)]
pub struct HttpUserService {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpUserService {
    /// Create a client for the service rooted at `base_url`, with no request
    /// timeout.
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client whose requests fail with [`ServiceError::Timeout`]
    /// after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { base_url, http })
    }

    /// The base URL this client was built with.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// URL of the collection endpoint.
    pub fn users_url(&self) -> Url {
        self.url_with(&[])
    }

    /// URL of a single record. The key is percent-encoded as one segment.
    pub fn user_url(&self, key: &UserKey) -> Url {
        self.url_with(&[key.as_str()])
    }

    fn url_with(&self, extra: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(USERS_PATH).extend(extra);
        }
        url
    }
}

/// Turn a non-success response into [`ServiceError::Status`].
async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl UserService for HttpUserService {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ServiceError> {
        let url = self.users_url();
        tracing::debug!(%url, "GET users");
        let response = check_status(self.http.get(url).send().await?).await?;
        let users: Vec<UserRecord> = response.json().await?;
        Ok(users)
    }

    async fn delete_user(&self, key: &UserKey) -> Result<(), ServiceError> {
        let url = self.user_url(key);
        tracing::debug!(%url, "DELETE user");
        check_status(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord, ServiceError> {
        let url = self.users_url();
        tracing::debug!(%url, "POST user");
        let response = check_status(self.http.post(url).json(draft).send().await?).await?;
        let user: UserRecord = response.json().await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_url_from_bare_host() {
        let service = HttpUserService::new("http://localhost:3000").unwrap();
        assert_eq!(
            service.users_url().as_str(),
            "http://localhost:3000/api/users"
        );
    }

    #[test]
    fn users_url_keeps_base_path() {
        let service = HttpUserService::new("https://example.com/tenant/").unwrap();
        assert_eq!(
            service.users_url().as_str(),
            "https://example.com/tenant/api/users"
        );
    }

    #[test]
    fn user_url_encodes_key() {
        let service = HttpUserService::new("http://localhost:3000").unwrap();
        let url = service.user_url(&UserKey::from("a b/c"));
        assert_eq!(url.as_str(), "http://localhost:3000/api/users/a%20b%2Fc");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpUserService::new("not a url"),
            Err(ServiceError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpUserService::new("mailto:someone@example.com"),
            Err(ServiceError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_connection_failure() {
        // Port 9 (discard) on loopback is closed on any sane test host.
        let service = HttpUserService::new("http://127.0.0.1:9").unwrap();
        let result = service.list_users().await;
        assert!(matches!(result, Err(ServiceError::ConnectionFailed(_))));
    }
}
