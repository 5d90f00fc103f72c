//! Remote user service abstraction.
//!
//! The service exposes the collection over three calls:
//! - `list_users()` fetches every record
//! - `delete_user()` removes one record by key
//! - `create_user()` submits a draft and returns the canonical record
//!
//! [`HttpUserService`] talks to the real `/api/users` endpoints;
//! [`MockUserService`] is an in-memory stand-in for tests.

mod http;
mod mock;

pub use http::HttpUserService;
pub use mock::{MockUserService, ServiceCall};

use async_trait::async_trait;
use roster_types::{UserDraft, UserKey, UserRecord};
use std::sync::Arc;
use thiserror::Error;

/// User service errors.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Could not reach the service.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body was not what the endpoint promises.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The configured base URL cannot address the service.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            ServiceError::ConnectionFailed(e.to_string())
        } else if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_decode() {
            ServiceError::Decode(e.to_string())
        } else {
            ServiceError::Request(e.to_string())
        }
    }
}

/// The remote collection service.
///
/// Implementations perform exactly one round trip per call and never touch
/// local state.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fetch the whole collection.
    async fn list_users(&self) -> Result<Vec<UserRecord>, ServiceError>;

    /// Delete the record with `key`. Any success body is ignored.
    async fn delete_user(&self, key: &UserKey) -> Result<(), ServiceError>;

    /// Create a record from `draft`. The service assigns canonical fields.
    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord, ServiceError>;
}

#[async_trait]
impl<T: UserService + ?Sized> UserService for Arc<T> {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ServiceError> {
        (**self).list_users().await
    }

    async fn delete_user(&self, key: &UserKey) -> Result<(), ServiceError> {
        (**self).delete_user(key).await
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord, ServiceError> {
        (**self).create_user(draft).await
    }
}
