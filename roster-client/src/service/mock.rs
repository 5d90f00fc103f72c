//! Mock user service for testing.
//!
//! Holds a server-side user list, records every call, and can be told to fail
//! or stall the next request.

use super::{ServiceError, UserService};
use async_trait::async_trait;
use roster_types::{UserDraft, UserKey, UserRecord};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A call observed by [`MockUserService`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    /// `list_users()`
    List,
    /// `delete_user(key)`
    Delete(UserKey),
    /// `create_user(draft)`
    Create(UserDraft),
}

/// Mock user service for testing.
///
/// Clones share state, so a test can keep one handle while the client owns
/// another.
#[derive(Debug, Default, Clone)]
pub struct MockUserService {
    inner: Arc<Mutex<MockUserServiceInner>>,
}

#[derive(Debug, Default)]
struct MockUserServiceInner {
    users: Vec<UserRecord>,
    calls: Vec<ServiceCall>,
    next_server_key: u64,
    fail_next_list: Option<ServiceError>,
    fail_next_delete: Option<ServiceError>,
    fail_next_create: Option<ServiceError>,
    delays: VecDeque<Duration>,
}

impl MockUserService {
    /// Create a mock with an empty server-side list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose server-side list starts as `users`.
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        let mock = Self::new();
        mock.lock().users = users;
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockUserServiceInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current server-side list.
    pub fn server_users(&self) -> Vec<UserRecord> {
        self.lock().users.clone()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    /// Cause the next `list_users()` to fail with `error`.
    pub fn fail_next_list(&self, error: ServiceError) {
        self.lock().fail_next_list = Some(error);
    }

    /// Cause the next `delete_user()` to fail with `error`.
    pub fn fail_next_delete(&self, error: ServiceError) {
        self.lock().fail_next_delete = Some(error);
    }

    /// Cause the next `create_user()` to fail with `error`.
    pub fn fail_next_create(&self, error: ServiceError) {
        self.lock().fail_next_create = Some(error);
    }

    /// Delay the next call (of any kind) by `delay` before it answers.
    ///
    /// Delays queue up: each call takes the next one.
    pub fn delay_next(&self, delay: Duration) {
        self.lock().delays.push_back(delay);
    }

    /// Record the call and take its queued delay, if any.
    fn begin(&self, call: ServiceCall) -> Option<Duration> {
        let mut inner = self.lock();
        inner.calls.push(call);
        inner.delays.pop_front()
    }

    async fn stall(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl UserService for MockUserService {
    async fn list_users(&self) -> Result<Vec<UserRecord>, ServiceError> {
        Self::stall(self.begin(ServiceCall::List)).await;

        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_list.take() {
            return Err(error);
        }
        Ok(inner.users.clone())
    }

    async fn delete_user(&self, key: &UserKey) -> Result<(), ServiceError> {
        Self::stall(self.begin(ServiceCall::Delete(key.clone()))).await;

        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_delete.take() {
            return Err(error);
        }
        let before = inner.users.len();
        inner.users.retain(|u| &u.key != key);
        if inner.users.len() == before {
            return Err(ServiceError::Status {
                status: 404,
                body: format!("no user {}", key),
            });
        }
        Ok(())
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord, ServiceError> {
        Self::stall(self.begin(ServiceCall::Create(draft.clone()))).await;

        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_create.take() {
            return Err(error);
        }
        let key = match &draft.key {
            Some(key) => key.clone(),
            None => {
                inner.next_server_key += 1;
                UserKey::new(format!("srv-{}", inner.next_server_key))
            }
        };
        let user = UserRecord::new(key, draft.attributes.clone());
        inner.users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alice() -> UserRecord {
        UserRecord::bare("a").with("name", "Alice")
    }

    // ===========================================
    // Basic Behaviour
    // ===========================================

    #[tokio::test]
    async fn lists_seeded_users() {
        let service = MockUserService::with_users(vec![alice()]);
        let users = service.list_users().await.unwrap();
        assert_eq!(users, vec![alice()]);
        assert_eq!(service.calls(), vec![ServiceCall::List]);
    }

    #[tokio::test]
    async fn create_assigns_server_key() {
        let service = MockUserService::new();
        let draft = UserDraft::new().with("name", "Bob");

        let first = service.create_user(&draft).await.unwrap();
        let second = service.create_user(&draft).await.unwrap();

        assert_eq!(first.key.as_str(), "srv-1");
        assert_eq!(second.key.as_str(), "srv-2");
        assert_eq!(first.get("name"), Some(&json!("Bob")));
        assert_eq!(service.server_users().len(), 2);
    }

    #[tokio::test]
    async fn create_honours_proposed_key() {
        let service = MockUserService::new();
        let user = service
            .create_user(&UserDraft::new().with("key", "mine"))
            .await
            .unwrap();
        assert_eq!(user.key.as_str(), "mine");
    }

    #[tokio::test]
    async fn delete_removes_server_user() {
        let service = MockUserService::with_users(vec![alice()]);
        service.delete_user(&UserKey::from("a")).await.unwrap();
        assert!(service.server_users().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_404() {
        let service = MockUserService::new();
        let result = service.delete_user(&UserKey::from("ghost")).await;
        assert!(matches!(
            result,
            Err(ServiceError::Status { status: 404, .. })
        ));
    }

    // ===========================================
    // Forced Failures
    // ===========================================

    #[tokio::test]
    async fn forced_failures_apply_once() {
        let service = MockUserService::with_users(vec![alice()]);
        service.fail_next_list(ServiceError::Timeout);

        assert!(matches!(
            service.list_users().await,
            Err(ServiceError::Timeout)
        ));
        assert!(service.list_users().await.is_ok());
    }

    #[tokio::test]
    async fn failed_create_leaves_server_untouched() {
        let service = MockUserService::new();
        service.fail_next_create(ServiceError::Status {
            status: 500,
            body: String::new(),
        });

        assert!(service.create_user(&UserDraft::new()).await.is_err());
        assert!(service.server_users().is_empty());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let service = MockUserService::new();
        let other = service.clone();

        other.create_user(&UserDraft::new()).await.unwrap();

        assert_eq!(service.server_users().len(), 1);
        assert_eq!(service.calls().len(), 1);
    }
}
