//! RosterClient - the main interface for roster.
//!
//! Bridges the [`UserStore`] to a [`UserService`]. Each remote operation is a
//! single round trip whose success applies exactly one store mutation; a
//! failure returns the matching [`RosterError`] and leaves the store as it
//! was.
//!
//! ```text
//! Application → RosterClient → UserService → HTTP
//!                   ↓
//!               UserStore → observers (snapshot persistence, UI)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use roster_client::{ClientConfig, FileSnapshots, HttpUserService, RosterClient};
//!
//! let config = ClientConfig::new("http://localhost:3000");
//! let service = HttpUserService::new(&config.base_url)?;
//! let client = RosterClient::start(config, service, Arc::new(FileSnapshots::new(dir)));
//!
//! // Seeded from the last snapshot right away; replaced once the fetch lands.
//! client.ready().await?;
//! client.delete_remote(&key).await?;
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use roster_core::SNAPSHOT_KEY;
use roster_types::{RosterError, UserDraft, UserKey, UserRecord};

use crate::persist::{self, SnapshotStore};
use crate::service::UserService;
use crate::store::UserStore;

/// Configuration for RosterClient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the user service; `/api/users` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Persistence key for the collection snapshot.
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
    /// Per-request timeout in seconds (0 = none).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_snapshot_key() -> String {
    SNAPSHOT_KEY.to_string()
}

fn default_request_timeout_secs() -> u64 {
    0
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            snapshot_key: default_snapshot_key(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Configuration for the service at `base_url`, other fields default.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Set the snapshot key.
    pub fn with_snapshot_key(mut self, key: &str) -> Self {
        self.snapshot_key = key.to_string();
        self
    }

    /// Set the request timeout in seconds (0 disables it).
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// The request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

enum InitialFetch {
    Pending(JoinHandle<Result<usize, RosterError>>),
    Done(Result<usize, RosterError>),
}

/// The main roster client.
///
/// Owns the store and the service. Cloning yields another handle to both.
pub struct RosterClient<S: UserService> {
    config: ClientConfig,
    service: Arc<S>,
    store: UserStore,
    initial: Arc<tokio::sync::Mutex<InitialFetch>>,
}

impl<S: UserService> Clone for RosterClient<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            service: Arc::clone(&self.service),
            store: self.store.clone(),
            initial: Arc::clone(&self.initial),
        }
    }
}

impl<S: UserService + 'static> RosterClient<S> {
    /// Start a client with a fresh store.
    ///
    /// Seeds the store from the snapshot in `snapshots`, mirrors every later
    /// change back into it, and kicks off the initial fetch. Must be called
    /// from within a Tokio runtime.
    pub fn start(config: ClientConfig, service: S, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self::start_with_store(config, service, snapshots, UserStore::new())
    }

    /// Like [`start`](Self::start), using a caller-built store (for example
    /// one with its own key supplier or observers already attached).
    pub fn start_with_store(
        config: ClientConfig,
        service: S,
        snapshots: Arc<dyn SnapshotStore>,
        store: UserStore,
    ) -> Self {
        let key = config.snapshot_key.clone();
        let restored = persist::restore(&store, snapshots.as_ref(), &key);
        persist::persist(&store, snapshots, &key);
        tracing::debug!(restored, base_url = %config.base_url, "roster client starting");

        let service = Arc::new(service);
        let handle = {
            let service = Arc::clone(&service);
            let store = store.clone();
            tokio::spawn(async move { fetch_all_with(service.as_ref(), &store).await })
        };

        Self {
            config,
            service,
            store,
            initial: Arc::new(tokio::sync::Mutex::new(InitialFetch::Pending(handle))),
        }
    }

    /// Wait for the startup fetch and return its result.
    ///
    /// On failure the store still holds whatever the snapshot seeded.
    /// Repeated calls return the same result.
    pub async fn ready(&self) -> Result<usize, RosterError> {
        let mut initial = self.initial.lock().await;
        let result = match &mut *initial {
            InitialFetch::Done(result) => return result.clone(),
            InitialFetch::Pending(handle) => handle.await.unwrap_or_else(|e| {
                Err(RosterError::fetch(format!(
                    "failed to load users: initial fetch task ended: {}",
                    e
                )))
            }),
        };
        *initial = InitialFetch::Done(result.clone());
        result
    }

    /// The store this client updates.
    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// The configuration the client was started with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a reference to the underlying service (for testing).
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fetch the whole collection and replace the store with it.
    ///
    /// Returns the number of records loaded.
    pub async fn fetch_all(&self) -> Result<usize, RosterError> {
        fetch_all_with(self.service.as_ref(), &self.store).await
    }

    /// Alias for [`fetch_all`](Self::fetch_all), for explicit full reloads.
    pub async fn reload(&self) -> Result<usize, RosterError> {
        self.fetch_all().await
    }

    /// Delete `key` remotely, then locally.
    pub async fn delete_remote(&self, key: &UserKey) -> Result<(), RosterError> {
        delete_with(self.service.as_ref(), &self.store, key).await
    }

    /// Create a record remotely and append the service's version locally.
    pub async fn add_remote(&self, draft: &UserDraft) -> Result<UserRecord, RosterError> {
        create_with(self.service.as_ref(), &self.store, draft, CreateKind::Add).await
    }

    /// Create a duplicate remotely and append the service's version locally.
    ///
    /// Same round trip as [`add_remote`](Self::add_remote); only the failure
    /// kind differs.
    pub async fn copy_remote(&self, draft: &UserDraft) -> Result<UserRecord, RosterError> {
        create_with(self.service.as_ref(), &self.store, draft, CreateKind::Copy).await
    }

    /// Fire-and-forget [`fetch_all`](Self::fetch_all).
    pub fn spawn_fetch_all(&self) -> JoinHandle<Result<usize, RosterError>> {
        let (service, store) = self.parts();
        tokio::spawn(async move { fetch_all_with(service.as_ref(), &store).await })
    }

    /// Fire-and-forget [`delete_remote`](Self::delete_remote).
    pub fn spawn_delete(&self, key: UserKey) -> JoinHandle<Result<(), RosterError>> {
        let (service, store) = self.parts();
        tokio::spawn(async move { delete_with(service.as_ref(), &store, &key).await })
    }

    /// Fire-and-forget [`add_remote`](Self::add_remote).
    pub fn spawn_add(&self, draft: UserDraft) -> JoinHandle<Result<UserRecord, RosterError>> {
        let (service, store) = self.parts();
        tokio::spawn(
            async move { create_with(service.as_ref(), &store, &draft, CreateKind::Add).await },
        )
    }

    /// Fire-and-forget [`copy_remote`](Self::copy_remote).
    pub fn spawn_copy(&self, draft: UserDraft) -> JoinHandle<Result<UserRecord, RosterError>> {
        let (service, store) = self.parts();
        tokio::spawn(
            async move { create_with(service.as_ref(), &store, &draft, CreateKind::Copy).await },
        )
    }

    fn parts(&self) -> (Arc<S>, UserStore) {
        (Arc::clone(&self.service), self.store.clone())
    }
}

async fn fetch_all_with<S: UserService + ?Sized>(
    service: &S,
    store: &UserStore,
) -> Result<usize, RosterError> {
    match service.list_users().await {
        Ok(users) => {
            let count = users.len();
            store.replace_all(users);
            tracing::debug!(count, "fetched users");
            Ok(count)
        }
        Err(e) => {
            tracing::warn!(error = %e, "fetching users failed");
            Err(RosterError::fetch(format!("failed to load users: {}", e)))
        }
    }
}

async fn delete_with<S: UserService + ?Sized>(
    service: &S,
    store: &UserStore,
    key: &UserKey,
) -> Result<(), RosterError> {
    match service.delete_user(key).await {
        Ok(()) => {
            store.delete(key);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(%key, error = %e, "deleting user failed");
            Err(RosterError::fetch(format!(
                "failed to delete user {}: {}",
                key, e
            )))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CreateKind {
    Add,
    Copy,
}

async fn create_with<S: UserService + ?Sized>(
    service: &S,
    store: &UserStore,
    draft: &UserDraft,
    kind: CreateKind,
) -> Result<UserRecord, RosterError> {
    match service.create_user(draft).await {
        Ok(user) => {
            store.add(user.clone());
            Ok(user)
        }
        Err(e) => {
            tracing::warn!(?kind, error = %e, "creating user failed");
            Err(match kind {
                CreateKind::Add => RosterError::add(format!("failed to add user: {}", e)),
                CreateKind::Copy => RosterError::copy(format!("failed to copy user: {}", e)),
            })
        }
    }
}
