//! # roster-client
//!
//! Synchronized user-list store for applications.
//!
//! ## Features
//!
//! - **Single Source of Truth**: [`UserStore`] owns the collection and
//!   notifies subscribers after every change
//! - **Remote Operations**: fetch, delete, add, and copy over a pluggable
//!   [`UserService`] (HTTP, mock)
//! - **Snapshot Persistence**: the collection is mirrored to a
//!   [`SnapshotStore`] and restored from it at startup
//! - **Pure Core**: mutations are the side-effect-free reducers of `roster-core`
//!
//! ## Example
//!
//! ```ignore
//! use roster_client::{ClientConfig, HttpUserService, MemorySnapshots, RosterClient};
//!
//! let config = ClientConfig::new("http://localhost:3000");
//! let service = HttpUserService::new(&config.base_url)?;
//! let client = RosterClient::start(config, service, Arc::new(MemorySnapshots::new()));
//!
//! client.ready().await?;
//! let created = client.add_remote(&UserDraft::new().with("name", "Alice")).await?;
//! let duplicate = client.store().copy(&created.key)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod persist;
pub mod service;
pub mod store;

pub use client::{ClientConfig, RosterClient};
pub use persist::{FileSnapshots, MemorySnapshots, PersistError, SnapshotStore};
pub use service::{HttpUserService, MockUserService, ServiceCall, ServiceError, UserService};
pub use store::{Observer, SubscriptionId, UserStore};

pub use roster_core::{Collection, Intent, KeySupplier, Outcome, SequentialKeys, UuidKeys};
pub use roster_types::{RosterError, UserDraft, UserKey, UserRecord};
