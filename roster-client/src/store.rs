//! UserStore - the single source of truth for the user collection.
//!
//! Wraps a [`Collection`] behind a mutex and notifies subscribers after every
//! change. Mutations never suspend, so the lock is never held across an
//! `.await`.
//!
//! ```text
//! intent → UserStore::apply → Collection (pure) → observers (persistence, UI)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roster_core::{Collection, Intent, KeySupplier, Outcome, UuidKeys};
use roster_types::{RosterError, UserKey, UserRecord};

/// Callback invoked with the new collection after each change.
pub type Observer = Box<dyn Fn(&Collection) + Send + Sync>;

/// Handle returned by [`UserStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared, observable user collection.
///
/// Cloning gives another handle to the same collection.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<Mutex<StoreInner>>,
    keys: Arc<dyn KeySupplier>,
}

struct StoreInner {
    collection: Collection,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl UserStore {
    /// Empty store using UUID keys for copies.
    pub fn new() -> Self {
        Self::with_keys(Arc::new(UuidKeys))
    }

    /// Empty store drawing copy keys from `keys`.
    pub fn with_keys(keys: Arc<dyn KeySupplier>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                collection: Collection::new(),
                observers: Vec::new(),
                next_subscription: 0,
            })),
            keys,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `observer` to run after every change.
    ///
    /// Observers run synchronously, in mutation order, while the store is
    /// locked. They must not call back into the store.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Collection) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(sub, _)| *sub != id);
        inner.observers.len() != before
    }

    /// Run `mutation` under the lock. On success notify observers; on
    /// failure log the warning and leave state as it was.
    fn mutate<T>(
        &self,
        intent: &'static str,
        mutation: impl FnOnce(&mut Collection, &dyn KeySupplier) -> Result<T, RosterError>,
    ) -> Result<T, RosterError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match mutation(&mut inner.collection, self.keys.as_ref()) {
            Ok(value) => {
                tracing::debug!(intent, len = inner.collection.len(), "collection changed");
                for (_, observer) in &inner.observers {
                    observer(&inner.collection);
                }
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(intent, "{}", err);
                Err(err)
            }
        }
    }

    /// Apply any intent.
    pub fn apply(&self, intent: Intent) -> Outcome {
        let name = intent.name();
        let result = self.mutate(name, |collection, keys| {
            match collection.apply(intent, keys) {
                Outcome::Changed => Ok(()),
                Outcome::Warned(err) => Err(err),
            }
        });
        match result {
            Ok(()) => Outcome::Changed,
            Err(err) => Outcome::Warned(err),
        }
    }

    /// Replace the whole collection.
    pub fn replace_all(&self, records: Vec<UserRecord>) {
        let _ = self.mutate("replace_all", |collection, _| {
            collection.replace_all(records);
            Ok(())
        });
    }

    /// Append a record.
    pub fn add(&self, record: UserRecord) {
        let _ = self.mutate("add", |collection, _| {
            collection.add(record);
            Ok(())
        });
    }

    /// Remove the record with `key`. An absent key is logged and reported
    /// in the outcome; it is not an error.
    pub fn delete(&self, key: &UserKey) -> Outcome {
        match self.mutate("delete", |collection, _| collection.delete(key)) {
            Ok(_) => Outcome::Changed,
            Err(err) => Outcome::Warned(err),
        }
    }

    /// Duplicate the record with `key` under a fresh key and return that key.
    ///
    /// An absent key is logged and returned as the `RecordNotFound` warning,
    /// the same one [`delete`](Self::delete) reports in its outcome.
    pub fn copy(&self, key: &UserKey) -> Result<UserKey, RosterError> {
        self.mutate("copy", |collection, keys| collection.copy(key, keys))
    }

    /// Seed the collection without notifying observers.
    pub(crate) fn seed(&self, collection: Collection) {
        self.lock().collection = collection;
    }

    /// Copy of every record in display order.
    pub fn users(&self) -> Vec<UserRecord> {
        self.lock().collection.records().to_vec()
    }

    /// Copy of the current collection.
    pub fn snapshot(&self) -> Collection {
        self.lock().collection.clone()
    }

    /// Look up a record by key.
    pub fn get(&self, key: &UserKey) -> Option<UserRecord> {
        self.lock().collection.get(key).cloned()
    }

    /// True if a record with `key` exists.
    pub fn contains(&self, key: &UserKey) -> bool {
        self.lock().collection.contains(key)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.lock().collection.len()
    }

    /// True if there are no records.
    pub fn is_empty(&self) -> bool {
        self.lock().collection.is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("UserStore")
            .field("len", &inner.collection.len())
            .field("observers", &inner.observers.len())
            .finish()
    }
}
