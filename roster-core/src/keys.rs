//! Identifier suppliers for newly copied records.

use std::sync::atomic::{AtomicU64, Ordering};

use roster_types::UserKey;

/// Produces a fresh key on every call.
pub trait KeySupplier: Send + Sync {
    /// Return a key that has not been handed out before.
    fn next_key(&self) -> UserKey;
}

/// UUID v4 keys. The default supplier.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeys;

impl KeySupplier for UuidKeys {
    fn next_key(&self) -> UserKey {
        UserKey::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Deterministic `<prefix>-<n>` keys, counting from 1. Useful in tests.
#[derive(Debug)]
pub struct SequentialKeys {
    prefix: String,
    next: AtomicU64,
}

impl SequentialKeys {
    /// Create a supplier producing `prefix-1`, `prefix-2`, ...
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: AtomicU64::new(1),
        }
    }
}

impl KeySupplier for SequentialKeys {
    fn next_key(&self) -> UserKey {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        UserKey::new(format!("{}-{}", self.prefix, n))
    }
}

impl<T: KeySupplier + ?Sized> KeySupplier for std::sync::Arc<T> {
    fn next_key(&self) -> UserKey {
        (**self).next_key()
    }
}
