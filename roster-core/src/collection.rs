//! The user collection and its mutation intents.
//!
//! All transitions here are pure and synchronous. A transition that cannot
//! apply (the key is absent) reports [`RosterError::RecordNotFound`] and
//! leaves the collection untouched; it never partially applies.

use roster_types::{RosterError, UserKey, UserRecord};

use crate::keys::KeySupplier;

/// Ordered list of user records. Order is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    records: Vec<UserRecord>,
}

/// A requested mutation, before it is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Replace the whole collection (the target of a full reload).
    ReplaceAll(Vec<UserRecord>),
    /// Append one record.
    Add(UserRecord),
    /// Remove the record with this key.
    Delete(UserKey),
    /// Append a duplicate of the record with this key under a fresh key.
    Copy(UserKey),
}

impl Intent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReplaceAll(_) => "replace_all",
            Self::Add(_) => "add",
            Self::Delete(_) => "delete",
            Self::Copy(_) => "copy",
        }
    }
}

/// Result of applying an [`Intent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The collection changed.
    Changed,
    /// Nothing changed; the warning says why.
    Warned(RosterError),
}

impl Outcome {
    /// True if the collection changed.
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed)
    }

    /// The warning, if the intent did not apply.
    pub fn warning(&self) -> Option<&RosterError> {
        match self {
            Self::Changed => None,
            Self::Warned(err) => Some(err),
        }
    }
}

impl Collection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection holding `records` in the given order.
    pub fn from_records(records: Vec<UserRecord>) -> Self {
        Self { records }
    }

    /// Records in display order.
    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    /// Consume into the underlying records.
    pub fn into_records(self) -> Vec<UserRecord> {
        self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by key.
    pub fn get(&self, key: &UserKey) -> Option<&UserRecord> {
        self.records.iter().find(|r| &r.key == key)
    }

    /// True if a record with `key` exists.
    pub fn contains(&self, key: &UserKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterate records in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, UserRecord> {
        self.records.iter()
    }

    /// Apply an intent.
    pub fn apply<K: KeySupplier + ?Sized>(&mut self, intent: Intent, keys: &K) -> Outcome {
        let result = match intent {
            Intent::ReplaceAll(records) => {
                self.replace_all(records);
                Ok(())
            }
            Intent::Add(record) => {
                self.add(record);
                Ok(())
            }
            Intent::Delete(key) => self.delete(&key).map(|_| ()),
            Intent::Copy(key) => self.copy(&key, keys).map(|_| ()),
        };
        match result {
            Ok(()) => Outcome::Changed,
            Err(err) => Outcome::Warned(err),
        }
    }

    /// Unconditionally replace every record.
    pub fn replace_all(&mut self, records: Vec<UserRecord>) {
        self.records = records;
    }

    /// Append a record. Key uniqueness is the caller's responsibility.
    pub fn add(&mut self, record: UserRecord) {
        self.records.push(record);
    }

    /// Remove the record with `key`, returning it.
    pub fn delete(&mut self, key: &UserKey) -> Result<UserRecord, RosterError> {
        let index = self
            .records
            .iter()
            .position(|r| &r.key == key)
            .ok_or_else(|| RosterError::not_found(key.clone()))?;
        Ok(self.records.remove(index))
    }

    /// Append a duplicate of the record with `key` under a fresh key.
    ///
    /// Keys from `keys` that already exist in the collection are skipped, so
    /// the returned key is distinct from every key present.
    pub fn copy<K: KeySupplier + ?Sized>(
        &mut self,
        key: &UserKey,
        keys: &K,
    ) -> Result<UserKey, RosterError> {
        let source = self
            .get(key)
            .ok_or_else(|| RosterError::not_found(key.clone()))?;
        let fresh = loop {
            let candidate = keys.next_key();
            if !self.contains(&candidate) {
                break candidate;
            }
        };
        let duplicate = source.rekeyed(fresh.clone());
        self.records.push(duplicate);
        Ok(fresh)
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a UserRecord;
    type IntoIter = std::slice::Iter<'a, UserRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl From<Vec<UserRecord>> for Collection {
    fn from(records: Vec<UserRecord>) -> Self {
        Self::from_records(records)
    }
}
