//! User record shapes.
//!
//! A record is a `key` plus an open set of JSON attributes. The remote service
//! owns the attribute schema; this crate only cares about identity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Free-form record attributes, excluding `key`.
pub type Attributes = Map<String, Value>;

/// Field name carrying the record identity on the wire.
const KEY_FIELD: &str = "key";

/// Unique identifier of a user record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    /// Wrap a key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserKey({})", self.0)
    }
}

impl From<&str> for UserKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for UserKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for UserKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A user record as held in the collection.
///
/// Serializes flat: `{"key": "...", "name": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Record identity.
    pub key: UserKey,
    /// Every other attribute, in the shape the service returned them.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl UserRecord {
    /// Create a record. A stray `key` entry in `attributes` is dropped.
    pub fn new(key: impl Into<UserKey>, mut attributes: Attributes) -> Self {
        attributes.remove(KEY_FIELD);
        Self {
            key: key.into(),
            attributes,
        }
    }

    /// Create a record with no attributes.
    pub fn bare(key: impl Into<UserKey>) -> Self {
        Self::new(key, Attributes::new())
    }

    /// Set an attribute, builder style. Setting `key` this way is ignored.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        if name != KEY_FIELD {
            self.attributes.insert(name.to_string(), value.into());
        }
        self
    }

    /// Look up an attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Same attributes under a different key.
    pub fn rekeyed(&self, key: UserKey) -> Self {
        Self {
            key,
            attributes: self.attributes.clone(),
        }
    }

    /// Draft carrying these attributes without the key, for re-creating the
    /// record server-side.
    pub fn to_draft(&self) -> UserDraft {
        UserDraft {
            key: None,
            attributes: self.attributes.clone(),
        }
    }
}

/// A partial record sent as the body of a create request.
///
/// The service fills in canonical fields (at least `key`) and returns the
/// full record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDraft {
    /// Client-proposed key, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<UserKey>,
    /// Proposed attributes.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl UserDraft {
    /// Empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, builder style.
    ///
    /// `key` goes to the key slot: strings are used as-is, `null` clears it,
    /// and any other value is keyed by its JSON text.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if name == KEY_FIELD {
            self.key = match value {
                Value::Null => None,
                Value::String(key) => Some(UserKey::from(key)),
                other => Some(UserKey::from(other.to_string())),
            };
        } else {
            self.attributes.insert(name.to_string(), value);
        }
        self
    }
}
