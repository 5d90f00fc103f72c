//! Error taxonomy for roster.

use thiserror::Error;

use crate::UserKey;

/// Failures raised by the user store and its remote operations.
///
/// `RecordNotFound` is a warning: the store logs it and leaves state untouched.
/// The other three are returned from the remote operation that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// A list or delete round trip failed at the transport or status level.
    #[error("{message}")]
    FetchFailure {
        /// Human-readable description.
        message: String,
    },

    /// A delete or copy referenced a key absent from the collection.
    #[error("user with key {key} not found")]
    RecordNotFound {
        /// The key that was looked up.
        key: UserKey,
    },

    /// A create round trip failed.
    #[error("{message}")]
    AddFailure {
        /// Human-readable description.
        message: String,
    },

    /// A duplicate-via-create round trip failed.
    #[error("{message}")]
    CopyFailure {
        /// Human-readable description.
        message: String,
    },
}

impl RosterError {
    /// Build a `FetchFailure`.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::FetchFailure {
            message: message.into(),
        }
    }

    /// Build a `RecordNotFound` for `key`.
    pub fn not_found(key: impl Into<UserKey>) -> Self {
        Self::RecordNotFound { key: key.into() }
    }

    /// Build an `AddFailure`.
    pub fn add(message: impl Into<String>) -> Self {
        Self::AddFailure {
            message: message.into(),
        }
    }

    /// Build a `CopyFailure`.
    pub fn copy(message: impl Into<String>) -> Self {
        Self::CopyFailure {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_key() {
        let err = RosterError::not_found("abc");
        assert_eq!(err.to_string(), "user with key abc not found");
    }

    #[test]
    fn remote_kinds_display_their_message() {
        assert_eq!(
            RosterError::fetch("failed to load users").to_string(),
            "failed to load users"
        );
        assert_eq!(RosterError::add("boom").to_string(), "boom");
        assert_eq!(RosterError::copy("boom").to_string(), "boom");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RosterError>();
    }
}
