//! Snapshot codec.
//!
//! A snapshot is the whole collection as one JSON array, stored under
//! [`SNAPSHOT_KEY`]. Writes replace the previous value wholesale.

use roster_types::UserRecord;
use thiserror::Error;

use crate::collection::Collection;

/// Fixed persistence key for the collection snapshot.
pub const SNAPSHOT_KEY: &str = "users";

/// Snapshot encode/decode failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The collection could not be serialized.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored bytes are not a valid snapshot.
    #[error("snapshot decoding failed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialize the collection to snapshot bytes.
pub fn encode_snapshot(collection: &Collection) -> Result<Vec<u8>, SnapshotError> {
    serde_json::to_vec(collection.records()).map_err(SnapshotError::Encode)
}

/// Restore a collection from snapshot bytes.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Collection, SnapshotError> {
    let records: Vec<UserRecord> = serde_json::from_slice(bytes).map_err(SnapshotError::Decode)?;
    Ok(Collection::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_roundtrip_preserves_order() {
        let collection = Collection::from_records(vec![
            UserRecord::bare("z").with("name", "Zed"),
            UserRecord::bare("a").with("name", "Alice").with("age", 30),
            UserRecord::bare("m"),
        ]);

        let bytes = encode_snapshot(&collection).unwrap();
        let restored = decode_snapshot(&bytes).unwrap();

        assert_eq!(restored, collection);
    }

    #[test]
    fn snapshot_is_a_json_array() {
        let collection = Collection::from_records(vec![UserRecord::bare("a").with("n", 1)]);
        let bytes = encode_snapshot(&collection).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!([{"key": "a", "n": 1}]));
    }

    #[test]
    fn snapshot_keeps_attribute_order() {
        let record = UserRecord::bare("a").with("zeta", 1).with("alpha", 2);
        let bytes = encode_snapshot(&Collection::from_records(vec![record])).unwrap();

        assert_eq!(bytes, br#"[{"key":"a","zeta":1,"alpha":2}]"#.to_vec());
        let restored = decode_snapshot(&bytes).unwrap().into_records();
        let names: Vec<&str> = restored[0].attributes.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn empty_snapshot_decodes() {
        assert!(decode_snapshot(b"[]").unwrap().is_empty());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        assert!(matches!(
            decode_snapshot(b"{not json"),
            Err(SnapshotError::Decode(_))
        ));
        assert!(matches!(
            decode_snapshot(br#"[{"name": "no key"}]"#),
            Err(SnapshotError::Decode(_))
        ));
    }
}
