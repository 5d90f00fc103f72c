//! # roster-core
//!
//! Pure logic for roster (no I/O, instant tests).
//!
//! This crate implements the collection reducers and the snapshot codec
//! without any network or disk I/O.
//!
//! ## Design Philosophy
//!
//! Every mutation is a synchronous transition over an owned [`Collection`].
//! A transition either changes the collection or reports a warning and
//! leaves it exactly as it was. Network calls and persistence live in
//! `roster-client`, which applies these transitions when effects complete.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod keys;
pub mod snapshot;

pub use collection::{Collection, Intent, Outcome};
pub use keys::{KeySupplier, SequentialKeys, UuidKeys};
pub use snapshot::{decode_snapshot, encode_snapshot, SnapshotError, SNAPSHOT_KEY};
