//! # roster-types
//!
//! Foundational types shared by every roster crate:
//! - [`UserKey`], [`UserRecord`], [`UserDraft`] - identity and record shapes
//! - [`RosterError`] - the error taxonomy surfaced by the store and its effects

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod record;

pub use error::RosterError;
pub use record::{Attributes, UserDraft, UserKey, UserRecord};
