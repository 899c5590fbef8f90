//! Database records
//!
//! Typed views over the `instagram_accounts` table used by the ranking engine

mod relationship;

pub use relationship::{RelationshipRow, ScoreUpdate};
