//! Typed records exchanged with the accounts table

/// One account together with the accounts that follow it.
///
/// Decoded at the repository boundary: a missing or undecodable
/// `followed_by` column arrives here as an empty follower list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRow {
    /// Handle of the followed account
    pub account: String,

    /// Handles of the accounts following `account`, in stored order
    pub followers: Vec<String>,
}

impl RelationshipRow {
    pub fn new(account: impl Into<String>, followers: Vec<String>) -> Self {
        Self {
            account: account.into(),
            followers,
        }
    }

    /// Build a row from the raw column values
    pub fn from_columns(username: String, followed_by: Option<Vec<String>>) -> Self {
        Self::new(username, followed_by.unwrap_or_default())
    }
}

/// Score written back for one account
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub account: String,

    /// Already rounded to two decimals
    pub score: f64,
}
