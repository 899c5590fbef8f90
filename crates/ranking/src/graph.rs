//! Follower graph representation
//!
//! Provides the in-memory who-follows-whom graph used for scoring.
//! An edge `follower -> account` means influence flows from the follower
//! to the account it follows.

use followrank_common::db::RelationshipRow;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Opaque, case-sensitive account handle
pub type AccountId = String;

/// Which followers may contribute edges to the graph.
///
/// Decided once at the entry point; downstream code never looks at the
/// raw request list again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowerSelection {
    /// Every follower edge counts (global ranking)
    Unrestricted,
    /// Only edges whose follower is in `followers` count
    RestrictedTo {
        followers: HashSet<AccountId>,
        /// Length of the caller's list, duplicates included
        requested: usize,
    },
}

impl FollowerSelection {
    /// Interpret an optional request list; absent or empty means global
    pub fn from_request(selected: Option<Vec<String>>) -> Self {
        match selected {
            Some(list) if !list.is_empty() => Self::RestrictedTo {
                requested: list.len(),
                followers: list.into_iter().collect(),
            },
            _ => Self::Unrestricted,
        }
    }

    /// Whether an edge from `follower` is part of the graph
    pub fn includes(&self, follower: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::RestrictedTo { followers, .. } => followers.contains(follower),
        }
    }

    /// Global computations are the only ones written back to the store
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Number of followers the caller asked for, `None` for a global
    /// computation
    pub fn selected_count(&self) -> Option<usize> {
        match self {
            Self::Unrestricted => None,
            Self::RestrictedTo { requested, .. } => Some(*requested),
        }
    }

    /// Metric/log label
    pub fn scope(&self) -> &'static str {
        match self {
            Self::Unrestricted => "global",
            Self::RestrictedTo { .. } => "restricted",
        }
    }
}

/// In-memory follower graph with dense node indices
#[derive(Debug, Default)]
pub struct FollowerGraph {
    /// Node index -> account handle, in first-seen order
    accounts: Vec<AccountId>,

    /// Account handle -> node index
    index: HashMap<AccountId, usize>,

    /// Node index -> indices of the accounts it follows
    outgoing: Vec<BTreeSet<usize>>,
}

impl FollowerGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from relationship rows.
    ///
    /// Row subjects always become nodes. Each follower admitted by
    /// `selection` adds the edge `follower -> subject` and counts as one
    /// relationship, duplicates included; the edge set itself is a true set.
    /// Self-follows are kept.
    pub fn build(rows: &[RelationshipRow], selection: &FollowerSelection) -> (Self, usize) {
        let mut graph = Self::new();

        for row in rows {
            graph.add_account(&row.account);
        }

        let mut relationships = 0;
        for row in rows {
            for follower in &row.followers {
                if selection.includes(follower) {
                    graph.add_edge(follower, &row.account);
                    relationships += 1;
                }
            }
        }

        (graph, relationships)
    }

    /// Add a node if new, returning its index
    pub fn add_account(&mut self, account: &str) -> usize {
        if let Some(&idx) = self.index.get(account) {
            return idx;
        }

        let idx = self.accounts.len();
        self.accounts.push(account.to_string());
        self.index.insert(account.to_string(), idx);
        self.outgoing.push(BTreeSet::new());
        idx
    }

    /// Add the edge `follower -> followed`, creating either node if new
    pub fn add_edge(&mut self, follower: &str, followed: &str) {
        let from = self.add_account(follower);
        let to = self.add_account(followed);
        self.outgoing[from].insert(to);
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.accounts.len()
    }

    /// Get distinct edge count
    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(BTreeSet::len).sum()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Account handles in node-index order
    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }

    /// Node index of an account
    pub fn index_of(&self, account: &str) -> Option<usize> {
        self.index.get(account).copied()
    }

    /// Whether the account is a node
    pub fn contains(&self, account: &str) -> bool {
        self.index.contains_key(account)
    }

    /// Indices of the accounts followed by node `idx`
    pub fn successors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.outgoing[idx].iter().copied()
    }

    /// Number of accounts followed by node `idx`
    pub fn out_degree(&self, idx: usize) -> usize {
        self.outgoing[idx].len()
    }

    /// Whether `follower -> followed` is an edge
    pub fn has_edge(&self, follower: &str, followed: &str) -> bool {
        match (self.index_of(follower), self.index_of(followed)) {
            (Some(from), Some(to)) => self.outgoing[from].contains(&to),
            _ => false,
        }
    }
}
