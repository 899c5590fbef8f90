//! Ranking results and their wire representation

use super::graph::AccountId;
use super::persist::PersistOutcome;
use super::scores::ScoreVector;
use serde::{Serialize, Serializer};

/// How many followers the computation was restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedFollowersCount {
    /// Global computation, serialized as `"all"`
    All,
    Count(usize),
}

impl From<Option<usize>> for SelectedFollowersCount {
    fn from(count: Option<usize>) -> Self {
        count.map_or(Self::All, Self::Count)
    }
}

impl Serialize for SelectedFollowersCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Count(count) => serializer.serialize_u64(*count as u64),
        }
    }
}

/// Summary of one computation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankStats {
    pub nodes: usize,
    pub relationships: usize,
    pub iterations: usize,

    /// Omitted for an empty graph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_followers_count: Option<SelectedFollowersCount>,
}

/// Outcome of a successful computation
#[derive(Debug, Clone)]
pub struct RankResult {
    /// Normalized scores, keyed by every node of the graph
    pub scores: ScoreVector,

    pub stats: RankStats,

    /// Top accounts by normalized score
    pub leaders: Vec<(AccountId, f64)>,

    /// Whether the solver met its tolerance before the iteration cap
    pub converged: bool,

    /// Write-back report; `None` for restricted computations
    pub persisted: Option<PersistOutcome>,
}

impl RankResult {
    /// Leaders formatted as `account: score` with two decimals
    pub fn leader_summary(&self) -> String {
        self.leaders
            .iter()
            .map(|(account, score)| format!("{}: {:.2}", account, score))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Response body of the PageRank endpoint
#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub success: bool,

    pub scores: ScoreVector,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RankStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RankResponse {
    /// Failure body: message plus an empty score map
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            scores: ScoreVector::default(),
            stats: None,
            error: Some(message.into()),
        }
    }
}

impl From<RankResult> for RankResponse {
    fn from(result: RankResult) -> Self {
        Self {
            success: true,
            scores: result.scores,
            stats: Some(result.stats),
            error: None,
        }
    }
}
