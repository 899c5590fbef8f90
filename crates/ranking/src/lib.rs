//! FollowRank ranking engine
//!
//! Influence scoring over the who-follows-whom graph:
//! - Follower graph construction with optional follower selection
//! - Damped PageRank power iteration
//! - Min-max normalization onto 0-100 and leader reporting
//! - Batched best-effort score write-back for global runs

mod graph;
mod persist;
mod report;
mod scores;
mod service;
mod solver;

pub use graph::{AccountId, FollowerGraph, FollowerSelection};
pub use persist::{persist_scores, round_score, PersistOutcome, ScoreSink};
pub use report::{RankResponse, RankResult, RankStats, SelectedFollowersCount};
pub use scores::{normalize, top_n, ScoreVector, SCORE_SCALE};
pub use service::{rank_rows, RankService, RelationshipSource};
pub use solver::{PageRankConfig, RankOutcome, RankSolver};
