//! Score write-back
//!
//! Best-effort: a failing batch is logged and stops the write-back, but
//! never fails the computation that produced the scores.

use super::scores::ScoreVector;
use async_trait::async_trait;
use followrank_common::{
    db::{AccountRepository, ScoreUpdate},
    errors::Result,
    metrics,
};
use tracing::{debug, warn};

/// Destination for global scores
#[async_trait]
pub trait ScoreSink: Send + Sync {
    /// Write one batch, returning the number of rows updated
    async fn write_scores(&self, batch: &[ScoreUpdate]) -> Result<u64>;
}

#[async_trait]
impl ScoreSink for AccountRepository {
    async fn write_scores(&self, batch: &[ScoreUpdate]) -> Result<u64> {
        self.write_pagerank_scores(batch).await
    }
}

/// Report of one write-back pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistOutcome {
    /// Batches accepted by the sink
    pub batches_written: usize,

    /// Rows the sink reported as updated
    pub rows_updated: u64,

    /// First failure, after which remaining batches were skipped
    pub error: Option<String>,
}

impl PersistOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Round to two decimals, the precision of the stored column
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Write `scores` in chunks of `batch_size` accounts
pub async fn persist_scores<K>(sink: &K, scores: &ScoreVector, batch_size: usize) -> PersistOutcome
where
    K: ScoreSink + ?Sized,
{
    let updates: Vec<ScoreUpdate> = scores
        .iter()
        .map(|(account, score)| ScoreUpdate {
            account: account.to_string(),
            score: round_score(score),
        })
        .collect();

    let mut outcome = PersistOutcome::default();

    for (batch, chunk) in updates.chunks(batch_size.max(1)).enumerate() {
        match sink.write_scores(chunk).await {
            Ok(rows) => {
                metrics::record_persist_batch(true);
                outcome.batches_written += 1;
                outcome.rows_updated += rows;
                debug!(batch, accounts = chunk.len(), rows, "Score batch written");
            }
            Err(e) => {
                metrics::record_persist_batch(false);
                warn!(batch, error = %e, "PageRank persistence warning");
                outcome.error = Some(e.to_string());
                break;
            }
        }
    }

    outcome
}
