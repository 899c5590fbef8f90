//! Rank service
//!
//! Orchestrates one computation: fetch rows, build the graph, solve,
//! normalize, summarize and (for global runs) write scores back.

use super::graph::{FollowerGraph, FollowerSelection};
use super::persist::{persist_scores, ScoreSink};
use super::report::{RankResult, RankStats};
use super::scores::{normalize, top_n};
use super::solver::{PageRankConfig, RankSolver};
use async_trait::async_trait;
use followrank_common::{
    config::RankingConfig,
    db::{AccountRepository, RelationshipRow},
    errors::Result,
    metrics,
};
use std::time::Instant;
use tracing::{info, instrument, warn, Span};

/// Supplier of relationship rows
#[async_trait]
pub trait RelationshipSource: Send + Sync {
    async fn relationship_rows(&self) -> Result<Vec<RelationshipRow>>;
}

#[async_trait]
impl RelationshipSource for AccountRepository {
    async fn relationship_rows(&self) -> Result<Vec<RelationshipRow>> {
        self.fetch_relationship_rows().await
    }
}

/// Per-request ranking orchestrator.
///
/// Holds no graph or score state between calls; every `compute` builds
/// its own.
pub struct RankService<S, K> {
    source: S,
    sink: K,
    config: RankingConfig,
}

impl<S, K> RankService<S, K>
where
    S: RelationshipSource,
    K: ScoreSink,
{
    pub fn new(source: S, sink: K, config: RankingConfig) -> Self {
        Self { source, sink, config }
    }

    /// Run one computation.
    ///
    /// Only a failure to fetch rows is an error. Write-back failures are
    /// reported in `RankResult::persisted`.
    #[instrument(skip_all, fields(scope = selection.scope()))]
    pub async fn compute(&self, selection: FollowerSelection) -> Result<RankResult> {
        info!(
            selected = selection.selected_count().map_or_else(|| "all".to_string(), |n| n.to_string()),
            "Dynamic PageRank calculation requested"
        );

        let rows = self.source.relationship_rows().await?;
        info!(accounts = rows.len(), "Processing accounts with relationships");

        let scope = selection.scope();
        let global = selection.is_global();
        let config = self.config.clone();
        let span = Span::current();
        let started = Instant::now();

        let mut result = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            rank_rows(&rows, &selection, &config)
        })
        .await?;

        metrics::record_rank_run(
            scope,
            started.elapsed().as_secs_f64(),
            result.stats.iterations,
            result.stats.nodes,
        );

        if global {
            let outcome = persist_scores(&self.sink, &result.scores, self.config.persist_batch_size).await;
            if outcome.is_complete() {
                info!(
                    batches = outcome.batches_written,
                    rows = outcome.rows_updated,
                    "Global PageRank scores persisted"
                );
            }
            result.persisted = Some(outcome);
        }

        Ok(result)
    }
}

/// Build, solve, normalize and summarize one set of rows.
///
/// CPU-bound and synchronous; `RankService::compute` runs it off the
/// async runtime.
pub fn rank_rows(
    rows: &[RelationshipRow],
    selection: &FollowerSelection,
    config: &RankingConfig,
) -> RankResult {
    let (graph, relationships) = FollowerGraph::build(rows, selection);
    info!(relationships, nodes = graph.node_count(), "Follower graph built");

    let outcome = RankSolver::new(PageRankConfig::from(config)).solve(&graph);
    if graph.is_empty() {
        return RankResult {
            scores: outcome.scores,
            stats: RankStats {
                nodes: 0,
                relationships: 0,
                iterations: 0,
                selected_followers_count: None,
            },
            leaders: Vec::new(),
            converged: true,
            persisted: None,
        };
    }

    if outcome.converged {
        info!(iterations = outcome.iterations, "PageRank converged");
    } else {
        warn!(iterations = outcome.iterations, "PageRank stopped at iteration cap");
    }

    let scores = normalize(outcome.scores);
    let leaders = top_n(&scores, config.top_n);

    let result = RankResult {
        scores,
        stats: RankStats {
            nodes: graph.node_count(),
            relationships,
            iterations: outcome.iterations,
            selected_followers_count: Some(selection.selected_count().into()),
        },
        leaders,
        converged: outcome.converged,
        persisted: None,
    };

    info!(top = %result.leader_summary(), "Top PageRank scores");
    result
}
