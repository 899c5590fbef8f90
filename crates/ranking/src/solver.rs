//! PageRank-based influence scoring
//!
//! Damped power iteration over the follower graph. Dangling accounts
//! (following nobody) pass nothing on: their mass is dropped, not
//! redistributed.

use super::graph::FollowerGraph;
use super::ScoreVector;
use followrank_common::config::RankingConfig;

/// PageRank configuration
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (typically 0.85)
    pub damping: f64,

    /// Maximum iterations
    pub max_iterations: usize,

    /// Convergence threshold on the summed absolute change of one iteration
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 50,
            tolerance: 1e-6,
        }
    }
}

impl From<&RankingConfig> for PageRankConfig {
    fn from(config: &RankingConfig) -> Self {
        Self {
            damping: config.damping,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        }
    }
}

/// Raw solver output
#[derive(Debug, Clone)]
pub struct RankOutcome {
    /// Unnormalized score per account, in graph node order
    pub scores: ScoreVector,

    /// Iterations actually executed
    pub iterations: usize,

    /// Whether the tolerance was reached before the iteration cap
    pub converged: bool,
}

/// PageRank solver for follower graphs
#[derive(Debug, Clone, Default)]
pub struct RankSolver {
    config: PageRankConfig,
}

impl RankSolver {
    /// Create a new solver
    pub fn new(config: PageRankConfig) -> Self {
        Self { config }
    }

    /// Run power iteration until the L1 change drops below the tolerance
    /// or the iteration cap is hit
    pub fn solve(&self, graph: &FollowerGraph) -> RankOutcome {
        let n = graph.node_count();
        if n == 0 {
            return RankOutcome {
                scores: ScoreVector::default(),
                iterations: 0,
                converged: true,
            };
        }

        let mut scores = vec![1.0 / n as f64; n];
        let mut next = vec![0.0; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            let total_diff = self.step(graph, &scores, &mut next);
            std::mem::swap(&mut scores, &mut next);
            iterations += 1;

            if total_diff < self.config.tolerance {
                converged = true;
                break;
            }
        }

        let scores = graph
            .accounts()
            .iter()
            .cloned()
            .zip(scores)
            .collect();

        RankOutcome {
            scores,
            iterations,
            converged,
        }
    }

    /// One iteration: reads only `scores`, overwrites `next`, returns
    /// `Σ |next - scores|`
    pub(crate) fn step(&self, graph: &FollowerGraph, scores: &[f64], next: &mut [f64]) -> f64 {
        let n = scores.len();
        let damping = self.config.damping;
        let teleport = (1.0 - damping) / n as f64;

        next.fill(teleport);

        for (from, &score) in scores.iter().enumerate() {
            let out_degree = graph.out_degree(from);
            if out_degree == 0 {
                continue;
            }

            let share = damping * score / out_degree as f64;
            for to in graph.successors(from) {
                next[to] += share;
            }
        }

        next.iter()
            .zip(scores)
            .map(|(new, old)| (new - old).abs())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FollowerSelection;
    use followrank_common::db::RelationshipRow;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn graph_from(edges: &[(&str, &str)]) -> FollowerGraph {
        let mut graph = FollowerGraph::new();
        for (follower, followed) in edges {
            graph.add_edge(follower, followed);
        }
        graph
    }

    fn random_rows(seed: u64, accounts: usize, max_followers: usize) -> Vec<RelationshipRow> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..accounts)
            .map(|i| {
                let count = rng.gen_range(0..=max_followers);
                let followers = (0..count)
                    .map(|_| format!("user{}", rng.gen_range(0..accounts * 2)))
                    .collect();
                RelationshipRow::new(format!("user{}", i), followers)
            })
            .collect()
    }

    #[test]
    fn test_pagerank_basic() {
        // a -> b -> c
        //      ^
        //      d
        // b should outrank a (followed by a and d)
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("d", "b")]);
        let outcome = RankSolver::default().solve(&graph);

        let b = outcome.scores.get("b").unwrap();
        let a = outcome.scores.get("a").unwrap();
        let c = outcome.scores.get("c").unwrap();
        assert!(b > a, "b should rank higher than a");
        assert!(c > a, "c inherits b's influence");
        assert!(outcome.converged);
    }

    #[test]
    fn test_pagerank_empty_graph() {
        let outcome = RankSolver::default().solve(&FollowerGraph::new());

        assert!(outcome.scores.is_empty());
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_single_self_following_node_scores_one() {
        let graph = graph_from(&[("solo", "solo")]);
        let outcome = RankSolver::default().solve(&graph);

        assert_eq!(outcome.iterations, 1);
        assert!((outcome.scores.get("solo").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dangling_mass_is_not_redistributed() {
        // Both nodes dangle after one step: everyone sits at the teleport term
        let mut graph = FollowerGraph::new();
        graph.add_account("a");
        graph.add_account("b");
        let outcome = RankSolver::default().solve(&graph);

        for (_, score) in outcome.scores.iter() {
            assert!((score - 0.15 / 2.0).abs() < 1e-12);
        }
        assert_eq!(outcome.iterations, 2);
    }

    #[test]
    fn test_two_cycle_converges_symmetric() {
        let graph = graph_from(&[("a", "b"), ("b", "a")]);
        let outcome = RankSolver::default().solve(&graph);

        assert_eq!(outcome.scores.get("a"), outcome.scores.get("b"));
        assert!((outcome.scores.get("a").unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_iteration_cap_is_respected() {
        for seed in 0..20 {
            let rows = random_rows(seed, 60, 12);
            let (graph, _) = FollowerGraph::build(&rows, &FollowerSelection::Unrestricted);
            let outcome = RankSolver::default().solve(&graph);
            assert!(outcome.iterations <= 50);
            assert_eq!(outcome.scores.len(), graph.node_count());
        }

        let tight = RankSolver::new(PageRankConfig {
            tolerance: 0.0,
            ..PageRankConfig::default()
        });
        let graph = graph_from(&[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")]);
        let outcome = tight.solve(&graph);
        assert_eq!(outcome.iterations, 50);
        assert!(!outcome.converged);
    }

    #[test]
    fn test_mass_stays_bounded_every_iteration() {
        for seed in 0..10 {
            let rows = random_rows(seed, 40, 8);
            let (graph, _) = FollowerGraph::build(&rows, &FollowerSelection::Unrestricted);
            let solver = RankSolver::default();

            let n = graph.node_count();
            let mut scores = vec![1.0 / n as f64; n];
            let mut next = vec![0.0; n];

            for _ in 0..50 {
                solver.step(&graph, &scores, &mut next);
                std::mem::swap(&mut scores, &mut next);

                let mass: f64 = scores.iter().sum();
                assert!(mass <= 1.0 + 1e-9, "mass grew to {mass}");
                assert!(mass >= 0.15 - 1e-9, "mass fell to {mass}");
            }
        }
    }

    #[test]
    fn test_independent_runs_agree() {
        let rows = random_rows(7, 200, 15);
        let first = {
            let (graph, _) = FollowerGraph::build(&rows, &FollowerSelection::Unrestricted);
            RankSolver::default().solve(&graph)
        };

        let mut reversed = rows.clone();
        reversed.reverse();
        let (graph, _) = FollowerGraph::build(&reversed, &FollowerSelection::Unrestricted);
        let second = RankSolver::default().solve(&graph);

        assert_eq!(first.scores.len(), second.scores.len());
        for (account, score) in first.scores.iter() {
            let other = second.scores.get(account).unwrap();
            assert!((score - other).abs() < 1e-9, "{account}: {score} vs {other}");
        }
    }

    #[test]
    fn test_config_from_ranking_section() {
        let ranking = RankingConfig {
            damping: 0.9,
            max_iterations: 20,
            ..RankingConfig::default()
        };
        let config = PageRankConfig::from(&ranking);

        assert_eq!(config.damping, 0.9);
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.tolerance, 1e-6);
    }
}
