//! Score vectors, min-max normalization and leader selection

use super::graph::AccountId;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;

/// Upper end of the presentation range
pub const SCORE_SCALE: f64 = 100.0;

/// Score per account.
///
/// Keeps the graph's node order, which is also the tie-break order for
/// leaders. Keys are unique when built from a graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreVector {
    entries: Vec<(AccountId, f64)>,
}

impl ScoreVector {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Linear lookup by account
    pub fn get(&self, account: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(id, _)| id == account)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(id, score)| (id.as_str(), *score))
    }

    /// `(min, max)` over all scores, `None` when empty
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.entries.iter().fold(None, |acc, &(_, score)| match acc {
            None => Some((score, score)),
            Some((min, max)) => Some((min.min(score), max.max(score))),
        })
    }
}

impl FromIterator<(AccountId, f64)> for ScoreVector {
    fn from_iter<I: IntoIterator<Item = (AccountId, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ScoreVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (account, score) in &self.entries {
            map.serialize_entry(account, score)?;
        }
        map.end()
    }
}

/// Rescale onto `[0, SCORE_SCALE]` with min-max scaling.
///
/// When every score is equal (including the empty and single-account
/// cases) the input is returned unchanged.
pub fn normalize(raw: ScoreVector) -> ScoreVector {
    let Some((min, max)) = raw.bounds() else {
        return raw;
    };

    let range = max - min;
    if !(range > 0.0) {
        return raw;
    }

    raw.entries
        .into_iter()
        .map(|(account, score)| (account, (score - min) / range * SCORE_SCALE))
        .collect()
}

/// Highest `limit` scores, descending; ties keep node order
pub fn top_n(scores: &ScoreVector, limit: usize) -> Vec<(AccountId, f64)> {
    let mut ranked: Vec<(AccountId, f64)> = scores.entries.clone();

    // Stable sort keeps enumeration order among equal scores
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);
    ranked
}
