//! Ranking of scored candidates into match lists

use crate::index::{CandidateId, ClosestMatch};
use crate::query::scorer::ScoreMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One ranked result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match<D> {
    /// Matched key, original casing
    pub key: String,
    /// Payload associated with the key
    pub data: D,
    /// Accumulated n-gram score
    pub score: u64,
}

/// Matches ordered by descending score
pub type MatchList<D> = Vec<Match<D>>;

impl<D: Send + Sync> ClosestMatch<D> {
    /// Key of the best match, or `None` if no candidate shares an n-gram with
    /// the query.
    pub fn closest(&self, query: &str) -> Option<String> {
        let scores = self.score(query);
        scores
            .into_iter()
            .min_by(|a, b| self.compare_ranked(a, b))
            .map(|(id, _)| self.entries[id as usize].key.clone())
    }

    /// Up to `limit` best matches, best first. Fewer are returned when fewer
    /// candidates scored.
    pub fn closest_n(&self, query: &str, limit: usize) -> MatchList<D>
    where
        D: Clone,
    {
        if limit == 0 {
            return Vec::new();
        }
        let mut ranked: Vec<(CandidateId, u64)> = self.score(query).into_iter().collect();

        // Partition out the top `limit` before sorting only those
        if ranked.len() > limit {
            ranked.select_nth_unstable_by(limit - 1, |a, b| self.compare_ranked(a, b));
            ranked.truncate(limit);
        }
        ranked.sort_unstable_by(|a, b| self.compare_ranked(a, b));

        ranked
            .into_iter()
            .map(|(id, score)| self.to_match(id, score))
            .collect()
    }

    /// Turn a full score map into a match list
    pub fn rank(&self, scores: ScoreMap) -> MatchList<D>
    where
        D: Clone,
    {
        self.rank_ids(scores)
            .into_iter()
            .map(|(id, score)| self.to_match(id, score))
            .collect()
    }

    pub(crate) fn rank_ids(&self, scores: ScoreMap) -> Vec<(CandidateId, u64)> {
        let mut ranked: Vec<(CandidateId, u64)> = scores.into_iter().collect();
        ranked.sort_unstable_by(|a, b| self.compare_ranked(a, b));
        ranked
    }

    /// Higher score first; equal scores by key so results are reproducible
    fn compare_ranked(&self, a: &(CandidateId, u64), b: &(CandidateId, u64)) -> Ordering {
        b.1.cmp(&a.1).then_with(|| {
            self.entries[a.0 as usize]
                .key
                .cmp(&self.entries[b.0 as usize].key)
        })
    }

    fn to_match(&self, id: CandidateId, score: u64) -> Match<D>
    where
        D: Clone,
    {
        let entry = &self.entries[id as usize];
        Match {
            key: entry.key.clone(),
            data: entry.data.clone(),
            score,
        }
    }
}
