//! Scoring module for fuzzy lookups
//!
//! A query is split into n-grams exactly like the keys were. Each distinct
//! query n-gram is an independent job: it reads one posting list and produces
//! a partial score map. Jobs run on the index's worker pool and the partial
//! maps are summed into one total per candidate.
//!
//! Per matching candidate, one n-gram contributes
//! `1 + SCORE_SCALE / key_len + SCORE_SCALE / posting_len`:
//! - rarer n-grams (short posting lists) weigh more
//! - shorter keys gain more per shared n-gram

use crate::index::{CandidateId, ClosestMatch};
use crate::utils::split_lowercase;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::time::Instant;
use tracing::trace;

/// Numerator of both the rarity weight and the key-length bonus
pub const SCORE_SCALE: u64 = 1000;

/// Accumulated score per candidate
pub type ScoreMap = FxHashMap<CandidateId, u64>;

impl<D: Send + Sync> ClosestMatch<D> {
    /// Score every candidate sharing at least one n-gram with `query`.
    ///
    /// Candidates absent from the map scored zero. Scores are sums over
    /// n-grams, so the order in which workers finish does not matter.
    pub fn score(&self, query: &str) -> ScoreMap {
        let start = Instant::now();
        let substrings: Vec<String> = split_lowercase(query, &self.substring_sizes)
            .into_iter()
            .collect();

        let scores = self.pool.install(|| {
            substrings
                .par_iter()
                .map(|substring| self.substring_scores(substring))
                .reduce(ScoreMap::default, merge_scores)
        });

        trace!(
            query,
            substrings = substrings.len(),
            matched = scores.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "scored query"
        );

        scores
    }

    /// Scores keyed by candidate key, highest first; for diagnostics
    pub fn scores(&self, query: &str) -> Vec<(String, u64)> {
        self.rank_ids(self.score(query))
            .into_iter()
            .map(|(id, score)| (self.entries[id as usize].key.clone(), score))
            .collect()
    }

    /// Contribution of a single query n-gram
    fn substring_scores(&self, substring: &str) -> ScoreMap {
        let ids = self.postings(substring);
        if ids.is_empty() {
            return ScoreMap::default();
        }

        let weight = SCORE_SCALE / ids.len() as u64;
        ids.iter()
            .map(|&id| {
                let key_len = self.entries[id as usize].key.len().max(1) as u64;
                (id, 1 + SCORE_SCALE / key_len + weight)
            })
            .collect()
    }
}

/// Sum `partial` into `acc`, folding the smaller map into the larger one
fn merge_scores(mut acc: ScoreMap, mut partial: ScoreMap) -> ScoreMap {
    if acc.len() < partial.len() {
        std::mem::swap(&mut acc, &mut partial);
    }
    for (id, score) in partial {
        *acc.entry(id).or_insert(0) += score;
    }
    acc
}
