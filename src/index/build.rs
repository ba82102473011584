use crate::error::{MatchError, Result};
use crate::index::types::{CandidateEntry, CandidateId, MatchConfig};
use crate::utils::split_lowercase;
use rayon::prelude::*;
use rayon::ThreadPool;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A built n-gram index over a fixed dictionary.
///
/// Maps every substring seen in any key to the (sorted) ids of the keys that
/// contain it, and every id to its entry. Read-only once built; queries may
/// run concurrently from any number of threads.
#[derive(Clone)]
pub struct ClosestMatch<D> {
    pub(crate) substring_sizes: Vec<usize>,
    pub(crate) substring_to_ids: FxHashMap<String, Vec<CandidateId>>,
    pub(crate) entries: Vec<CandidateEntry<D>>,
    pub(crate) workers: usize,
    /// Scoring pool, shared by clones and reused across queries
    pub(crate) pool: Arc<ThreadPool>,
}

impl<D: Send + Sync> ClosestMatch<D> {
    /// Build an index from `(key, payload)` pairs using the given n-gram sizes
    /// and the default worker count.
    ///
    /// Ids are assigned in iteration order, so an ordered input (a `Vec` or
    /// `BTreeMap`) gives reproducible ids.
    pub fn new<I, K>(candidates: I, substring_sizes: &[usize]) -> Result<Self>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
    {
        Self::with_config(candidates, &MatchConfig::new(substring_sizes.to_vec()))
    }

    /// Build an index with an explicit configuration
    pub fn with_config<I, K>(candidates: I, config: &MatchConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
    {
        config.validate()?;
        let start = Instant::now();

        let candidates: Vec<(String, D)> = candidates
            .into_iter()
            .map(|(key, data)| (key.into(), data))
            .collect();

        let mut seen = FxHashSet::default();
        for (key, _) in &candidates {
            if !seen.insert(key.as_str()) {
                return Err(MatchError::DuplicateKey(key.clone()));
            }
        }

        // Splitting is the expensive part; do it in parallel, order preserved
        let sizes = &config.substring_sizes;
        let splits: Vec<FxHashSet<String>> = candidates
            .par_iter()
            .map(|(key, _)| split_lowercase(key, sizes))
            .collect();

        let mut substring_to_ids: FxHashMap<String, Vec<CandidateId>> = FxHashMap::default();
        let mut entries = Vec::with_capacity(candidates.len());

        for (idx, ((key, data), substrings)) in candidates.into_iter().zip(splits).enumerate() {
            let id = idx as CandidateId;
            let substring_count = substrings.len();
            // Ids only grow, so every posting list stays sorted
            for substring in substrings {
                substring_to_ids.entry(substring).or_default().push(id);
            }
            entries.push(CandidateEntry {
                key,
                substring_count,
                data,
            });
        }

        let index = Self::from_parts(
            config.substring_sizes.clone(),
            substring_to_ids,
            entries,
            config.workers,
        )?;

        debug!(
            candidates = index.len(),
            substrings = index.substring_to_ids.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built index"
        );

        Ok(index)
    }

    pub(crate) fn from_parts(
        substring_sizes: Vec<usize>,
        substring_to_ids: FxHashMap<String, Vec<CandidateId>>,
        entries: Vec<CandidateEntry<D>>,
        workers: usize,
    ) -> Result<Self> {
        Ok(Self {
            substring_sizes,
            substring_to_ids,
            entries,
            workers,
            pool: build_pool(workers)?,
        })
    }

    /// Replace the scoring pool with one of `workers` threads (0 = one per CPU)
    pub fn with_workers(mut self, workers: usize) -> Result<Self> {
        self.pool = build_pool(workers)?;
        self.workers = workers;
        Ok(self)
    }
}

impl<D> ClosestMatch<D> {
    /// Number of candidates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// N-gram lengths the index was built with
    pub fn substring_sizes(&self) -> &[usize] {
        &self.substring_sizes
    }

    /// Configured scoring worker count
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn config(&self) -> MatchConfig {
        MatchConfig {
            substring_sizes: self.substring_sizes.clone(),
            workers: self.workers,
        }
    }

    /// Entry for an id, if it exists
    pub fn get(&self, id: CandidateId) -> Option<&CandidateEntry<D>> {
        self.entries.get(id as usize)
    }

    /// All entries in id order
    pub fn entries(&self) -> impl Iterator<Item = (CandidateId, &CandidateEntry<D>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(id, entry)| (id as CandidateId, entry))
    }

    /// Ids of the candidates containing `substring` (empty if unseen)
    pub fn postings(&self, substring: &str) -> &[CandidateId] {
        self.substring_to_ids
            .get(substring)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl<D> fmt::Debug for ClosestMatch<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosestMatch")
            .field("substring_sizes", &self.substring_sizes)
            .field("candidates", &self.entries.len())
            .field("substrings", &self.substring_to_ids.len())
            .field("workers", &self.workers)
            .finish()
    }
}

fn build_pool(workers: usize) -> Result<Arc<ThreadPool>> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("closest-score-{}", i))
        .build()
        .map(Arc::new)
        .map_err(|e| MatchError::ThreadPool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn cities() -> Vec<(&'static str, u32)> {
        vec![("New York", 1), ("New Orleans", 2), ("Boston", 3)]
    }

    #[test]
    fn test_ids_follow_input_order() {
        let index = ClosestMatch::new(cities(), &[2, 3]).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(0).unwrap().key, "New York");
        assert_eq!(index.get(2).unwrap().data, 3);
        assert!(index.get(3).is_none());
    }

    #[test]
    fn test_postings_are_lowercase_and_sorted() {
        let index = ClosestMatch::new(cities(), &[2, 3]).unwrap();
        assert_eq!(index.postings("new"), &[0, 1]);
        assert_eq!(index.postings("bos"), &[2]);
        assert!(index.postings("New").is_empty());
        assert!(index.postings("zzz").is_empty());
    }

    #[test]
    fn test_substring_count_recorded() {
        let index = ClosestMatch::new(vec![("abcd", ())], &[2, 3]).unwrap();
        assert_eq!(index.get(0).unwrap().substring_count, 5);
    }

    #[test]
    fn test_every_entry_is_reachable() {
        let index = ClosestMatch::new(vec![("a", 0), ("Boston", 1), ("", 2)], &[2, 3]).unwrap();
        for (id, _) in index.entries() {
            assert!(index.substring_to_ids.values().any(|ids| ids.contains(&id)));
        }
        // Short keys fall back to themselves
        assert_eq!(index.postings("a"), &[0]);
        assert_eq!(index.postings(""), &[2]);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = ClosestMatch::new(vec![("Paris", 1), ("Paris", 2)], &[2]);
        assert!(matches!(result, Err(MatchError::DuplicateKey(k)) if k == "Paris"));
    }

    #[test]
    fn test_keys_differing_only_in_case_are_distinct() {
        let index = ClosestMatch::new(vec![("Paris", 1), ("paris", 2)], &[2]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.postings("pa"), &[0, 1]);
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert!(matches!(
            ClosestMatch::new(cities(), &[]),
            Err(MatchError::InvalidSubstringSize(_))
        ));
        assert!(matches!(
            ClosestMatch::new(cities(), &[0]),
            Err(MatchError::InvalidSubstringSize(_))
        ));
    }

    #[test]
    fn test_empty_dictionary_is_legal() {
        let index = ClosestMatch::<u32>::new(BTreeMap::<String, u32>::new(), &[2, 3]).unwrap();
        assert!(index.is_empty());
        assert!(index.substring_to_ids.is_empty());
    }

    #[test]
    fn test_with_workers() {
        let index = ClosestMatch::new(cities(), &[2, 3])
            .unwrap()
            .with_workers(2)
            .unwrap();
        assert_eq!(index.workers(), 2);
        assert_eq!(index.pool.current_num_threads(), 2);
        assert_eq!(index.config().substring_sizes, vec![2, 3]);
    }
}
