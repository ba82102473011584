//! Swappable handle to the live index.
//!
//! Queries take a cheap `Arc` snapshot of the current index under a short read
//! lock and then score without holding any lock. Rebuilds and reloads install
//! a whole new index under the write lock; queries already running finish on
//! the index they started with.

use crate::error::{MatchError, Result};
use crate::index::build::ClosestMatch;
use crate::query::MatchList;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct SharedIndex<D> {
    current: RwLock<Option<Arc<ClosestMatch<D>>>>,
}

impl<D> Default for SharedIndex<D> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<D> SharedIndex<D> {
    /// A handle with no index installed; queries fail with
    /// [`MatchError::Uninitialized`] until one is.
    pub fn empty() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn new(index: ClosestMatch<D>) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(index))),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    /// The index queries should currently use
    pub fn current(&self) -> Result<Arc<ClosestMatch<D>>> {
        self.current.read().clone().ok_or(MatchError::Uninitialized)
    }

    /// Install `index`, returning the one it replaced
    pub fn replace(&self, index: ClosestMatch<D>) -> Option<Arc<ClosestMatch<D>>> {
        self.current.write().replace(Arc::new(index))
    }
}

impl<D: Send + Sync> SharedIndex<D> {
    pub fn closest(&self, query: &str) -> Result<Option<String>> {
        Ok(self.current()?.closest(query))
    }

    pub fn closest_n(&self, query: &str, limit: usize) -> Result<MatchList<D>>
    where
        D: Clone,
    {
        Ok(self.current()?.closest_n(query, limit))
    }
}

impl<D: DeserializeOwned + Send + Sync> SharedIndex<D> {
    /// Load a snapshot and swap it in. On failure the previous index stays
    /// installed.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        // Decode outside the lock; only the swap is exclusive
        let index = ClosestMatch::load(path)?;
        let candidates = index.len();
        self.replace(index);
        info!(path = %path.display(), candidates, "reloaded index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn index(keys: &[&str]) -> ClosestMatch<usize> {
        ClosestMatch::new(
            keys.iter().enumerate().map(|(i, k)| (k.to_string(), i)),
            &[2, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_handle_rejects_queries() {
        let shared = SharedIndex::<usize>::empty();
        assert!(!shared.is_initialized());
        assert!(matches!(shared.closest("x"), Err(MatchError::Uninitialized)));
        assert!(matches!(shared.closest_n("x", 3), Err(MatchError::Uninitialized)));
    }

    #[test]
    fn test_replace_swaps_whole_index() {
        let shared = SharedIndex::new(index(&["Lisbon", "Madrid"]));
        assert_eq!(shared.closest("lisbn").unwrap().as_deref(), Some("Lisbon"));

        let old = shared.replace(index(&["Vienna"])).unwrap();
        assert_eq!(old.len(), 2);
        assert_eq!(shared.closest("lisbn").unwrap(), None);
        assert_eq!(shared.closest("vienn").unwrap().as_deref(), Some("Vienna"));
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let shared = SharedIndex::new(index(&["Lisbon"]));
        let held = shared.current().unwrap();
        shared.replace(index(&["Vienna"]));
        // An in-flight query keeps its own index
        assert_eq!(held.closest("lisbon").as_deref(), Some("Lisbon"));
    }

    #[test]
    fn test_failed_reload_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let shared = SharedIndex::new(index(&["Lisbon"]));
        assert!(shared.reload(dir.path().join("missing.gz")).is_err());
        assert_eq!(shared.closest("lisbon").unwrap().as_deref(), Some("Lisbon"));
    }

    #[test]
    fn test_reload_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json.gz");
        index(&["Vienna", "Venice"]).save(&path).unwrap();

        let shared = SharedIndex::<usize>::empty();
        shared.reload(&path).unwrap();
        assert!(shared.is_initialized());
        assert_eq!(shared.closest("venice").unwrap().as_deref(), Some("Venice"));
    }

    #[test]
    fn test_concurrent_queries() {
        let shared = Arc::new(SharedIndex::new(index(&["Lisbon", "Madrid", "Porto"])));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..20 {
                        assert_eq!(shared.closest("madrdi").unwrap().as_deref(), Some("Madrid"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
