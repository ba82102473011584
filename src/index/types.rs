use crate::error::{MatchError, Result};
use serde::{Deserialize, Serialize};

/// Identifier of one dictionary entry, assigned sequentially at build time
pub type CandidateId = u32;

/// Default n-gram lengths
pub const DEFAULT_SUBSTRING_SIZES: [usize; 2] = [2, 3];

/// Default number of scoring workers
pub const DEFAULT_WORKERS: usize = 8;

/// One dictionary entry as stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry<D> {
    /// Original key, case preserved
    pub key: String,
    /// Number of distinct substrings the key produced
    pub substring_count: usize,
    /// Payload carried through to results
    pub data: D,
}

/// Index build and query configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// N-gram lengths used to split keys and queries
    #[serde(default = "default_substring_sizes")]
    pub substring_sizes: Vec<usize>,

    /// Number of scoring worker threads. 0 means one per CPU.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_substring_sizes() -> Vec<usize> {
    DEFAULT_SUBSTRING_SIZES.to_vec()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            substring_sizes: default_substring_sizes(),
            workers: default_workers(),
        }
    }
}

impl MatchConfig {
    pub fn new(substring_sizes: Vec<usize>) -> Self {
        Self {
            substring_sizes,
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Reject an empty size list or a zero-length n-gram
    pub fn validate(&self) -> Result<()> {
        validate_sizes(&self.substring_sizes)
    }
}

pub(crate) fn validate_sizes(sizes: &[usize]) -> Result<()> {
    if sizes.is_empty() {
        return Err(MatchError::InvalidSubstringSize(
            "at least one size is required".to_string(),
        ));
    }
    if sizes.contains(&0) {
        return Err(MatchError::InvalidSubstringSize(format!(
            "sizes must be positive, got {:?}",
            sizes
        )));
    }
    Ok(())
}
