//! # closest - bag-of-substrings fuzzy matching
//!
//! Resolves free-text input to one of a fixed set of known keys. Keys and
//! queries are split into n-grams of several sizes; a candidate's score is
//! the sum, over the n-grams it shares with the query, of a weight that favors
//! rare n-grams and short keys.
//!
//! ## Architecture
//!
//! - [`index`] - Index building, snapshots (gzip + JSON), swappable handle
//! - [`query`] - Parallel scoring and ranking
//! - [`accuracy`] - Mutation-based self test for tuning n-gram sizes
//! - [`output`] - Result formatting for the CLI
//! - [`utils`] - N-gram splitting, config, word lists
//!
//! ## Quick Start
//!
//! ```
//! use closest::ClosestMatch;
//!
//! let index = ClosestMatch::new(
//!     vec![("New York", 'A'), ("New Orleans", 'B'), ("Boston", 'C')],
//!     &[2, 3],
//! )
//! .unwrap();
//!
//! assert_eq!(index.closest("New Yrok").as_deref(), Some("New York"));
//!
//! for m in index.closest_n("new", 2) {
//!     println!("{} {} {}", m.key, m.data, m.score);
//! }
//! ```

pub mod accuracy;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;

pub use error::{MatchError, Result};
pub use index::{CandidateEntry, CandidateId, ClosestMatch, IndexStats, MatchConfig, SharedIndex};
pub use query::{Match, MatchList};
