//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`app_data`] - Application data directory and config file (XDG-compliant)
//! - [`ngram`] - Multi-size n-gram splitting for keys and queries
//! - [`progress`] - Progress bars that compile away without the `progress` feature
//! - [`wordlist`] - Word list parsing for the `index` command
//!
//! ## Key Functions
//!
//! ```
//! use closest::utils::split_word;
//!
//! let ngrams = split_word("paris", &[3]);
//! // Contains: "par", "ari", "ris"
//! assert_eq!(ngrams.len(), 3);
//! ```

pub mod app_data;
pub mod ngram;
pub mod progress;
pub mod wordlist;

pub use app_data::*;
pub use ngram::*;
pub use wordlist::*;
