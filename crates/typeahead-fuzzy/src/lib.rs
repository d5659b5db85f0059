#![forbid(unsafe_code)]

//! Fuzzy subsequence matching for dropdown completion.
//!
//! [`FuzzySearch`] finds the best-scoring alignment of a query's characters
//! inside a candidate, [`Matcher`] pairs it with an opaque emphasis token
//! for highlighting, and [`SearchCache`] memoizes results across engines.

pub mod cache;
pub mod matcher;
pub mod search;

pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY, SearchCache};
pub use matcher::{Fragment, Matcher};
pub use search::{DEFAULT_EXPANSION_CAP, FuzzySearch, MatchResult};
