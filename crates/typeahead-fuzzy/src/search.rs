//! Branching subsequence search with offset recovery.
//!
//! [`FuzzySearch`] answers one question per candidate: of all the ways the
//! query's characters can appear, in order, inside the candidate, which
//! alignment scores best and which character offsets does it use? Unlike a
//! regex, which commits to one match, the search walks every viable
//! alignment so that `"doc"` against `"cargo doc --open"` lands on the
//! word-start run rather than the first scattered `d`/`o`/`c` it sees.
//!
//! The search keeps an explicit stack of partial alignments instead of
//! recursing, which keeps the expansion budget enforceable and the call
//! stack flat on adversarial inputs. Three layers keep the common case
//! cheap:
//!
//! 1. a compiled "characters in order, any gaps" regex rejects unrelated
//!    candidates before any real work;
//! 2. a shared [`SearchCache`] returns previously computed results;
//! 3. a per-candidate last-occurrence index prunes branches that can no
//!    longer consume the rest of the query.
//!
//! # Example
//!
//! ```
//! use typeahead_fuzzy::FuzzySearch;
//!
//! let search = FuzzySearch::new("doc");
//! let result = search.match_candidate("cargo doc --open");
//! assert!(result.is_match());
//! assert_eq!(result.offsets, vec![6, 7, 8]);
//! ```
//!
//! # Design Invariants
//!
//! 1. `offsets` in a successful result are strictly increasing character
//!    offsets, one per query character, all within the candidate.
//! 2. Matching is deterministic: identical inputs produce bit-identical
//!    results whether served from the cache or recomputed.
//! 3. Case folding is per character, so folded and original text stay in
//!    1:1 char correspondence and offsets remain valid for display.
//! 4. The engine never panics on any (query, candidate) pair; the only
//!    panic is constructing an engine with an empty query.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No alignment exists | [`MatchResult::NO_MATCH`] |
//! | Expansion budget exhausted | Best alignment found so far, debug event |
//! | Gate regex fails to compile | Pre-filter skipped, search still exact |
//! | Empty query | Panic at construction (caller bug) |

use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::cache::SearchCache;

/// Default upper bound on search-state expansions for one candidate.
///
/// Hard to reach without contrived input (one repeated character in both
/// query and candidate is the classic offender); when it is reached the
/// search stops exploring and keeps the best alignment found so far.
pub const DEFAULT_EXPANSION_CAP: usize = 10_000;

type Offsets = SmallVec<[u32; 16]>;

/// Score and matched character offsets for one candidate.
///
/// `{ score: 0.0, offsets: [] }` is the canonical "no match" value; anything
/// with a positive score carries exactly one offset per query character.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Relevance of the best alignment. Larger is better; `0.0` means the
    /// candidate is unrelated to the query.
    pub score: f32,
    /// Character offsets (not bytes) the best alignment matched, strictly
    /// increasing.
    pub offsets: Vec<u32>,
}

impl MatchResult {
    /// The canonical no-match result.
    pub const NO_MATCH: MatchResult = MatchResult {
        score: 0.0,
        offsets: Vec::new(),
    };

    /// Whether the candidate matched at all.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.score > 0.0
    }
}

/// One partial alignment on the work stack.
#[derive(Clone)]
struct Search {
    /// Next unscanned candidate position.
    candidate_offset: u32,
    /// Next unmatched query character.
    query_offset: u32,
    /// Candidate positions matched so far, strictly increasing.
    offsets: Offsets,
}

impl Search {
    fn root() -> Self {
        Self {
            candidate_offset: 0,
            query_offset: 0,
            offsets: SmallVec::new(),
        }
    }

    /// Split on a found occurrence: consume it, or skip past it and try a
    /// later occurrence of the same query character.
    fn branch(&self, offset: u32) -> (Search, Search) {
        let mut advanced = self.offsets.clone();
        advanced.push(offset);
        (
            Search {
                candidate_offset: offset + 1,
                query_offset: self.query_offset + 1,
                offsets: advanced,
            },
            Search {
                candidate_offset: offset + 1,
                query_offset: self.query_offset,
                offsets: self.offsets.clone(),
            },
        )
    }
}

/// Subsequence-alignment engine for a single query.
///
/// Built once per search pass (the query is fixed for the engine's life, so
/// the fold and the gate regex are computed once, not per candidate) and
/// reused across every candidate in that pass. Engines are cheap; the
/// expensive shared state lives in the injected [`SearchCache`].
#[derive(Debug)]
pub struct FuzzySearch {
    query: String,
    query_chars: Vec<char>,
    case_sensitive: bool,
    expansion_cap: usize,
    gate: Option<Regex>,
    cache: Arc<SearchCache>,
}

impl FuzzySearch {
    /// Create a case-insensitive engine with a private cache.
    ///
    /// Use [`with_cache`](Self::with_cache) to share one cache across
    /// engines; that is the intended production setup.
    ///
    /// # Panics
    ///
    /// Panics if `query` is empty. The empty query means "show everything"
    /// and is handled upstream, before an engine exists.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self::build(
            query.into(),
            false,
            DEFAULT_EXPANSION_CAP,
            Arc::new(SearchCache::default()),
        )
    }

    /// Toggle case-sensitive matching. Rebuilds the folded query and gate.
    #[must_use]
    pub fn case_sensitive(self, case_sensitive: bool) -> Self {
        Self::build(self.query, case_sensitive, self.expansion_cap, self.cache)
    }

    /// Share a cache with other engines.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SearchCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Override the expansion budget.
    #[must_use]
    pub fn with_expansion_cap(mut self, cap: usize) -> Self {
        self.expansion_cap = cap;
        self
    }

    fn build(
        query: String,
        case_sensitive: bool,
        expansion_cap: usize,
        cache: Arc<SearchCache>,
    ) -> Self {
        assert!(!query.is_empty(), "FuzzySearch requires a non-empty query");
        let query_chars: Vec<char> = if case_sensitive {
            query.chars().collect()
        } else {
            query.chars().map(fold_char).collect()
        };
        let gate = build_gate(&query, case_sensitive);
        Self {
            query,
            query_chars,
            case_sensitive,
            expansion_cap,
            gate,
            cache,
        }
    }

    /// The query this engine was built for.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    #[must_use]
    pub fn expansion_cap(&self) -> usize {
        self.expansion_cap
    }

    /// Handle to the cache this engine consults.
    #[must_use]
    pub fn cache(&self) -> Arc<SearchCache> {
        Arc::clone(&self.cache)
    }

    /// Find the best-scoring alignment of the query inside `candidate`.
    ///
    /// Unrelated candidates are rejected by the gate regex without touching
    /// the cache; everything else is served from the cache or computed and
    /// cached, including the no-match outcome.
    pub fn match_candidate(&self, candidate: &str) -> MatchResult {
        if let Some(gate) = &self.gate
            && !gate.is_match(candidate)
        {
            return MatchResult::NO_MATCH;
        }
        if let Some(cached) = self.cache.get(&self.query, candidate, self.case_sensitive) {
            return cached;
        }
        let result = self.search(candidate);
        self.cache
            .insert(&self.query, candidate, self.case_sensitive, result.clone());
        result
    }

    fn search(&self, candidate: &str) -> MatchResult {
        let candidate_chars: Vec<char> = if self.case_sensitive {
            candidate.chars().collect()
        } else {
            candidate.chars().map(fold_char).collect()
        };
        let query = &self.query_chars;
        let word_starts = word_starts(&candidate_chars);
        let last_seen = last_occurrences(&candidate_chars);

        let mut best_score = 0.0f32;
        let mut best_offsets: Option<Offsets> = None;

        let mut stack: Vec<Search> = vec![Search::root()];
        let mut remaining = self.expansion_cap;

        while let Some(state) = stack.pop() {
            if remaining == 0 {
                debug!(
                    query = %self.query,
                    cap = self.expansion_cap,
                    "expansion budget exhausted; keeping best alignment found so far"
                );
                break;
            }
            remaining -= 1;

            let wanted = query[state.query_offset as usize];
            let start = state.candidate_offset as usize;
            let Some(found) = candidate_chars[start..].iter().position(|&c| c == wanted) else {
                continue;
            };
            let offset = (start + found) as u32;

            // A branch is only worth extending if every remaining query
            // character still occurs somewhere at or after this point.
            let reachable = query[state.query_offset as usize..].iter().all(|c| {
                last_seen
                    .get(c)
                    .is_some_and(|&last| last >= state.candidate_offset)
            });
            if !reachable {
                continue;
            }

            let (advance, skip) = state.branch(offset);
            if advance.query_offset as usize == query.len() {
                let score = score_alignment(&advance.offsets, &word_starts);
                if score > best_score {
                    best_score = score;
                    best_offsets = Some(advance.offsets);
                }
                stack.push(skip);
            } else {
                stack.push(skip);
                stack.push(advance);
            }
        }

        match best_offsets {
            Some(offsets) => MatchResult {
                score: best_score,
                offsets: offsets.into_vec(),
            },
            None => MatchResult::NO_MATCH,
        }
    }
}

/// Score one completed alignment.
///
/// Each matched character is worth one point, plus one more when it lands on
/// a word start. The total is then scaled by how contiguous the alignment
/// is: a single unbroken run doubles its score, while maximally scattered
/// offsets gain almost nothing.
fn score_alignment(offsets: &[u32], word_starts: &[bool]) -> f32 {
    let offset_count = offsets.len() as f32;
    let word_start_hits = offsets
        .iter()
        .filter(|&&offset| word_starts[offset as usize])
        .count() as f32;
    let mut score = offset_count + word_start_hits;
    let groups = group_count(offsets) as f32;
    let normalized_groups = (offset_count - (groups - 1.0)) / offset_count;
    score *= 1.0 + normalized_groups * normalized_groups;
    score
}

/// Number of maximal contiguous runs in a non-empty offset list.
fn group_count(offsets: &[u32]) -> u32 {
    let mut groups = 1;
    for pair in offsets.windows(2) {
        if pair[1] != pair[0] + 1 {
            groups += 1;
        }
    }
    groups
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Flags marking the first character of every maximal word-character run.
fn word_starts(chars: &[char]) -> Vec<bool> {
    let mut starts = vec![false; chars.len()];
    let mut in_word = false;
    for (i, &c) in chars.iter().enumerate() {
        let word = is_word_char(c);
        if word && !in_word {
            starts[i] = true;
        }
        in_word = word;
    }
    starts
}

/// Last occurrence of each character, for reachability pruning.
fn last_occurrences(chars: &[char]) -> FxHashMap<char, u32> {
    let mut last = FxHashMap::default();
    for (i, &c) in chars.iter().enumerate() {
        last.insert(c, i as u32);
    }
    last
}

/// Lowercase fold that keeps a 1:1 char correspondence.
///
/// The handful of code points whose full lowercase expands to multiple
/// characters keep only the first, so offsets computed on the folded text
/// stay valid for the original.
fn fold_char(c: char) -> char {
    if c.is_ascii() {
        c.to_ascii_lowercase()
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

/// "Characters in order, arbitrary gaps" pre-filter.
///
/// Compile failure (only reachable via a pathologically long query) just
/// disables the pre-filter; matching stays exact without it.
fn build_gate(query: &str, case_sensitive: bool) -> Option<Regex> {
    let mut pattern = String::with_capacity(query.len() * 4);
    let mut buf = [0u8; 4];
    for (i, c) in query.chars().enumerate() {
        if i > 0 {
            pattern.push_str(".*?");
        }
        pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
    }
    match RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(gate) => Some(gate),
        Err(err) => {
            debug!(%err, "gate pattern failed to compile; skipping pre-filter");
            None
        }
    }
}
