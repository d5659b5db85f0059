//! Query façade pairing the search engine with an emphasis token.
//!
//! [`Matcher`] is what widget code holds: one value that answers both "how
//! well does this candidate match?" and "which pieces of it should render
//! emphasized?". The emphasis token is opaque to this crate; callers pass
//! whatever their renderer understands (a style handle, an ANSI sequence, a
//! theme key) and get it back by reference on the emphasized fragments.
//!
//! ```
//! use typeahead_fuzzy::Matcher;
//!
//! let matcher = Matcher::new("ss", "bold");
//! let fragments = matcher.highlight("sessions");
//! let emphasized: String = fragments
//!     .iter()
//!     .filter(|fragment| fragment.emphasis.is_some())
//!     .map(|fragment| fragment.text)
//!     .collect();
//! assert_eq!(emphasized, "ss");
//! ```

use std::sync::Arc;

use crate::cache::SearchCache;
use crate::search::{FuzzySearch, MatchResult};

/// One run of candidate text, either plain or emphasized.
///
/// Fragments of a candidate are contiguous and reassemble it exactly;
/// `emphasis` borrows the matcher's token for runs of matched characters.
#[derive(Debug, PartialEq)]
pub struct Fragment<'a, S> {
    pub text: &'a str,
    pub emphasis: Option<&'a S>,
}

// Derived impls would demand S: Clone / S: Copy even though only a
// reference to S is held.
impl<S> Clone for Fragment<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Fragment<'_, S> {}

/// Scoring and highlighting for one query.
///
/// Thin wrapper over [`FuzzySearch`]; construction cost and cache behavior
/// are the engine's. `S` is the emphasis token handed back on highlighted
/// fragments.
#[derive(Debug)]
pub struct Matcher<S> {
    emphasis: S,
    search: FuzzySearch,
}

impl<S> Matcher<S> {
    /// Create a case-insensitive matcher.
    ///
    /// # Panics
    ///
    /// Panics if `query` is empty, as [`FuzzySearch::new`] does.
    #[must_use]
    pub fn new(query: impl Into<String>, emphasis: S) -> Self {
        Self {
            emphasis,
            search: FuzzySearch::new(query),
        }
    }

    /// Toggle case-sensitive matching.
    #[must_use]
    pub fn case_sensitive(self, case_sensitive: bool) -> Self {
        Self {
            emphasis: self.emphasis,
            search: self.search.case_sensitive(case_sensitive),
        }
    }

    /// Share a result cache with other matchers and engines.
    #[must_use]
    pub fn with_cache(self, cache: Arc<SearchCache>) -> Self {
        Self {
            emphasis: self.emphasis,
            search: self.search.with_cache(cache),
        }
    }

    /// The query this matcher was built for.
    #[must_use]
    pub fn query(&self) -> &str {
        self.search.query()
    }

    /// The emphasis token applied to matched runs.
    #[must_use]
    pub fn emphasis(&self) -> &S {
        &self.emphasis
    }

    /// Relevance score for `candidate`; `0.0` means no match.
    pub fn match_score(&self, candidate: &str) -> f32 {
        self.search.match_candidate(candidate).score
    }

    /// Full match result, including the matched character offsets.
    pub fn match_candidate(&self, candidate: &str) -> MatchResult {
        self.search.match_candidate(candidate)
    }

    /// Split `candidate` into plain and emphasized fragments.
    ///
    /// A non-matching candidate comes back as one plain fragment; an empty
    /// candidate as no fragments. Contiguous matched characters merge into
    /// a single emphasized fragment.
    pub fn highlight<'a>(&'a self, candidate: &'a str) -> Vec<Fragment<'a, S>> {
        let result = self.search.match_candidate(candidate);
        split_fragments(candidate, &result.offsets, &self.emphasis)
    }
}

/// Cut `candidate` at the boundaries of matched character runs.
fn split_fragments<'a, S>(
    candidate: &'a str,
    offsets: &[u32],
    emphasis: &'a S,
) -> Vec<Fragment<'a, S>> {
    if candidate.is_empty() {
        return Vec::new();
    }
    if offsets.is_empty() {
        return vec![Fragment {
            text: candidate,
            emphasis: None,
        }];
    }

    // Byte position of each char, with an end sentinel, so char-offset
    // runs slice cleanly through multi-byte text.
    let byte_at: Vec<usize> = candidate
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(candidate.len()))
        .collect();

    let mut fragments = Vec::new();
    let mut plain_from = 0usize;
    let mut run = 0usize;
    while run < offsets.len() {
        let start = offsets[run] as usize;
        let mut end = start + 1;
        while run + 1 < offsets.len() && offsets[run + 1] as usize == end {
            run += 1;
            end += 1;
        }
        run += 1;

        if plain_from < start {
            fragments.push(Fragment {
                text: &candidate[byte_at[plain_from]..byte_at[start]],
                emphasis: None,
            });
        }
        fragments.push(Fragment {
            text: &candidate[byte_at[start]..byte_at[end]],
            emphasis: Some(emphasis),
        });
        plain_from = end;
    }
    if byte_at[plain_from] < candidate.len() {
        fragments.push(Fragment {
            text: &candidate[byte_at[plain_from]..],
            emphasis: None,
        });
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Scoring ─────────────────────────────────────────────────────────

    #[test]
    fn scores_match_the_underlying_engine() {
        let matcher = Matcher::new("abc", ());
        assert_eq!(matcher.match_score("xxabcxx"), 6.0);
        assert_eq!(matcher.match_score("hello"), 0.0);
    }

    #[test]
    fn match_candidate_exposes_offsets() {
        let matcher = Matcher::new("doc", ());
        let result = matcher.match_candidate("cargo doc --open");
        assert_eq!(result.offsets, vec![6, 7, 8]);
    }

    #[test]
    fn case_sensitive_builder_reaches_the_engine() {
        let matcher = Matcher::new("ABC", ()).case_sensitive(true);
        assert_eq!(matcher.match_score("xxabcxx"), 0.0);
        assert!(matcher.match_score("xxABCxx") > 0.0);
    }

    #[test]
    fn matchers_share_an_injected_cache() {
        let cache = Arc::new(SearchCache::new(16));
        let first = Matcher::new("abc", ()).with_cache(Arc::clone(&cache));
        let second = Matcher::new("abc", ()).with_cache(Arc::clone(&cache));
        let _ = first.match_score("xxabcxx");
        let _ = second.match_score("xxabcxx");
        assert_eq!(cache.stats().hits, 1);
    }

    // ── Highlighting ────────────────────────────────────────────────────

    #[test]
    fn scattered_matches_emphasize_each_character() {
        let matcher = Matcher::new("abc", "em");
        let fragments = matcher.highlight("a-b-c");
        assert_eq!(
            fragments,
            vec![
                Fragment { text: "a", emphasis: Some(&"em") },
                Fragment { text: "-", emphasis: None },
                Fragment { text: "b", emphasis: Some(&"em") },
                Fragment { text: "-", emphasis: None },
                Fragment { text: "c", emphasis: Some(&"em") },
            ]
        );
    }

    #[test]
    fn contiguous_matches_merge_into_one_fragment() {
        let matcher = Matcher::new("abc", "em");
        let fragments = matcher.highlight("xxabcxx");
        assert_eq!(
            fragments,
            vec![
                Fragment { text: "xx", emphasis: None },
                Fragment { text: "abc", emphasis: Some(&"em") },
                Fragment { text: "xx", emphasis: None },
            ]
        );
    }

    #[test]
    fn non_matching_candidate_is_one_plain_fragment() {
        let matcher = Matcher::new("xyz", "em");
        let fragments = matcher.highlight("hello");
        assert_eq!(
            fragments,
            vec![Fragment { text: "hello", emphasis: None }]
        );
    }

    #[test]
    fn empty_candidate_has_no_fragments() {
        let matcher = Matcher::new("a", "em");
        assert!(matcher.highlight("").is_empty());
    }

    #[test]
    fn fragments_reassemble_multibyte_candidates() {
        let matcher = Matcher::new("é", "em");
        let fragments = matcher.highlight("héllo");
        assert_eq!(
            fragments,
            vec![
                Fragment { text: "h", emphasis: None },
                Fragment { text: "é", emphasis: Some(&"em") },
                Fragment { text: "llo", emphasis: None },
            ]
        );
        let rebuilt: String = fragments.iter().map(|fragment| fragment.text).collect();
        assert_eq!(rebuilt, "héllo");
    }

    #[test]
    fn match_at_candidate_end_has_no_trailing_fragment() {
        let matcher = Matcher::new("lo", "em");
        let fragments = matcher.highlight("hello");
        assert_eq!(
            fragments,
            vec![
                Fragment { text: "hel", emphasis: None },
                Fragment { text: "lo", emphasis: Some(&"em") },
            ]
        );
    }

    // ── Emphasis token ──────────────────────────────────────────────────

    #[test]
    fn emphasis_token_needs_no_trait_bounds() {
        struct Theme;
        let matcher = Matcher::new("a", Theme);
        let fragments = matcher.highlight("abc");
        assert!(fragments[0].emphasis.is_some());
        // Fragments stay Copy no matter what S is.
        let copied = fragments[0];
        assert_eq!(copied.text, fragments[0].text);
    }

    #[test]
    fn emphasis_accessor_returns_the_token() {
        let matcher = Matcher::new("a", 7u8);
        assert_eq!(*matcher.emphasis(), 7);
    }
}
