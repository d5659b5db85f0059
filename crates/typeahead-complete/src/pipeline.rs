//! Candidate retrieval and ranking.
//!
//! One keystroke flows through three seams: a [`Completer`] produces the
//! candidate list and the search string, a [`Ranker`] scores and orders the
//! candidates, and the caller renders the resulting [`ScoredItem`] rows
//! (usually via [`Ranker::matcher`] for highlighting). [`compute_matches`]
//! chains the three for the common case.
//!
//! ```
//! use typeahead_complete::{DropdownItem, Ranker};
//!
//! let ranker = Ranker::new("emphasis");
//! let ranked = ranker.rank(
//!     "a",
//!     vec![
//!         DropdownItem::from("alpha"),
//!         DropdownItem::from("beta"),
//!         DropdownItem::from("delta"),
//!     ],
//! );
//! assert_eq!(ranked[0].item.main(), "alpha");
//! assert_eq!(ranked.len(), 3);
//! ```
//!
//! # Design Invariants
//!
//! 1. An empty search string passes every candidate through unranked, in
//!    input order, with score `0.0`.
//! 2. A non-empty search string keeps only matching candidates, ordered by
//!    descending score; equal scores keep input order.
//! 3. Ranking never panics and never drops a matching candidate, whatever
//!    the candidate text contains.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::trace;
use typeahead_fuzzy::{FuzzySearch, Matcher, SearchCache};

use crate::item::DropdownItem;
use crate::target::TargetState;

/// One ranked dropdown row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
    pub item: DropdownItem,
    /// Relevance of `item` for the search string; `0.0` on the empty-query
    /// pass-through.
    pub score: f32,
    /// Character offsets of `item.main()` the match consumed.
    pub offsets: Vec<u32>,
}

/// Scores candidate lists against a search string.
///
/// Owns the emphasis token handed to per-query [`Matcher`]s and the
/// [`SearchCache`] shared by every query ranked through it, so repeated
/// keystrokes over a stable candidate list stay cheap.
#[derive(Debug)]
pub struct Ranker<S> {
    emphasis: S,
    case_sensitive: bool,
    cache: Arc<SearchCache>,
}

impl<S> Ranker<S> {
    /// Case-insensitive ranker with a fresh cache.
    #[must_use]
    pub fn new(emphasis: S) -> Self {
        Self {
            emphasis,
            case_sensitive: false,
            cache: Arc::new(SearchCache::default()),
        }
    }

    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SearchCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn emphasis(&self) -> &S {
        &self.emphasis
    }

    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Handle to the cache shared by this ranker's queries.
    #[must_use]
    pub fn cache(&self) -> Arc<SearchCache> {
        Arc::clone(&self.cache)
    }

    /// Score, filter, and order `candidates` for `search_string`.
    ///
    /// The empty search string short-circuits: every candidate passes
    /// through with score `0.0` in input order, and no engine is built.
    pub fn rank(&self, search_string: &str, candidates: Vec<DropdownItem>) -> Vec<ScoredItem> {
        if search_string.is_empty() {
            return candidates
                .into_iter()
                .map(|item| ScoredItem {
                    item,
                    score: 0.0,
                    offsets: Vec::new(),
                })
                .collect();
        }

        let total = candidates.len();
        let search = FuzzySearch::new(search_string)
            .case_sensitive(self.case_sensitive)
            .with_cache(Arc::clone(&self.cache));
        let mut scored: Vec<ScoredItem> = candidates
            .into_iter()
            .filter_map(|item| {
                let result = search.match_candidate(item.main());
                result.is_match().then(|| ScoredItem {
                    item,
                    score: result.score,
                    offsets: result.offsets,
                })
            })
            .collect();
        // Stable sort: equal scores keep candidate order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        trace!(
            query = %search_string,
            candidates = total,
            matches = scored.len(),
            "ranked candidates"
        );
        scored
    }
}

impl<S: Clone> Ranker<S> {
    /// Build the per-query [`Matcher`] for highlighting, sharing this
    /// ranker's cache and case flag so highlight calls hit the results the
    /// rank pass already computed.
    #[must_use]
    pub fn matcher(&self, query: &str) -> Matcher<S> {
        Matcher::new(query, self.emphasis.clone())
            .case_sensitive(self.case_sensitive)
            .with_cache(Arc::clone(&self.cache))
    }
}

/// A source of completion candidates.
///
/// The three provided methods define how the target text maps to a query
/// and back; the default implementations treat the whole text as the query
/// and a chosen completion as a full replacement, which is the right
/// behavior for a single-field input. Sources completing inside larger
/// buffers override them (see `PathCompleter`).
pub trait Completer {
    /// Candidates for the current target state.
    fn candidates(&self, state: &TargetState) -> Vec<DropdownItem>;

    /// The query to rank candidates against.
    fn search_string(&self, state: &TargetState) -> String {
        state.text().to_string()
    }

    /// The target state after the user picks `value`.
    fn apply_completion(&self, value: &str, _state: &TargetState) -> TargetState {
        TargetState::at_end(value)
    }

    /// Whether the dropdown should be on screen for this pass.
    fn should_show_dropdown(
        &self,
        _state: &TargetState,
        search_string: &str,
        matches: &[ScoredItem],
    ) -> bool {
        default_should_show_dropdown(search_string, matches)
    }
}

/// The default visibility rule.
///
/// Hidden on an empty search string or an empty match list, and hidden when
/// the only match already equals the search string (ignoring case), since
/// offering the text the user just typed is noise.
#[must_use]
pub fn default_should_show_dropdown(search_string: &str, matches: &[ScoredItem]) -> bool {
    if search_string.is_empty() || matches.is_empty() {
        return false;
    }
    if let [only] = matches {
        return only.item.main().to_lowercase() != search_string.to_lowercase();
    }
    true
}

/// A fixed candidate list.
impl Completer for Vec<DropdownItem> {
    fn candidates(&self, _state: &TargetState) -> Vec<DropdownItem> {
        self.clone()
    }
}

/// Adapter making a closure a candidate source.
///
/// A wrapper rather than a blanket impl over `Fn`, which would conflict
/// with the `Vec<DropdownItem>` impl under coherence.
pub struct FnCompleter<F>(F);

impl<F> FnCompleter<F>
where
    F: Fn(&TargetState) -> Vec<DropdownItem>,
{
    pub fn new(source: F) -> Self {
        Self(source)
    }
}

impl<F> Completer for FnCompleter<F>
where
    F: Fn(&TargetState) -> Vec<DropdownItem>,
{
    fn candidates(&self, state: &TargetState) -> Vec<DropdownItem> {
        (self.0)(state)
    }
}

/// Extraction, retrieval, and ranking in one call.
pub fn compute_matches<C, S>(
    completer: &C,
    ranker: &Ranker<S>,
    state: &TargetState,
) -> Vec<ScoredItem>
where
    C: Completer + ?Sized,
{
    let search_string = completer.search_string(state);
    let candidates = completer.candidates(state);
    ranker.rank(&search_string, candidates)
}
