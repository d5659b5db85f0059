#![no_main]

//! Match results must be structurally valid and deterministic for any
//! (query, candidate, case flag) triple.

use libfuzzer_sys::fuzz_target;
use typeahead_fuzzy::FuzzySearch;

fuzz_target!(|data: (String, String, bool)| {
    let (query, candidate, case_sensitive) = data;
    if query.is_empty() {
        return;
    }

    let search = FuzzySearch::new(query.as_str()).case_sensitive(case_sensitive);
    let result = search.match_candidate(&candidate);

    if result.is_match() {
        assert_eq!(result.offsets.len(), query.chars().count());
        let candidate_len = candidate.chars().count() as u32;
        assert!(result.offsets.iter().all(|&offset| offset < candidate_len));
        for pair in result.offsets.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    } else {
        assert_eq!(result.score, 0.0);
        assert!(result.offsets.is_empty());
    }

    // The second call is served from the cache and must reproduce the first.
    assert_eq!(search.match_candidate(&candidate), result);
});
