#![no_main]

//! Ranking must stay ordered, keep only matches, and never panic on
//! arbitrary candidate lists.

use libfuzzer_sys::fuzz_target;
use typeahead_complete::{DropdownItem, Ranker};

fuzz_target!(|data: (String, Vec<String>)| {
    let (query, candidates) = data;
    let total = candidates.len();

    let ranker = Ranker::new(());
    let items = candidates
        .iter()
        .map(|main| DropdownItem::from(main.as_str()))
        .collect();
    let ranked = ranker.rank(&query, items);

    if query.is_empty() {
        assert_eq!(ranked.len(), total);
        assert!(ranked.iter().all(|scored| scored.score == 0.0));
    } else {
        assert!(ranked.len() <= total);
        assert!(ranked.iter().all(|scored| scored.score > 0.0));
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
});
