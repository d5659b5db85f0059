#![no_main]

//! Highlight fragments must reassemble the candidate byte-for-byte and
//! alternate between plain and emphasized runs.

use libfuzzer_sys::fuzz_target;
use typeahead_fuzzy::Matcher;

fuzz_target!(|data: (String, String)| {
    let (query, candidate) = data;
    if query.is_empty() {
        return;
    }

    let matcher = Matcher::new(query.as_str(), ());
    let fragments = matcher.highlight(&candidate);

    let rebuilt: String = fragments.iter().map(|fragment| fragment.text).collect();
    assert_eq!(rebuilt, candidate);

    for fragment in &fragments {
        assert!(!fragment.text.is_empty());
    }
    for pair in fragments.windows(2) {
        assert!(pair[0].emphasis.is_some() != pair[1].emphasis.is_some());
    }
});
