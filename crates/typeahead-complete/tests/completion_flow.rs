#![forbid(unsafe_code)]

//! Integration tests: full completion passes from keystroke to applied text.
//!
//! Run with `cargo test --package typeahead-complete --test completion_flow`.

use std::fs::{self, File};
use std::sync::Arc;

use typeahead_complete::{
    Completer, DropdownItem, FnCompleter, PathCompleter, Ranker, TargetState, compute_matches,
};
use typeahead_fuzzy::SearchCache;

// ============================================================================
// Static Lists
// ============================================================================

#[test]
fn keystroke_ranks_highlights_and_applies() {
    let commands = vec![
        DropdownItem::from("cargo build"),
        DropdownItem::from("cargo doc --open"),
        DropdownItem::from("cargo test"),
    ];
    let ranker = Ranker::new("bold");
    let state = TargetState::at_end("doc");

    let matches = compute_matches(&commands, &ranker, &state);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item.main(), "cargo doc --open");
    assert!(commands.should_show_dropdown(&state, "doc", &matches));

    // Highlighting goes through the same cache the rank pass filled.
    let matcher = ranker.matcher("doc");
    let fragments = matcher.highlight(matches[0].item.main());
    let emphasized: String = fragments
        .iter()
        .filter(|fragment| fragment.emphasis.is_some())
        .map(|fragment| fragment.text)
        .collect();
    assert_eq!(emphasized, "doc");

    let applied = commands.apply_completion(matches[0].item.main(), &state);
    assert_eq!(applied.text(), "cargo doc --open");
    assert_eq!(applied.cursor_position(), 16);
}

#[test]
fn narrowing_keystrokes_reuse_the_shared_cache() {
    let commands = vec![
        DropdownItem::from("restart server"),
        DropdownItem::from("restore backup"),
        DropdownItem::from("resume job"),
    ];
    let cache = Arc::new(SearchCache::new(256));
    let ranker = Ranker::new(()).with_cache(Arc::clone(&cache));

    let broad = ranker.rank("res", commands.clone());
    assert_eq!(broad.len(), 3);

    let narrowed = ranker.rank("rest", commands.clone());
    let mains: Vec<&str> = narrowed.iter().map(|s| s.item.main()).collect();
    // Equal scores keep candidate order.
    assert_eq!(mains, vec!["restart server", "restore backup"]);

    // Re-ranking the same keystroke is pure cache hits.
    let before = cache.stats();
    let again = ranker.rank("rest", commands.clone());
    let after = cache.stats();
    assert_eq!(again, narrowed);
    assert_eq!(after.misses, before.misses);
    assert_eq!(after.hits, before.hits + 2);
}

// ============================================================================
// Path Completion
// ============================================================================

#[test]
fn path_completion_walks_a_directory_tree() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    File::create(dir.path().join("src").join("main.rs")).unwrap();
    File::create(dir.path().join("src").join("matcher.rs")).unwrap();
    File::create(dir.path().join("Cargo.toml")).unwrap();
    File::create(dir.path().join("README.md")).unwrap();

    let completer = PathCompleter::new(dir.path());
    let ranker = Ranker::new(());

    // "sr" narrows the root listing to the src/ directory.
    let state = TargetState::at_end("sr");
    let matches = compute_matches(&completer, &ranker, &state);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item.main(), "src/");
    assert_eq!(matches[0].item.prefix(), Some("📂"));

    // Accepting rewrites the segment; the next pass lists src/ itself.
    let state = completer.apply_completion(matches[0].item.main(), &state);
    assert_eq!(state.text(), "src/");
    let matches = compute_matches(&completer, &ranker, &state);
    let mains: Vec<&str> = matches.iter().map(|s| s.item.main()).collect();
    assert_eq!(mains, vec!["main.rs", "matcher.rs"]);
    let search = completer.search_string(&state);
    assert!(completer.should_show_dropdown(&state, &search, &matches));

    // Typing into the segment narrows within src/.
    let state = TargetState::at_end("src/mai");
    let matches = compute_matches(&completer, &ranker, &state);
    assert_eq!(matches[0].item.main(), "main.rs");
    let applied = completer.apply_completion(matches[0].item.main(), &state);
    assert_eq!(applied.text(), "src/main.rs");
    assert_eq!(applied.cursor_position(), 11);
}

// ============================================================================
// Custom Sources
// ============================================================================

/// Completes the flag token at the cursor inside a longer command line.
struct FlagSource;

impl Completer for FlagSource {
    fn candidates(&self, _state: &TargetState) -> Vec<DropdownItem> {
        vec![
            DropdownItem::from("--all-features"),
            DropdownItem::from("--offline"),
            DropdownItem::from("--quiet"),
        ]
    }

    fn search_string(&self, state: &TargetState) -> String {
        state.word_before_cursor().to_string()
    }

    fn apply_completion(&self, value: &str, state: &TargetState) -> TargetState {
        let before = state.text_before_cursor();
        let keep = before.len() - state.word_before_cursor().len();
        let mut text = String::with_capacity(keep + value.len());
        text.push_str(&before[..keep]);
        text.push_str(value);
        TargetState::at_end(text)
    }
}

#[test]
fn word_level_source_completes_inside_a_command_line() {
    let completer = FlagSource;
    let ranker = Ranker::new(());
    let state = TargetState::at_end("cargo build --al");

    assert_eq!(completer.search_string(&state), "--al");
    let matches = compute_matches(&completer, &ranker, &state);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item.main(), "--all-features");

    let applied = completer.apply_completion(matches[0].item.main(), &state);
    assert_eq!(applied.text(), "cargo build --all-features");
}

#[test]
fn closure_source_adapts_to_the_state() {
    let commands = FnCompleter::new(|state: &TargetState| {
        if state.text().starts_with(':') {
            vec![DropdownItem::from(":write"), DropdownItem::from(":quit")]
        } else {
            Vec::new()
        }
    });
    let ranker = Ranker::new(());

    let matches = compute_matches(&commands, &ranker, &TargetState::at_end(":w"));
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item.main(), ":write");

    assert!(compute_matches(&commands, &ranker, &TargetState::at_end("w")).is_empty());
}
