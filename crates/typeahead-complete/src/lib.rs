#![forbid(unsafe_code)]

//! Candidate sources and ranking for dropdown completion.
//!
//! Sits on top of `typeahead-fuzzy`: a [`Completer`] supplies candidates
//! and query extraction for a [`TargetState`], a [`Ranker`] scores and
//! orders them, and [`PathCompleter`] is the built-in filesystem source.

pub mod item;
pub mod path;
pub mod pipeline;
pub mod target;

pub use item::DropdownItem;
pub use path::{DEFAULT_DIR_CACHE_CAPACITY, PathCompleter};
pub use pipeline::{
    Completer, FnCompleter, Ranker, ScoredItem, compute_matches, default_should_show_dropdown,
};
pub use target::TargetState;
