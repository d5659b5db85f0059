//! Filesystem-path completion.
//!
//! [`PathCompleter`] completes the path segment at the cursor: `src/ma`
//! offers the entries of `<base>/src`, ranked against `ma`, and picking one
//! rewrites only that segment. Directory listings are the expensive part,
//! so they go through a bounded LRU cache keyed by directory; a listing
//! that fails (permission, vanished directory) produces an empty candidate
//! list and is not cached, so the next pass retries it.
//!
//! Entries sort directories first, dotfiles first within each group, then
//! by case-insensitive name, so a dropdown over a mixed directory reads the
//! way a file picker does.

use std::fmt;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::item::DropdownItem;
use crate::pipeline::{Completer, ScoredItem, default_should_show_dropdown};
use crate::target::TargetState;

/// Default number of directory listings kept in the cache.
pub const DEFAULT_DIR_CACHE_CAPACITY: usize = 100;

/// One directory entry as scanned, before display filtering.
#[derive(Debug, Clone)]
struct PathEntry {
    name: String,
    is_dir: bool,
}

type DirCache = LruCache<PathBuf, Arc<Vec<PathEntry>>, FxBuildHasher>;

/// Candidate source for filesystem paths.
///
/// Relative segments resolve against the base path given at construction;
/// absolute segments in the input replace it, as path joining does.
pub struct PathCompleter {
    base_path: PathBuf,
    show_dotfiles: bool,
    folder_prefix: String,
    file_prefix: String,
    dir_cache: Mutex<DirCache>,
}

impl PathCompleter {
    /// Completer rooted at `base_path`, showing dotfiles, with the default
    /// 📂/📄 prefixes and cache capacity.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            show_dotfiles: true,
            folder_prefix: "📂".to_string(),
            file_prefix: "📄".to_string(),
            dir_cache: Mutex::new(new_dir_cache(DEFAULT_DIR_CACHE_CAPACITY)),
        }
    }

    /// Whether entries starting with `.` are offered.
    #[must_use]
    pub fn show_dotfiles(mut self, show_dotfiles: bool) -> Self {
        self.show_dotfiles = show_dotfiles;
        self
    }

    /// Left-gutter prefix for directory entries.
    #[must_use]
    pub fn with_folder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.folder_prefix = prefix.into();
        self
    }

    /// Left-gutter prefix for file entries.
    #[must_use]
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Resize the directory cache. Existing entries are dropped.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.dir_cache = Mutex::new(new_dir_cache(capacity));
        self
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Drop every cached listing.
    ///
    /// Call after the filesystem is known to have changed underneath a
    /// directory the completer already listed.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// The directory whose entries complete the segment at the cursor.
    ///
    /// Everything before the last `/` in the text before the cursor joins
    /// onto the base path; with no `/`, or with nothing before it, the base
    /// path itself is listed.
    fn directory_for(&self, state: &TargetState) -> PathBuf {
        let before = state.text_before_cursor();
        match before.rfind('/') {
            Some(slash) => match &before[..slash] {
                "" | "/" => self.base_path.clone(),
                segment => self.base_path.join(segment),
            },
            None => self.base_path.clone(),
        }
    }

    fn entries_for(&self, directory: PathBuf) -> Option<Arc<Vec<PathEntry>>> {
        if let Some(entries) = self.lock_cache().get(&directory) {
            return Some(Arc::clone(entries));
        }
        match scan_directory(&directory) {
            Ok(entries) => {
                let entries = Arc::new(entries);
                self.lock_cache().put(directory, Arc::clone(&entries));
                Some(entries)
            }
            Err(err) => {
                debug!(directory = %directory.display(), %err, "directory scan failed");
                None
            }
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, DirCache> {
        self.dir_cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Completer for PathCompleter {
    fn candidates(&self, state: &TargetState) -> Vec<DropdownItem> {
        let directory = self.directory_for(state);
        let Some(entries) = self.entries_for(directory) else {
            return Vec::new();
        };

        // The cache holds raw listings; display filtering happens per call
        // so a toggled dotfile flag does not need a rescan.
        let mut visible: Vec<&PathEntry> = entries
            .iter()
            .filter(|entry| self.show_dotfiles || !entry.name.starts_with('.'))
            .collect();
        visible.sort_by_cached_key(|entry| {
            (
                !entry.is_dir,
                !entry.name.starts_with('.'),
                entry.name.to_lowercase(),
            )
        });

        visible
            .into_iter()
            .map(|entry| {
                let (main, prefix) = if entry.is_dir {
                    (format!("{}/", entry.name), &self.folder_prefix)
                } else {
                    (entry.name.clone(), &self.file_prefix)
                };
                DropdownItem::new(main).with_prefix(prefix.clone())
            })
            .collect()
    }

    /// The path segment after the last `/` before the cursor.
    fn search_string(&self, state: &TargetState) -> String {
        let before = state.text_before_cursor();
        match before.rfind('/') {
            Some(slash) => before[slash + 1..].to_string(),
            None => before.to_string(),
        }
    }

    /// Replace the segment at the cursor with `value`.
    ///
    /// Text after the cursor is dropped; the cursor lands at the end of the
    /// inserted value.
    fn apply_completion(&self, value: &str, state: &TargetState) -> TargetState {
        let before = state.text_before_cursor();
        match before.rfind('/') {
            Some(slash) => {
                let mut text = String::with_capacity(slash + 1 + value.len());
                text.push_str(&state.text()[..=slash]);
                text.push_str(value);
                TargetState::at_end(text)
            }
            None => TargetState::at_end(value),
        }
    }

    /// The default rule, plus: keep the dropdown up right after a `/` is
    /// typed (empty segment, non-empty input) when there is more than one
    /// entry to choose from.
    fn should_show_dropdown(
        &self,
        state: &TargetState,
        search_string: &str,
        matches: &[ScoredItem],
    ) -> bool {
        default_should_show_dropdown(search_string, matches)
            || (search_string.is_empty() && !state.text().is_empty() && matches.len() > 1)
    }
}

impl fmt::Debug for PathCompleter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathCompleter")
            .field("base_path", &self.base_path)
            .field("show_dotfiles", &self.show_dotfiles)
            .finish_non_exhaustive()
    }
}

fn new_dir_cache(capacity: usize) -> DirCache {
    let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
    LruCache::with_hasher(capacity, FxBuildHasher)
}

/// List `directory`, resolving symlinked entries to their targets for the
/// directory test. A broken symlink counts as a file.
fn scan_directory(directory: &Path) -> io::Result<Vec<PathEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let is_dir = if file_type.is_symlink() {
            fs::metadata(entry.path())
                .map(|meta| meta.is_dir())
                .unwrap_or(false)
        } else {
            file_type.is_dir()
        };
        entries.push(PathEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    Ok(entries)
}
