//! Common-word set for the word-score term
//!
//! Words are stored uppercased. The set can come from a word list, from the
//! built-in English list of the `stop-words` crate, or from the head of the
//! key dictionary when nothing better is available.

use std::io;
use std::path::Path;

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

/// Number of dictionary keys used when no common-word list is available.
pub const KEY_FALLBACK_LEN: usize = 1000;

/// Uppercased set of words that count as "recognized" English.
#[derive(Debug, Clone, Default)]
pub struct CommonWords {
    words: FxHashSet<String>,
}

impl CommonWords {
    /// Create an empty set (word score is then 0 everywhere).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a set from a custom list.
    pub fn from_list<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_uppercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Built-in English list from the `stop-words` crate.
    pub fn english() -> Self {
        Self::from_list(get(LANGUAGE::English).iter())
    }

    /// Fallback: the first [`KEY_FALLBACK_LEN`] dictionary keys.
    pub fn from_keys(keys: &[String]) -> Self {
        Self::from_list(keys.iter().take(KEY_FALLBACK_LEN))
    }

    /// Read one word per line from `path`.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_list(content.lines()))
    }

    /// Load from `path`, falling back to the head of `keys` when the file
    /// is missing or unreadable.
    pub fn load_or_fallback(path: impl AsRef<Path>, keys: &[String]) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(words) => words,
            Err(err) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %err,
                    "common-word list unavailable, using dictionary head"
                );
                Self::from_keys(keys)
            }
        }
    }

    /// Check an already-uppercased token.
    #[inline]
    pub fn contains(&self, upper: &str) -> bool {
        self.words.contains(upper)
    }

    /// Get the number of words in the set
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
