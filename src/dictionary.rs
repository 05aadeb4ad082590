//! Candidate key dictionary
//!
//! An ordered list of key strings shared read-only by every worker. The
//! position of a key is its parameter value on key-based axes, so order is
//! significant and never changed after loading.

use std::io;
use std::path::Path;

/// Ordered, immutable list of candidate keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDictionary {
    keys: Vec<String>,
}

impl KeyDictionary {
    /// Build from lines of text: each line trimmed, blank lines dropped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();
        Self { keys }
    }

    /// Read one key per line from `path`.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_lines(content.lines()))
    }

    /// Keep only the first `limit` keys (0 keeps all).
    pub fn limit(mut self, limit: usize) -> Self {
        if limit > 0 {
            self.keys.truncate(limit);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
