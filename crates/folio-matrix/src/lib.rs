//! Character-substitution matrices for the folio aligners.
//!
//! OCR engines confuse characters that look alike, so the aligner scores a
//! substitution by how visually similar the two characters are. This crate
//! renders each character of a set through a TrueType font, scores every
//! pair by bitmap overlap, and persists the resulting matrix in SQLite
//! under a character-set name.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use folio_align::SubLookup;

mod builder;
mod glyph;
mod store;

pub use builder::extend_matrix;
pub use glyph::{Glyph, RenderConfig};
pub use store::MatrixStore;

/// Substitution value for a character paired with itself.
pub const IDENTITY_SUB: f64 = 2.0;

/// One scored pair. `score` is the raw similarity (bitmap IoU, or lit-pixel
/// count for whitespace pairs) and is absent for identity pairs; `sub` is
/// the value the aligner consumes, in `[-2.0, 2.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixEntry {
    pub score: Option<f64>,
    pub sub: f64,
}

/// A named substitution matrix over unordered character pairs.
///
/// Keys are normalized so the smaller character comes first, which makes
/// the relation symmetric without storing both orders.
#[derive(Debug, Clone, Default)]
pub struct CharSubMatrix {
    char_set: String,
    entries: FxHashMap<(char, char), MatrixEntry>,
}

impl CharSubMatrix {
    pub fn new(char_set: impl Into<String>) -> Self {
        Self { char_set: char_set.into(), entries: FxHashMap::default() }
    }

    pub fn char_set(&self) -> &str {
        &self.char_set
    }

    fn key(a: char, b: char) -> (char, char) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn insert(&mut self, a: char, b: char, entry: MatrixEntry) {
        self.entries.insert(Self::key(a, b), entry);
    }

    pub fn entry(&self, a: char, b: char) -> Option<&MatrixEntry> {
        self.entries.get(&Self::key(a, b))
    }

    /// Every character mentioned by any pair.
    pub fn chars(&self) -> FxHashSet<char> {
        self.entries.keys().flat_map(|&(a, b)| [a, b]).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((char, char), &MatrixEntry)> {
        self.entries.iter().map(|(&key, entry)| (key, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SubLookup for CharSubMatrix {
    fn sub(&self, a: char, b: char) -> Option<f64> {
        self.entry(a, b).map(|entry| entry.sub)
    }
}

/// Errors from matrix building and storage.
#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("could not parse the font file")]
    Font,

    #[error("matrix store error: {0}")]
    Store(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_is_symmetric() {
        let mut matrix = CharSubMatrix::new("default");
        matrix.insert('b', 'a', MatrixEntry { score: Some(0.5), sub: 0.0 });
        assert_eq!(matrix.sub('a', 'b'), Some(0.0));
        assert_eq!(matrix.sub('b', 'a'), Some(0.0));
        assert_eq!(matrix.sub('a', 'z'), None);
    }

    #[test]
    fn test_chars_covers_both_sides() {
        let mut matrix = CharSubMatrix::new("default");
        matrix.insert('a', 'b', MatrixEntry { score: None, sub: -1.0 });
        matrix.insert('c', 'c', MatrixEntry { score: None, sub: IDENTITY_SUB });
        let chars = matrix.chars();
        assert_eq!(chars.len(), 3);
        assert!(chars.contains(&'a') && chars.contains(&'b') && chars.contains(&'c'));
    }
}
