//! Alignment core for the folio OCR ensemble.
//!
//! Several OCR engines read the same herbarium label and none of them reads
//! it perfectly. This crate lines their transcriptions up character by
//! character with a weighted Needleman-Wunsch aligner, grows the pairwise
//! alignments into a multiple alignment, and reduces the columns to a single
//! consensus line. Outlier transcriptions are dropped before alignment.

use thiserror::Error;

mod consensus;
mod distance;
mod filter;
mod multiple;
mod pairwise;

pub use consensus::consensus;
pub use distance::{distance_all, levenshtein, Distance};
pub use filter::{filter_lines, DEFAULT_THRESHOLD};
pub use multiple::{Guide, MultipleAligner};
pub use pairwise::{AlignedPair, LineAligner};

/// The code point the aligners insert where a row is missing a character.
///
/// It is reserved: no OCR engine emits it, so it can never collide with
/// label text.
pub const GAP: char = '\u{22C4}'; // ⋄

/// Source of substitution scores for the weighted aligner.
///
/// `None` means the pair is not in the matrix; the aligner falls back to its
/// configured default instead of failing.
pub trait SubLookup {
    /// Substitution value for the unordered character pair, if known.
    fn sub(&self, a: char, b: char) -> Option<f64>;
}

impl<S: SubLookup> SubLookup for &S {
    fn sub(&self, a: char, b: char) -> Option<f64> {
        (*self).sub(a, b)
    }
}

/// A plain map works as a matrix; keys must be stored with `key.0 <= key.1`.
impl SubLookup for rustc_hash::FxHashMap<(char, char), f64> {
    fn sub(&self, a: char, b: char) -> Option<f64> {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.get(&key).copied()
    }
}

/// Errors from aligner configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    #[error("gap penalties must not be positive: open {open}, extend {extend}")]
    InvalidGapPenalty { open: f64, extend: f64 },
}
