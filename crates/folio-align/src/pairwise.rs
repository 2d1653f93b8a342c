//! Weighted global alignment of two lines.
//!
//! Classical Needleman-Wunsch over a full score table with a traceback grid.
//! The substitution score of a character pair comes from a visual-similarity
//! matrix rather than a match/mismatch constant, so characters that OCR
//! engines confuse (`O`/`0`, `l`/`1`) align cheaply.

use crate::{AlignError, SubLookup, GAP};

const DEFAULT_GAP_OPEN: f64 = -1.0;
const DEFAULT_GAP_EXTEND: f64 = -1.0;
const DEFAULT_MISSING: f64 = -1.0;

/// The move that produced a table cell, consulted to tell a gap open from a
/// gap extension and replayed during traceback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Diag,
    Up,
    Left,
}

/// Two input lines padded with [`GAP`] to the same character length.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub top: String,
    pub bottom: String,
    /// Final Needleman-Wunsch score; higher means a closer alignment.
    pub score: f64,
}

/// Pairwise aligner configured with a substitution source and gap penalties.
pub struct LineAligner<S> {
    subs: S,
    gap_open: f64,
    gap_extend: f64,
    missing: f64,
}

impl<S: SubLookup> LineAligner<S> {
    /// Aligner with the default penalties (open and extend both -1.0) and
    /// the default score (-1.0) for pairs missing from the matrix.
    pub fn new(subs: S) -> Self {
        Self {
            subs,
            gap_open: DEFAULT_GAP_OPEN,
            gap_extend: DEFAULT_GAP_EXTEND,
            missing: DEFAULT_MISSING,
        }
    }

    /// Aligner with explicit penalties. A positive penalty would reward
    /// gaps, so it is rejected.
    pub fn with_penalties(subs: S, gap_open: f64, gap_extend: f64) -> Result<Self, AlignError> {
        if gap_open > 0.0 || gap_extend > 0.0 {
            return Err(AlignError::InvalidGapPenalty { open: gap_open, extend: gap_extend });
        }
        Ok(Self { subs, gap_open, gap_extend, missing: DEFAULT_MISSING })
    }

    fn sub(&self, a: char, b: char) -> f64 {
        self.subs.sub(a, b).unwrap_or(self.missing)
    }

    /// Unit-cost Levenshtein edit distance, independent of the matrix.
    pub fn distance(&self, a: &str, b: &str) -> usize {
        crate::distance::levenshtein(a, b)
    }

    /// Globally align two lines, padding each with [`GAP`] where the other
    /// has a character it lacks. Ties in the traceback prefer the diagonal,
    /// then the gap in the bottom row, then the gap in the top row, so the
    /// output is deterministic.
    pub fn align(&self, a: &str, b: &str) -> AlignedPair {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let width = b.len() + 1;
        let height = a.len() + 1;

        let mut table = vec![0.0f64; height * width];
        let mut steps = vec![Step::Diag; height * width];

        // Leading gap runs along the first row and column.
        for j in 1..width {
            let penalty = if j == 1 { self.gap_open } else { self.gap_extend };
            table[j] = table[j - 1] + penalty;
            steps[j] = Step::Left;
        }
        for i in 1..height {
            let penalty = if i == 1 { self.gap_open } else { self.gap_extend };
            table[i * width] = table[(i - 1) * width] + penalty;
            steps[i * width] = Step::Up;
        }

        for i in 1..height {
            for j in 1..width {
                let idx = i * width + j;
                let diag = table[idx - width - 1] + self.sub(a[i - 1], b[j - 1]);
                let up_penalty = if steps[idx - width] == Step::Up {
                    self.gap_extend
                } else {
                    self.gap_open
                };
                let up = table[idx - width] + up_penalty;
                let left_penalty = if steps[idx - 1] == Step::Left {
                    self.gap_extend
                } else {
                    self.gap_open
                };
                let left = table[idx - 1] + left_penalty;

                let (score, step) = if diag >= up && diag >= left {
                    (diag, Step::Diag)
                } else if up >= left {
                    (up, Step::Up)
                } else {
                    (left, Step::Left)
                };
                table[idx] = score;
                steps[idx] = step;
            }
        }

        let mut top = Vec::with_capacity(a.len() + b.len());
        let mut bottom = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (a.len(), b.len());
        while i > 0 || j > 0 {
            match steps[i * width + j] {
                Step::Diag => {
                    i -= 1;
                    j -= 1;
                    top.push(a[i]);
                    bottom.push(b[j]);
                }
                Step::Up => {
                    i -= 1;
                    top.push(a[i]);
                    bottom.push(GAP);
                }
                Step::Left => {
                    j -= 1;
                    top.push(GAP);
                    bottom.push(b[j]);
                }
            }
        }
        top.reverse();
        bottom.reverse();

        AlignedPair {
            top: top.into_iter().collect(),
            bottom: bottom.into_iter().collect(),
            score: table[height * width - 1],
        }
    }
}
