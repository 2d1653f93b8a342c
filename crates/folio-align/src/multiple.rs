//! Progressive multiple alignment.
//!
//! The two closest lines are aligned first, then each remaining line is
//! merged in best-score-first, guided by a single representative row. The
//! inputs are a handful of OCR variants of one label line, so a full guide
//! tree would buy nothing over this.

use log::debug;

use crate::consensus::consensus;
use crate::distance::distance_all;
use crate::pairwise::{AlignedPair, LineAligner};
use crate::{SubLookup, GAP};

/// Which row the next merge aligns against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Guide {
    /// The first row of the growing alignment. Cheap and deterministic;
    /// the default.
    #[default]
    FirstRow,
    /// The column-plurality consensus of the rows so far. Slightly more
    /// robust on ambiguous merges, at the cost of reference compatibility.
    Consensus,
}

/// Progressive aligner over two or more lines.
pub struct MultipleAligner<S> {
    aligner: LineAligner<S>,
    guide: Guide,
}

impl<S: SubLookup> MultipleAligner<S> {
    pub fn new(aligner: LineAligner<S>) -> Self {
        Self { aligner, guide: Guide::FirstRow }
    }

    pub fn with_guide(aligner: LineAligner<S>, guide: Guide) -> Self {
        Self { aligner, guide }
    }

    /// Align every line against the others, padding each with [`GAP`] until
    /// all have the same character length. Rows come back in input order:
    /// stripping the gaps from row `i` reproduces `lines[i]` exactly.
    pub fn align(&self, lines: &[String]) -> Vec<String> {
        if lines.len() <= 1 {
            return lines.to_vec();
        }

        let distances = distance_all(lines);
        let seed = distances[0];
        let pair = self.aligner.align(&lines[seed.i], &lines[seed.j]);
        let mut rows: Vec<(usize, String)> = vec![(seed.i, pair.top), (seed.j, pair.bottom)];
        let mut pool: Vec<usize> = (0..lines.len()).filter(|&k| k != seed.i && k != seed.j).collect();

        while !pool.is_empty() {
            let guide_row = self.guide_row(&rows);

            let mut best_at = 0;
            let mut best = self.aligner.align(&guide_row, &lines[pool[0]]);
            for at in 1..pool.len() {
                let pair = self.aligner.align(&guide_row, &lines[pool[at]]);
                if pair.score > best.score {
                    best_at = at;
                    best = pair;
                }
            }
            let line_no = pool.remove(best_at);
            debug!("merged line {line_no} at score {}", best.score);

            let AlignedPair { top: new_guide, bottom: newcomer, .. } = best;
            let inserted = gap_insertions(&guide_row, &new_guide);
            for (_, row) in rows.iter_mut() {
                *row = insert_gaps(row, &inserted);
            }
            rows.push((line_no, newcomer));
        }

        rows.sort_unstable_by_key(|&(line_no, _)| line_no);
        rows.into_iter().map(|(_, row)| row).collect()
    }

    fn guide_row(&self, rows: &[(usize, String)]) -> String {
        match self.guide {
            Guide::FirstRow => rows[0].1.clone(),
            Guide::Consensus => {
                let bare: Vec<&str> = rows.iter().map(|(_, row)| row.as_str()).collect();
                consensus(&bare)
            }
        }
    }
}

/// Positions in `new` where the pairwise aligner put a gap that `old` did
/// not have. Scans left to right; a gap already present in `old` consumes a
/// matching gap in `new` before any position is attributed as inserted.
fn gap_insertions(old: &str, new: &str) -> Vec<usize> {
    let mut inserted = Vec::new();
    let mut remaining = old.chars().peekable();
    for (at, ch) in new.chars().enumerate() {
        if remaining.peek() == Some(&ch) {
            remaining.next();
        } else {
            inserted.push(at);
        }
    }
    inserted
}

/// Pad `row` with [`GAP`] so the listed positions (indices into the padded
/// row) hold gaps.
fn insert_gaps(row: &str, inserted: &[usize]) -> String {
    let mut padded = String::with_capacity(row.len() + inserted.len() * GAP.len_utf8());
    let mut pending = inserted.iter().peekable();
    let mut at = 0;
    for ch in row.chars() {
        while pending.peek() == Some(&&at) {
            padded.push(GAP);
            pending.next();
            at += 1;
        }
        padded.push(ch);
        at += 1;
    }
    for _ in pending {
        padded.push(GAP);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashMap;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    fn two_chars() -> MultipleAligner<FxHashMap<(char, char), f64>> {
        let subs: FxHashMap<(char, char), f64> =
            [(('a', 'a'), 0.0), (('a', 'b'), -1.0), (('b', 'b'), 0.0)].into_iter().collect();
        MultipleAligner::new(LineAligner::new(subs))
    }

    /// Identity scores +2.0 for every character of the inputs, everything
    /// else missing, the shape a freshly built matrix has.
    fn identity(lines: &[&str]) -> MultipleAligner<FxHashMap<(char, char), f64>> {
        let subs: FxHashMap<(char, char), f64> =
            lines.iter().flat_map(|l| l.chars()).map(|c| ((c, c), 2.0)).collect();
        MultipleAligner::new(LineAligner::new(subs))
    }

    #[test]
    fn test_align_empty_and_single() {
        let aligner = two_chars();
        assert_eq!(aligner.align(&[]), Vec::<String>::new());
        assert_eq!(aligner.align(&strings(&["aab"])), vec!["aab"]);
    }

    #[test]
    fn test_align_equal_length_lines() {
        let aligner = two_chars();
        assert_eq!(
            aligner.align(&strings(&["aab", "aaa", "aaa"])),
            vec!["aab", "aaa", "aaa"],
        );
        assert_eq!(
            aligner.align(&strings(&["aab", "abb", "aba"])),
            vec!["aab", "abb", "aba"],
        );
    }

    #[test]
    fn test_align_pair_through_multiple() {
        let aligner = two_chars();
        assert_eq!(aligner.align(&strings(&["aa", "aba"])), vec!["a⋄a", "aba"]);
        assert_eq!(aligner.align(&strings(&["aab", "aa"])), vec!["aab", "aa⋄"]);
    }

    #[test]
    fn test_rows_strip_back_to_inputs() {
        let lines = strings(&["aab", "aa", "baa", "aba"]);
        let aligner = two_chars();
        let rows = aligner.align(&lines);
        assert_eq!(rows.len(), lines.len());
        let width = rows[0].chars().count();
        for (row, line) in rows.iter().zip(&lines) {
            assert_eq!(row.chars().count(), width);
            let stripped: String = row.chars().filter(|&c| c != GAP).collect();
            assert_eq!(&stripped, line);
        }
    }

    #[test]
    fn test_align_label_pair() {
        let lines = strings(&[
            "North Carolina NORTH CAROLINA Guilford County",
            "North Carolina OT CAROLINA Guilford County",
        ]);
        let aligner = identity(&["North Carolina NORTH CAROLINA Guilford County"]);
        let rows = aligner.align(&lines);
        assert_eq!(rows[0], "North Carolina NORTH CAROLINA Guilford County");
        assert_eq!(rows[1], "North Carolina ⋄O⋄T⋄ CAROLINA Guilford County");
        assert!(rows.iter().all(|r| r.chars().count() == 45));
    }

    #[test]
    fn test_consensus_guide_keeps_invariants() {
        let lines = strings(&["aab", "aa", "aba", "baa"]);
        let subs: FxHashMap<(char, char), f64> =
            [(('a', 'a'), 2.0), (('b', 'b'), 2.0)].into_iter().collect();
        let aligner = MultipleAligner::with_guide(LineAligner::new(subs), Guide::Consensus);
        let rows = aligner.align(&lines);
        let width = rows[0].chars().count();
        for (row, line) in rows.iter().zip(&lines) {
            assert_eq!(row.chars().count(), width);
            let stripped: String = row.chars().filter(|&c| c != GAP).collect();
            assert_eq!(&stripped, line);
        }
    }

    #[test]
    fn test_gap_insertions_leftmost() {
        assert_eq!(gap_insertions("abc", "a⋄bc"), vec![1]);
        assert_eq!(gap_insertions("a⋄b", "⋄a⋄b"), vec![0]);
        assert_eq!(gap_insertions("ab", "ab⋄⋄"), vec![2, 3]);
        assert_eq!(gap_insertions("ab", "ab"), Vec::<usize>::new());
    }

    #[test]
    fn test_insert_gaps_matches_positions() {
        assert_eq!(insert_gaps("xyz", &[1]), "x⋄yz");
        assert_eq!(insert_gaps("xy", &[2, 3]), "xy⋄⋄");
        assert_eq!(insert_gaps("xy", &[0, 2]), "⋄x⋄y");
    }
}
