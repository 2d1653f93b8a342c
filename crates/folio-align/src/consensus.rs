//! Column-wise reduction of an alignment to one line.

use rustc_hash::FxHashMap;
use unicode_general_category::{get_general_category, GeneralCategory};

/// Tie-break weight of a character's Unicode general category. When two
/// characters tie on the column count the lower weight wins, so punctuation
/// beats letters, letters beat digits, and symbols lose to almost anything.
fn category_weight(ch: char) -> u32 {
    use GeneralCategory::*;
    match get_general_category(ch) {
        UppercaseLetter | LowercaseLetter | TitlecaseLetter | ModifierLetter | OtherLetter => 20,
        DecimalNumber => 30,
        LetterNumber | OtherNumber => 60,
        ConnectorPunctuation => 70,
        DashPunctuation => 40,
        OpenPunctuation | ClosePunctuation | InitialPunctuation | FinalPunctuation => 50,
        OtherPunctuation => 10,
        MathSymbol => 99,
        CurrencySymbol | OtherSymbol => 90,
        SpaceSeparator => 80,
        _ => 100,
    }
}

/// Per-character weights, finer-grained than the category buckets. Periods
/// and commas are what OCR engines most often disagree about, so they rank
/// ahead of the rest of their category.
fn char_weight(ch: char) -> u32 {
    match ch {
        '.' => 1,
        ',' | ':' | ';' => 2,
        '!' | '"' | '\'' | '*' | '/' => 5,
        '%' | '&' => 6,
        _ => category_weight(ch),
    }
}

/// Reduce equal-length alignment rows to a single line by taking each
/// column's plurality character. Ties go to the character with the lowest
/// `(weight, code point)` key. Gap characters count like any other, so the
/// result can still contain them.
pub fn consensus<S: AsRef<str>>(rows: &[S]) -> String {
    let grid: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
    let Some(first) = grid.first() else {
        return String::new();
    };

    let mut line = String::with_capacity(rows[0].as_ref().len());
    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    for col in 0..first.len() {
        counts.clear();
        for row in &grid {
            if let Some(&ch) = row.get(col) {
                *counts.entry(ch).or_insert(0) += 1;
            }
        }
        let top = counts.values().copied().max().unwrap_or(0);
        let winner = counts
            .iter()
            .filter(|&(_, &n)| n == top)
            .map(|(&ch, _)| ch)
            .min_by_key(|&ch| (char_weight(ch), ch));
        if let Some(ch) = winner {
            line.push(ch);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plurality_wins() {
        assert_eq!(consensus(&["abc", "abc", "xbc"]), "abc");
    }

    #[test]
    fn test_tie_breaks_on_code_point() {
        // Both are lowercase letters with the same weight.
        assert_eq!(consensus(&["a", "b"]), "a");
    }

    #[test]
    fn test_tie_prefers_punctuation_over_letters() {
        assert_eq!(consensus(&[".", "a"]), ".");
        assert_eq!(consensus(&[",", "x"]), ",");
    }

    #[test]
    fn test_tie_prefers_letters_over_digits() {
        assert_eq!(consensus(&["O", "0"]), "O");
    }

    #[test]
    fn test_tie_prefers_letters_over_dashes() {
        // A hyphen is dash punctuation, not in the per-character table.
        assert_eq!(consensus(&["-", "a"]), "a");
    }

    #[test]
    fn test_gap_loses_ties() {
        // U+22C4 is a math symbol, the heaviest bucket.
        assert_eq!(consensus(&["a⋄c", "⋄bc"]), "abc");
    }

    #[test]
    fn test_gap_can_win_plurality() {
        assert_eq!(consensus(&["a⋄", "a⋄", "ab"]), "a⋄");
    }

    #[test]
    fn test_empty_alignment() {
        let rows: [&str; 0] = [];
        assert_eq!(consensus(&rows), "");
    }

    #[test]
    fn test_consensus_length_matches_rows() {
        let rows = ["North Carolina", "North Carol⋄na"];
        assert_eq!(consensus(&rows).chars().count(), 14);
    }
}
