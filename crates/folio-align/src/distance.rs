//! Edit distances between OCR lines.

use itertools::Itertools;

/// Levenshtein distance between lines `i` and `j` of a set, `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distance {
    pub dist: usize,
    pub i: usize,
    pub j: usize,
}

/// Unit-cost Levenshtein distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let change = prev[j] + usize::from(ca != cb);
            let delete = prev[j + 1] + 1;
            let insert = curr[j] + 1;
            curr[j + 1] = change.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Distances for every unordered pair of lines, ascending, ties broken by
/// the pair indices. `K` lines produce `K * (K - 1) / 2` entries.
pub fn distance_all<S: AsRef<str>>(lines: &[S]) -> Vec<Distance> {
    let mut distances: Vec<Distance> = (0..lines.len())
        .tuple_combinations()
        .map(|(i, j)| Distance { dist: levenshtein(lines[i].as_ref(), lines[j].as_ref()), i, j })
        .collect();
    distances.sort_unstable_by_key(|d| (d.dist, d.i, d.j));
    distances
}
