//! Outlier removal before alignment.
//!
//! A transcription that disagrees wildly with every other one (an engine
//! that read the wrong region, or emitted noise) only hurts the consensus.

use indexmap::IndexSet;
use log::debug;

use crate::distance::distance_all;

/// Default Levenshtein offset added to the best pairwise distance.
pub const DEFAULT_THRESHOLD: usize = 128;

/// Drop lines that are not within `threshold` edits of the closest pair.
///
/// Walks the sorted pairwise distances and keeps every line index seen in a
/// pair at or under `closest + threshold`. Kept lines come back in the
/// order their indices were first seen; two lines or fewer pass through
/// unchanged.
pub fn filter_lines<S: AsRef<str>>(lines: &[S], threshold: usize) -> Vec<String> {
    if lines.len() <= 2 {
        return lines.iter().map(|l| l.as_ref().to_string()).collect();
    }

    let distances = distance_all(lines);
    let cutoff = distances[0].dist + threshold;

    let mut keep: IndexSet<usize> = IndexSet::default();
    for d in distances.iter().take_while(|d| d.dist <= cutoff) {
        keep.insert(d.i);
        keep.insert(d.j);
    }
    if keep.len() < lines.len() {
        debug!("dropped {} outlier lines of {}", lines.len() - keep.len(), lines.len());
    }
    keep.into_iter().map(|k| lines[k].as_ref().to_string()).collect()
}
