//! Scoring every character pair of a set.

use log::debug;
use rustc_hash::FxHashSet;
use rusttype::Font;

use crate::glyph::{Glyph, RenderConfig};
use crate::{CharSubMatrix, MatrixEntry, MatrixError, IDENTITY_SUB};

/// Below this many lit pixels a glyph is light enough that matching it
/// against whitespace is only mildly penalized.
const LIGHT_GLYPH_CUTOFF: f64 = 20.0;

/// Extend a stored matrix with new characters.
///
/// Every character of the union (existing set plus `new_chars`) is rendered
/// and centered once; then every unordered pair is scored. Pairs between
/// two existing characters keep their stored entry, so adding a character
/// costs one row of the pair triangle, not a full rebuild. The returned
/// matrix replaces the old one wholesale.
pub fn extend_matrix(
    existing: &CharSubMatrix,
    new_chars: &str,
    font_data: &[u8],
    cfg: &RenderConfig,
) -> Result<CharSubMatrix, MatrixError> {
    let font = Font::try_from_bytes(font_data).ok_or(MatrixError::Font)?;

    let fresh: FxHashSet<char> = new_chars.chars().collect();
    let mut all: Vec<char> = existing.chars().union(&fresh).copied().collect();
    all.sort_unstable();

    let glyphs: Vec<Glyph> = all
        .iter()
        .map(|&ch| {
            let mut glyph = Glyph::render(ch, &font, cfg);
            glyph.center();
            glyph
        })
        .collect();
    debug!("rendered {} glyphs for character set {}", glyphs.len(), existing.char_set());

    let mut matrix = CharSubMatrix::new(existing.char_set());
    for (i, first) in glyphs.iter().enumerate() {
        for second in &glyphs[i..] {
            let kept = if !fresh.contains(&first.ch()) && !fresh.contains(&second.ch()) {
                existing.entry(first.ch(), second.ch()).copied()
            } else {
                None
            };
            let entry = kept.unwrap_or_else(|| score_pair(first, second));
            matrix.insert(first.ch(), second.ch(), entry);
        }
    }
    Ok(matrix)
}

/// Score one unordered pair of rendered glyphs.
fn score_pair(first: &Glyph, second: &Glyph) -> MatrixEntry {
    if first.ch() == second.ch() {
        MatrixEntry { score: None, sub: IDENTITY_SUB }
    } else if first.ch().is_whitespace() || second.ch().is_whitespace() {
        // Aligning ink against whitespace is never good, but a light glyph
        // (a period, a quote) against a space is recoverable noise while a
        // heavy one is a real error.
        let visible = if first.ch().is_whitespace() { second } else { first };
        let score = visible.lit_count() as f64;
        let sub = if score < LIGHT_GLYPH_CUTOFF { -1.0 } else { -2.0 };
        MatrixEntry { score: Some(score), sub }
    } else {
        let score = first.max_iou(second);
        MatrixEntry { score: Some(score), sub: sub_for_iou(score) }
    }
}

/// Threshold a bitmap IoU into the substitution scale the aligner uses.
fn sub_for_iou(score: f64) -> f64 {
    if score >= 0.7 {
        1.0
    } else if score >= 0.5 {
        0.0
    } else if score >= 0.4 {
        -1.0
    } else {
        -2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identity_pair() {
        let a = Glyph::from_pattern('a', &[&[1, 0], &[0, 0]]);
        let entry = score_pair(&a, &a);
        assert_eq!(entry, MatrixEntry { score: None, sub: IDENTITY_SUB });
    }

    #[test]
    fn test_light_glyph_against_space() {
        let dot = Glyph::from_pattern('.', &[&[0, 0], &[1, 0]]);
        let space = Glyph::from_pattern(' ', &[&[0, 0], &[0, 0]]);
        let entry = score_pair(&dot, &space);
        assert_eq!(entry, MatrixEntry { score: Some(1.0), sub: -1.0 });
        // Symmetric regardless of which side is the space.
        assert_eq!(score_pair(&space, &dot), entry);
    }

    #[test]
    fn test_heavy_glyph_against_space() {
        let rows: Vec<Vec<u8>> = (0..5).map(|_| vec![1; 5]).collect();
        let borrowed: Vec<&[u8]> = rows.iter().map(|r| r.as_slice()).collect();
        let block = Glyph::from_pattern('M', &borrowed);
        let empty: Vec<Vec<u8>> = (0..5).map(|_| vec![0; 5]).collect();
        let empty_borrowed: Vec<&[u8]> = empty.iter().map(|r| r.as_slice()).collect();
        let space = Glyph::from_pattern(' ', &empty_borrowed);
        let entry = score_pair(&block, &space);
        assert_eq!(entry, MatrixEntry { score: Some(25.0), sub: -2.0 });
    }

    #[test]
    fn test_visual_pair_uses_iou() {
        let bar = [&[0u8, 1, 0][..], &[0, 1, 0], &[0, 1, 0]];
        let a = Glyph::from_pattern('l', &bar);
        let b = Glyph::from_pattern('1', &bar);
        let entry = score_pair(&a, &b);
        assert_eq!(entry, MatrixEntry { score: Some(1.0), sub: 1.0 });
    }

    #[test]
    fn test_sub_thresholds() {
        assert_eq!(sub_for_iou(0.85), 1.0);
        assert_eq!(sub_for_iou(0.7), 1.0);
        assert_eq!(sub_for_iou(0.69), 0.0);
        assert_eq!(sub_for_iou(0.5), 0.0);
        assert_eq!(sub_for_iou(0.45), -1.0);
        assert_eq!(sub_for_iou(0.1), -2.0);
    }
}
