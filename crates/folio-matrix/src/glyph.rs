//! Rendering characters to thresholded bitmaps.

use rusttype::{point, Font, Scale};

/// Rasterization knobs. The canvas must leave room around the glyph so the
/// centered bitmap never wraps; these values are configuration only and are
/// not persisted with a matrix.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Side of the square canvas, in pixels.
    pub canvas: usize,
    /// Point size of the rendered character inside the canvas.
    pub point_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { canvas: 40, point_size: 24.0 }
    }
}

/// A code point rendered to a square 0/1 bitmap, with the bounding box of
/// its lit pixels.
#[derive(Debug, Clone)]
pub struct Glyph {
    ch: char,
    size: usize,
    pix: Vec<bool>,
    height: usize,
    width: usize,
}

impl Glyph {
    /// Draw `ch` in white on a black canvas, anchored top-left, and
    /// threshold the coverage at mid-gray. Whitespace renders as a plain
    /// space, which leaves the canvas dark.
    pub fn render(ch: char, font: &Font, cfg: &RenderConfig) -> Self {
        let size = cfg.canvas;
        let mut pix = vec![false; size * size];

        let drawn = if ch.is_whitespace() { ' ' } else { ch };
        let scale = Scale::uniform(cfg.point_size);
        let ascent = font.v_metrics(scale).ascent;
        let glyph = font.glyph(drawn).scaled(scale).positioned(point(0.0, ascent));
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|x, y, v| {
                let px = bb.min.x + x as i32;
                let py = bb.min.y + y as i32;
                if v > 0.5 && px >= 0 && py >= 0 && (px as usize) < size && (py as usize) < size {
                    pix[py as usize * size + px as usize] = true;
                }
            });
        }

        let mut glyph = Self { ch, size, pix, height: 0, width: 0 };
        if let Some((_, _, height, width)) = glyph.bounds() {
            glyph.height = height;
            glyph.width = width;
        }
        glyph
    }

    pub fn ch(&self) -> char {
        self.ch
    }

    /// Bounding-box height of the lit pixels; 0 when the canvas is empty.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn lit_count(&self) -> usize {
        self.pix.iter().filter(|&&lit| lit).count()
    }

    fn lit_pixels(&self) -> Vec<(usize, usize)> {
        (0..self.size * self.size)
            .filter(|&at| self.pix[at])
            .map(|at| (at / self.size, at % self.size))
            .collect()
    }

    /// Bounding box of the lit pixels as `(min_row, min_col, height, width)`.
    fn bounds(&self) -> Option<(usize, usize, usize, usize)> {
        let lit = self.lit_pixels();
        let min_r = lit.iter().map(|&(r, _)| r).min()?;
        let max_r = lit.iter().map(|&(r, _)| r).max()?;
        let min_c = lit.iter().map(|&(_, c)| c).min()?;
        let max_c = lit.iter().map(|&(_, c)| c).max()?;
        Some((min_r, min_c, max_r - min_r + 1, max_c - min_c + 1))
    }

    /// Shift the bitmap toroidally so the bounding box sits centered in the
    /// canvas. Glyphs are rendered well inside the canvas, so the wrap
    /// never splits one.
    pub fn center(&mut self) {
        let Some((min_r, min_c, height, width)) = self.bounds() else {
            return;
        };
        let n = self.size;
        let down = ((n - height) / 2 + n - min_r) % n;
        let right = ((n - width) / 2 + n - min_c) % n;
        if down == 0 && right == 0 {
            return;
        }
        let mut rolled = vec![false; n * n];
        for (r, c) in self.lit_pixels() {
            rolled[(r + down) % n * n + (c + right) % n] = true;
        }
        self.pix = rolled;
    }

    /// Maximum intersection-over-union of `other` against `self` over all
    /// toroidal integer translations of `other`.
    ///
    /// Each lit-pixel pair (one from each glyph) lands on exactly one
    /// offset, so a histogram of pairs per offset gives every offset's
    /// intersection without materializing the shifted bitmaps.
    pub fn max_iou(&self, other: &Glyph) -> f64 {
        let n = self.size;
        let ours = self.lit_pixels();
        let theirs = other.lit_pixels();
        if ours.is_empty() || theirs.is_empty() {
            return 0.0;
        }

        let mut intersections = vec![0u32; n * n];
        for &(r1, c1) in &ours {
            for &(r2, c2) in &theirs {
                let dr = (r1 + n - r2) % n;
                let dc = (c1 + n - c2) % n;
                intersections[dr * n + dc] += 1;
            }
        }

        let total = (ours.len() + theirs.len()) as f64;
        intersections
            .into_iter()
            .map(|inter| {
                let inter = f64::from(inter);
                inter / (total - inter)
            })
            .fold(0.0, f64::max)
    }

    /// Build a glyph straight from a 0/1 pattern, for scoring tests.
    #[cfg(test)]
    pub(crate) fn from_pattern(ch: char, rows: &[&[u8]]) -> Self {
        let size = rows.len();
        let mut pix = vec![false; size * size];
        for (r, row) in rows.iter().enumerate() {
            for (c, &cell) in row.iter().enumerate() {
                pix[r * size + c] = cell != 0;
            }
        }
        let mut glyph = Self { ch, size, pix, height: 0, width: 0 };
        if let Some((_, _, height, width)) = glyph.bounds() {
            glyph.height = height;
            glyph.width = width;
        }
        glyph
    }

    #[cfg(test)]
    fn lit_at(&self, r: usize, c: usize) -> bool {
        self.pix[r * self.size + c]
    }
}
