//! Haar rectangle features and variance-normalized evaluation over integral
//! images.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::numeric::integral::IntegralImage;

/// The four rectangle tilings a Haar descriptor can take.
///
/// Rectangles tile the descriptor's bounding box according to the variant's
/// `(columns, rows)` grid of `width x height` cells: `TwoHorizontal` is
/// 2x1, `TwoVertical` is 1x2, `ThreeHorizontal` is 3x1, `FourQuad` is 2x2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaarKind {
    TwoHorizontal,
    TwoVertical,
    ThreeHorizontal,
    FourQuad,
}

impl HaarKind {
    /// Number of cell-columns the tiling spans.
    fn cols(self) -> usize {
        match self {
            HaarKind::TwoHorizontal => 2,
            HaarKind::TwoVertical => 1,
            HaarKind::ThreeHorizontal => 3,
            HaarKind::FourQuad => 2,
        }
    }

    /// Number of cell-rows the tiling spans.
    fn rows(self) -> usize {
        match self {
            HaarKind::TwoHorizontal => 1,
            HaarKind::TwoVertical => 2,
            HaarKind::ThreeHorizontal => 1,
            HaarKind::FourQuad => 2,
        }
    }
}

/// A Haar rectangle descriptor: a type tag plus the unscaled top-left
/// corner and per-cell size. Coordinates are in the *unit* scale (`s=1`);
/// evaluation and validity checks apply the window's current scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaarFeature {
    pub kind: HaarKind,
    pub start_x: usize,
    pub start_y: usize,
    pub width: usize,
    pub height: usize,
}

impl HaarFeature {
    pub fn new(kind: HaarKind, start_x: usize, start_y: usize, width: usize, height: usize) -> Self {
        HaarFeature { kind, start_x, start_y, width, height }
    }

    /// True iff every rectangle of this descriptor, scaled by `scale`,
    /// lies strictly inside a `window_height x window_width` window.
    pub fn is_valid(&self, window_height: usize, window_width: usize, scale: f64) -> bool {
        let start_x = self.start_x as f64 * scale;
        let start_y = self.start_y as f64 * scale;
        let width = self.width as f64 * scale;
        let height = self.height as f64 * scale;

        let cols = self.kind.cols() as f64;
        let rows = self.kind.rows() as f64;

        start_x + cols * width < window_width as f64
            && start_y + rows * height < window_height as f64
            && width > 0.0
            && height > 0.0
    }

    /// Rectangle sums of each tiled cell, scaled by `scale`, read off the
    /// (unnormalized) integral image `integral`.
    fn cell_sums(&self, integral: &IntegralImage, scale: f64) -> Vec<f64> {
        let sx = (self.start_x as f64 * scale).round() as usize;
        let sy = (self.start_y as f64 * scale).round() as usize;
        let w = ((self.width as f64 * scale).round() as usize).max(1);
        let h = ((self.height as f64 * scale).round() as usize).max(1);

        let mut cells = Vec::with_capacity(self.kind.cols() * self.kind.rows());
        for row in 0..self.kind.rows() {
            for col in 0..self.kind.cols() {
                let y1 = sy + row * h;
                let x1 = sx + col * w;
                cells.push(integral.rect_sum(y1, x1, y1 + h, x1 + w));
            }
        }
        cells
    }

    /// Signed combination of the tiled cell sums.
    fn combine(&self, cells: &[f64]) -> f64 {
        match self.kind {
            HaarKind::TwoHorizontal => cells[1] - cells[0],
            HaarKind::TwoVertical => cells[0] - cells[1],
            HaarKind::ThreeHorizontal => 2.0 * cells[1] - cells[0] - cells[2],
            HaarKind::FourQuad => {
                // row-major 2x2: [TL, TR, BL, BR]
                (cells[0] + cells[3]) - (cells[1] + cells[2])
            }
        }
    }

    /// Variance-normalized Haar value over a window whose (unnormalized and
    /// squared) integral images are `integral`/`sq_integral`, at `scale`.
    ///
    /// Returns `0.0` for a constant-variance ("blank") window rather than
    /// dividing by zero.
    pub fn value(&self, integral: &IntegralImage, sq_integral: &IntegralImage, scale: f64) -> Result<f64> {
        let h = integral.height();
        let w = integral.width();
        if !self.is_valid(h, w, scale) {
            return Err(Error::InvalidHaarDescriptor { height: h, width: w, scale });
        }

        // Mean/variance are taken over the inner (h-1)x(w-1) region, not
        // the full window: S[h-1,w-1]-S[0,w-1]-S[h-1,0]+S[0,0], divided by
        // (h-1)(w-1), dropping the last row/column (spec.md section 4.1).
        let area = ((h - 1) * (w - 1)) as f64;
        let total = integral.rect_sum(1, 1, h, w);
        let mean = total / area;

        let sq_total = sq_integral.rect_sum(1, 1, h, w);
        let variance = (sq_total / area - mean * mean).max(0.0);
        if variance == 0.0 {
            return Ok(0.0);
        }
        let sigma = variance.sqrt();

        let cells = self.cell_sums(integral, scale);
        let combined = self.combine(&cells);

        Ok(combined / (sigma * scale * scale))
    }
}
