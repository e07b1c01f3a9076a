//! Integral images: O(1) axis-aligned rectangle sums over a grayscale grid.
use serde::{Deserialize, Serialize};

/// An integral image built from an `H x W` grid of `f64` pixel values.
///
/// `data[i][j]` holds `sum(g[i'][j'] for i' <= i, j' <= j)`. A zero-sentinel
/// row and column are kept implicit: row/column index `-1` is treated as
/// all zeros, which is what makes the four-corner rectangle formula below
/// work with no special-casing at the edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegralImage {
    height: usize,
    width: usize,
    // Row-major, (height+1) x (width+1): row 0 / column 0 are the
    // zero sentinels so `sum[i+1][j+1] == S[i][j]` with no special-casing
    // at the edges.
    sum: Vec<f64>,
}

impl IntegralImage {
    /// Build the integral image of `grid` (row-major, `height x width`).
    pub fn build(grid: &[f64], height: usize, width: usize) -> Self {
        assert_eq!(grid.len(), height * width, "grid size does not match height*width");

        let stride = width + 1;
        let mut sum = vec![0.0; (height + 1) * stride];
        for i in 0..height {
            let mut row_sum = 0.0;
            for j in 0..width {
                row_sum += grid[i * width + j];
                let above = sum[i * stride + (j + 1)];
                sum[(i + 1) * stride + (j + 1)] = above + row_sum;
            }
        }

        IntegralImage { height, width, sum }
    }

    /// Build the squared-value integral image of `grid`.
    pub fn build_squared(grid: &[f64], height: usize, width: usize) -> Self {
        let squared: Vec<f64> = grid.iter().map(|&v| v * v).collect();
        Self::build(&squared, height, width)
    }

    /// Grid height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn at(&self, i: isize, j: isize) -> f64 {
        if i < 0 || j < 0 {
            return 0.0;
        }
        let stride = self.width + 1;
        self.sum[(i as usize + 1) * stride + (j as usize + 1)]
    }

    /// Sum of `g[i][j]` over the half-open rectangle `[y1, y2) x [x1, x2)`.
    ///
    /// Four-corner inclusion-exclusion:
    /// `S[y2-1,x2-1] - S[y2-1,x1-1] - S[y1-1,x2-1] + S[y1-1,x1-1]`.
    pub fn rect_sum(&self, y1: usize, x1: usize, y2: usize, x2: usize) -> f64 {
        debug_assert!(y1 < y2 && x1 < x2);
        debug_assert!(y2 <= self.height && x2 <= self.width);

        let y2 = y2 as isize - 1;
        let x2 = x2 as isize - 1;
        let y1 = y1 as isize - 1;
        let x1 = x1 as isize - 1;

        self.at(y2, x2) - self.at(y2, x1) - self.at(y1, x2) + self.at(y1, x1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_by_two_integral_image() {
        // g = [[1,2],[3,4]]; S = [[1,3],[4,10]].
        let g = [1.0, 2.0, 3.0, 4.0];
        let s = IntegralImage::build(&g, 2, 2);

        assert_eq!(s.rect_sum(0, 0, 1, 1), 1.0);
        assert_eq!(s.rect_sum(0, 0, 1, 2), 3.0);
        assert_eq!(s.rect_sum(0, 0, 2, 1), 4.0);
        assert_eq!(s.rect_sum(0, 0, 2, 2), 10.0);

        // S[1,1] - S[0,1] - S[1,0] + S[0,0] == g[1,1] == 4.
        assert_eq!(s.rect_sum(1, 1, 2, 2), 4.0);
    }

    #[test]
    fn rect_sum_matches_brute_force() {
        let height = 6;
        let width = 5;
        let grid: Vec<f64> = (0..height * width).map(|v| v as f64 - 7.0).collect();
        let s = IntegralImage::build(&grid, height, width);

        for y1 in 0..height {
            for y2 in (y1 + 1)..=height {
                for x1 in 0..width {
                    for x2 in (x1 + 1)..=width {
                        let mut expect = 0.0;
                        for i in y1..y2 {
                            for j in x1..x2 {
                                expect += grid[i * width + j];
                            }
                        }
                        assert!((s.rect_sum(y1, x1, y2, x2) - expect).abs() < 1e-9);
                    }
                }
            }
        }
    }
}
