//! Raw grayscale images, axis-aligned rectangles, and the nearest-neighbor
//! crop/resize used to turn an annotated rectangle into a fixed-size
//! training window.

use rand::Rng;

/// A raw grayscale image: row-major pixel values, one `f64` per pixel.
#[derive(Debug, Clone)]
pub struct GrayImage {
    pub height: usize,
    pub width: usize,
    pub pixels: Vec<f64>,
}

impl GrayImage {
    pub fn new(pixels: Vec<f64>, height: usize, width: usize) -> Self {
        assert_eq!(pixels.len(), height * width, "pixel buffer does not match height*width");
        GrayImage { height, width, pixels }
    }

    pub fn get(&self, y: usize, x: usize) -> f64 {
        self.pixels[y * self.width + x]
    }
}

/// An axis-aligned rectangle in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn square(x: usize, y: usize, len: usize) -> Self {
        Rect { x, y, width: len, height: len }
    }
}

/// Intersection-over-union of two rectangles; `0.0` when they don't overlap.
pub fn iou(a: &Rect, b: &Rect) -> f64 {
    let ix = a.x.max(b.x);
    let iy = a.y.max(b.y);
    let iex = (a.x + a.width).min(b.x + b.width);
    let iey = (a.y + a.height).min(b.y + b.height);
    if iex <= ix || iey <= iy {
        return 0.0;
    }
    let inter = (iex - ix) as f64 * (iey - iy) as f64;
    let area_a = (a.width * a.height) as f64;
    let area_b = (b.width * b.height) as f64;
    inter / (area_a + area_b - inter)
}

/// Nearest-neighbor resample of `rect` within `image` down (or up) to a
/// `size x size` grid, one independent rate per axis.
pub fn crop_resize(image: &GrayImage, rect: &Rect, size: usize) -> Vec<f64> {
    let rate_x = rect.width as f64 / size as f64;
    let rate_y = rect.height as f64 / size as f64;
    let mut out = vec![0.0; size * size];
    for i in 0..size {
        let src_y = (rect.y as f64 + i as f64 * rate_y) as usize;
        let src_y = src_y.min(image.height - 1);
        for j in 0..size {
            let src_x = (rect.x as f64 + j as f64 * rate_x) as usize;
            let src_x = src_x.min(image.width - 1);
            out[i * size + j] = image.get(src_y, src_x);
        }
    }
    out
}

/// A uniformly random square of side length `min_len..=min(height, width)`
/// placed at a uniformly random position within the image.
pub fn random_square(min_len: usize, height: usize, width: usize, rng: &mut impl Rng) -> Rect {
    let max_len = height.min(width);
    let len = if max_len <= min_len { min_len } else { rng.gen_range(min_len..max_len) };
    let x = if width == len { 0 } else { rng.gen_range(0..width - len) };
    let y = if height == len { 0 } else { rng.gen_range(0..height - len) };
    Rect::square(x, y, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn identical_rects_have_iou_one() {
        let r = Rect::square(3, 4, 10);
        assert!((iou(&r, &r) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_rects_have_iou_zero() {
        let a = Rect::square(0, 0, 5);
        let b = Rect::square(10, 10, 5);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn iou_is_symmetric() {
        let a = Rect { x: 0, y: 0, width: 10, height: 6 };
        let b = Rect { x: 4, y: 2, width: 8, height: 8 };
        assert!((iou(&a, &b) - iou(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn crop_resize_produces_requested_size() {
        let image = GrayImage::new(vec![1.0; 20 * 20], 20, 20);
        let rect = Rect::square(2, 2, 10);
        let out = crop_resize(&image, &rect, 6);
        assert_eq!(out.len(), 36);
    }

    #[test]
    fn random_square_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let r = random_square(4, 30, 20, &mut rng);
            assert!(r.x + r.width <= 20);
            assert!(r.y + r.height <= 30);
        }
    }
}
