//! Initial positive/negative sample set construction, driven by two
//! re-entrant, cyclable image providers.

use rand::Rng;

use crate::cascade::geometry::{crop_resize, random_square, GrayImage, Rect};
use crate::error::{Error, Result};
use crate::sample::{ImageDataset, ImageSample};

/// Supplies annotated positive (face) images. Implementations may cycle
/// back to the first image once exhausted.
pub trait FaceSource {
    /// Returns the next face image and the rectangle bounding the face
    /// within it, or `None` once the source cannot provide any more.
    fn next_face(&mut self) -> Option<(GrayImage, Rect)>;
}

/// Supplies background images containing no target object. Implementations
/// may cycle; `id` identifies the image so callers can detect a full cycle.
pub trait BackgroundSource {
    fn next_background(&mut self) -> Option<(GrayImage, usize)>;
}

fn sample_from_rect(image: &GrayImage, rect: &Rect, window: usize, label: i8) -> ImageSample {
    let grid = crop_resize(image, rect, window);
    ImageSample::from_grid(&grid, window, window, label)
}

/// Build the initial training pool: `n_positive` faces cropped to their
/// annotated rectangle and resized to `window x window`, and `n_negative`
/// backgrounds each contributing one uniformly random `window x window`
/// crop whose IoU against the background's own face box (if any is known
/// to the caller) is not checked here — the background source is expected
/// to hand back images it already knows contain no target, per
/// [`BackgroundSource`]. The pool is Fisher-Yates shuffled before return.
pub fn build_initial_dataset(
    window: usize,
    n_positive: usize,
    n_negative: usize,
    faces: &mut impl FaceSource,
    backgrounds: &mut impl BackgroundSource,
    rng: &mut impl Rng,
) -> Result<ImageDataset> {
    let mut samples = Vec::with_capacity(n_positive + n_negative);

    for _ in 0..n_positive {
        let (image, rect) = faces.next_face().ok_or(Error::CallbackExhausted { collected: samples.len(), needed: n_positive })?;
        samples.push(sample_from_rect(&image, &rect, window, 1));
    }

    for _ in 0..n_negative {
        let (image, _id) = backgrounds
            .next_background()
            .ok_or(Error::CallbackExhausted { collected: samples.len() - n_positive, needed: n_negative })?;
        let rect = random_square(window, image.height, image.width, rng);
        samples.push(sample_from_rect(&image, &rect, window, -1));
    }

    for i in (1..samples.len()).rev() {
        let j = rng.gen_range(0..=i);
        samples.swap(i, j);
    }

    Ok(ImageDataset::new(samples, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FixedFaces {
        remaining: usize,
    }
    impl FaceSource for FixedFaces {
        fn next_face(&mut self) -> Option<(GrayImage, Rect)> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            Some((GrayImage::new(vec![50.0; 24 * 24], 24, 24), Rect::square(0, 0, 24)))
        }
    }

    struct FixedBackgrounds {
        remaining: usize,
    }
    impl BackgroundSource for FixedBackgrounds {
        fn next_background(&mut self) -> Option<(GrayImage, usize)> {
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            Some((GrayImage::new(vec![10.0; 40 * 40], 40, 40), self.remaining))
        }
    }

    #[test]
    fn builds_requested_pool_size() {
        let mut faces = FixedFaces { remaining: 5 };
        let mut backgrounds = FixedBackgrounds { remaining: 5 };
        let mut rng = StdRng::seed_from_u64(7);
        let dataset = build_initial_dataset(12, 5, 5, &mut faces, &mut backgrounds, &mut rng).unwrap();
        assert_eq!(dataset.n_samples(), 10);
        assert_eq!(dataset.window(), 12);
    }

    #[test]
    fn reports_exhaustion_as_callback_error() {
        let mut faces = FixedFaces { remaining: 2 };
        let mut backgrounds = FixedBackgrounds { remaining: 5 };
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_initial_dataset(12, 5, 5, &mut faces, &mut backgrounds, &mut rng).unwrap_err();
        assert!(matches!(err, Error::CallbackExhausted { .. }));
    }
}
