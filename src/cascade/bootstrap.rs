//! Hard-negative bootstrap between cascade stages: drop negatives the
//! current cascade already rejects, then refill the quota by scanning
//! fresh background images and mining false positives until the quota is
//! met or the background stream cycles back to its first image.

use crate::cascade::geometry::{crop_resize, GrayImage};
use crate::cascade::sampling::BackgroundSource;
use crate::cascade::Cascade;
use crate::detector::scan;
use crate::error::{Error, Result};
use crate::sample::{ImageDataset, ImageSample};
use crate::weak_learner::StumpOutput;

const DETECTOR_DELTA: usize = 2;

/// Drop rejected negatives from `dataset` (every positive is kept), then
/// top the negative count back up to `target_negatives` with false
/// positives mined from `backgrounds` by running `cascade` over fresh
/// images.
pub fn bootstrap_negatives<O: StumpOutput>(
    dataset: &mut ImageDataset,
    target_negatives: usize,
    cascade: &Cascade<O>,
    backgrounds: &mut impl BackgroundSource,
) -> Result<()> {
    let window = dataset.window();
    dataset.retain(|s| s.label > 0 || matches!(cascade.evaluate(s), Ok(Some(_))));

    let current_negatives = dataset.samples().iter().filter(|s| s.label <= 0).count();
    let mut needed = target_negatives.saturating_sub(current_negatives);
    if needed == 0 {
        return Ok(());
    }
    let requested = needed;

    let (first_image, first_id) =
        backgrounds.next_background().ok_or(Error::CallbackExhausted { collected: 0, needed: requested })?;
    let mut image: Option<GrayImage> = Some(first_image);
    let mut collected = 0;

    loop {
        let img = image.take().expect("loop body always sets image before the next iteration");
        for detection in scan(cascade, &img, DETECTOR_DELTA)? {
            if needed == 0 {
                break;
            }
            let grid = crop_resize(&img, &detection.rect, window);
            dataset.push(ImageSample::from_grid(&grid, window, window, -1));
            needed -= 1;
            collected += 1;
        }
        if needed == 0 {
            return Ok(());
        }

        match backgrounds.next_background() {
            Some((next_image, id)) if id != first_id => image = Some(next_image),
            _ => return Err(Error::CallbackExhausted { collected, needed: requested }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booster::{HaarBooster, Round};
    use crate::numeric::{HaarFeature, HaarKind};
    use crate::sample::ImageSample as Sample;
    use crate::weak_learner::{ContinuousStump, HaarStump, Plain};

    struct CyclingBackgrounds {
        blank: GrayImage,
        calls: usize,
        cycle_len: usize,
    }
    impl BackgroundSource for CyclingBackgrounds {
        fn next_background(&mut self) -> Option<(GrayImage, usize)> {
            let id = self.calls % self.cycle_len;
            self.calls += 1;
            Some((self.blank.clone(), id))
        }
    }

    fn checker_dataset(n_each: usize, window: usize) -> ImageDataset {
        let mut samples = Vec::new();
        for _ in 0..n_each {
            let mut grid = vec![0.0; window * window];
            for y in 0..window {
                for x in 0..window {
                    grid[y * window + x] = if x >= window / 2 { 100.0 } else { 0.0 };
                }
            }
            samples.push(Sample::from_grid(&grid, window, window, 1));
        }
        for _ in 0..n_each {
            samples.push(Sample::from_grid(&vec![50.0; window * window], window, window, -1));
        }
        ImageDataset::new(samples, window)
    }

    #[test]
    fn bootstrap_reports_exhaustion_on_a_never_triggering_cascade() {
        // A stage whose threshold no window can clear rejects every
        // candidate, so the quota can never be met and the stream exhausts
        // after one full cycle through the backgrounds.
        let haar = HaarFeature::new(HaarKind::TwoHorizontal, 0, 0, 3, 3);
        let stump = HaarStump { haar, stump: ContinuousStump { threshold: 1e9, below: Plain(1), above: Plain(-1) } };
        let cascade: Cascade<Plain> = Cascade {
            window: 6,
            false_positive_rate: 1.0,
            detection_rate: 1.0,
            stages: vec![HaarBooster { using_fold: false, threshold: 0.0, rounds: vec![Round { alpha: 1.0, hypothesis: stump }] }],
        };

        let mut dataset = checker_dataset(2, 6);
        let mut backgrounds = CyclingBackgrounds { blank: GrayImage::new(vec![50.0; 40 * 40], 40, 40), calls: 0, cycle_len: 3 };

        let err = bootstrap_negatives(&mut dataset, 50, &cascade, &mut backgrounds).unwrap_err();
        assert!(matches!(err, Error::CallbackExhausted { .. }));
    }
}
