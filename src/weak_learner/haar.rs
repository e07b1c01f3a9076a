//! Haar-feature weak learners and their exhaustive training search.
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::numeric::haar::{HaarFeature, HaarKind};
use crate::sample::{Distribution, ImageDataset};
use crate::weak_learner::continuous::best_split_sorted;
use crate::weak_learner::stump::{ContinuousStump, StumpOutput};

/// A weak learner over an image sample: a Haar descriptor plus the
/// continuous stump trained on its (variance-normalized) value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaarStump<O> {
    pub haar: HaarFeature,
    pub stump: ContinuousStump<O>,
}

impl<O: StumpOutput> HaarStump<O> {
    /// Margin (signed confidence/output) of this learner on one window,
    /// evaluated at the given scale.
    pub fn margin(&self, integral: &crate::numeric::IntegralImage, sq_integral: &crate::numeric::IntegralImage, scale: f64) -> Result<f64> {
        let v = self.haar.value(integral, sq_integral, scale)?;
        Ok(self.stump.eval(v))
    }
}

/// All Haar tiling kinds, enumerated in a fixed order.
const KINDS: [HaarKind; 4] =
    [HaarKind::TwoHorizontal, HaarKind::TwoVertical, HaarKind::ThreeHorizontal, HaarKind::FourQuad];

/// Enumerate every valid Haar descriptor for a `window x window` training
/// size.
pub fn enumerate_descriptors(window: usize) -> Vec<HaarFeature> {
    let mut out = Vec::new();
    for &kind in &KINDS {
        for width in 1..=window {
            for height in 1..=window {
                for start_x in 0..window {
                    for start_y in 0..window {
                        let f = HaarFeature::new(kind, start_x, start_y, width, height);
                        if f.is_valid(window, window, 1.0) {
                            out.push(f);
                        }
                    }
                }
            }
        }
    }
    out
}

/// Per-sample Haar values for one descriptor over a training window
/// (evaluated at scale 1.0, the cascade's own training window size).
pub fn haar_values(dataset: &ImageDataset, descriptor: &HaarFeature) -> Vec<f64> {
    dataset
        .samples()
        .iter()
        .map(|s| descriptor.value(&s.integral, &s.sq_integral, 1.0).unwrap_or(0.0))
        .collect()
}

fn labels_as_f64(dataset: &ImageDataset) -> Vec<f64> {
    dataset.samples().iter().map(|s| s.label as f64).collect()
}

/// Exhaustive enumeration search: for every valid Haar descriptor, train
/// the optimal continuous split and keep the smallest-Z descriptor/split
/// pair. `O(#descriptors * m)`.
pub fn train_haar_exhaustive<O: StumpOutput>(
    dataset: &ImageDataset,
    dist: &Distribution,
    vec_seg_interval: f64,
) -> HaarStump<O> {
    let labels = labels_as_f64(dataset);
    let descriptors = enumerate_descriptors(dataset.window());
    assert!(!descriptors.is_empty(), "no valid Haar descriptor for this window size");

    let mut best_descriptor = descriptors[0];
    let mut best = None;

    for descriptor in &descriptors {
        let values = haar_values(dataset, descriptor);
        let outcome = best_split_sorted(&values, &labels, dist.as_slice(), vec_seg_interval, O::IS_CONFIDENCE);
        if best.map(|b: crate::weak_learner::continuous::SplitOutcome| outcome.z < b.z).unwrap_or(true) {
            best = Some(outcome);
            best_descriptor = *descriptor;
        }
    }

    let outcome = best.expect("at least one descriptor was searched");
    HaarStump {
        haar: best_descriptor,
        stump: ContinuousStump {
            threshold: outcome.threshold,
            below: O::from_margin(outcome.below),
            above: O::from_margin(outcome.above),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::ImageSample;
    use crate::weak_learner::stump::Plain;

    fn checker_dataset() -> ImageDataset {
        // 4x4 windows: label +1 = bright-right, label -1 = bright-left.
        let mut samples = Vec::new();
        for _ in 0..4 {
            let mut grid = vec![0.0; 16];
            for y in 0..4 {
                for x in 0..4 {
                    grid[y * 4 + x] = if x >= 2 { 100.0 } else { 0.0 };
                }
            }
            samples.push(ImageSample::from_grid(&grid, 4, 4, 1));
        }
        for _ in 0..4 {
            let mut grid = vec![0.0; 16];
            for y in 0..4 {
                for x in 0..4 {
                    grid[y * 4 + x] = if x < 2 { 100.0 } else { 0.0 };
                }
            }
            samples.push(ImageSample::from_grid(&grid, 4, 4, -1));
        }
        ImageDataset::new(samples, 4)
    }

    #[test]
    fn enumerate_descriptors_are_all_valid() {
        let descriptors = enumerate_descriptors(4);
        assert!(!descriptors.is_empty());
        for d in &descriptors {
            assert!(d.is_valid(4, 4, 1.0));
        }
    }

    #[test]
    fn exhaustive_search_finds_separating_feature() {
        let dataset = checker_dataset();
        let dist = Distribution::uniform(dataset.n_samples());
        let learner: HaarStump<Plain> = train_haar_exhaustive(&dataset, &dist, 1e-3);

        let mut correct = 0;
        for s in dataset.samples() {
            let m = learner.margin(&s.integral, &s.sq_integral, 1.0).unwrap();
            if m.signum() as i8 == s.label {
                correct += 1;
            }
        }
        assert_eq!(correct, dataset.n_samples());
    }
}
