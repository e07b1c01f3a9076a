//! The Haar-feature boosted classifier ("stage"): a sequence of
//! `(alpha, haar_learner)` pairs plus a decision threshold `tau`
//! calibrated against a validation split, with optional asymmetric
//! reweighting of the initial/per-round distribution.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::booster::driver::{update_distribution, weighted_training_error, Round};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::numeric::AlphaSolver;
use crate::sample::{Distribution, ImageDataset};
use crate::weak_learner::genetic::train_haar_genetic;
use crate::weak_learner::haar::{train_haar_exhaustive, HaarStump};
use crate::weak_learner::StumpOutput;

/// Which Haar weak-learner search strategy a stage trains with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaarSearch {
    Exhaustive,
    Genetic,
}

/// Asymmetric-loss reweighting applied to a stage's training distribution,
/// trading detection rate for false-positive rate in favor of recall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AsymmetricMode {
    /// Symmetric boosting; no reweighting bias.
    None,
    /// Positives' initial weight is multiplied by `sqrt(k)`, negatives'
    /// by `1/sqrt(k)`, once before the first round.
    Classical,
    /// The `sqrt(k)`/`1/sqrt(k)` pressure is spread over the first
    /// `config.asym_turn` rounds as a per-round factor of
    /// `k^(1/(2*asym_turn))`, rather than absorbed entirely by the first
    /// learner.
    Improved,
}

fn apply_asymmetric_factor(dist: &mut Distribution, labels: &[i8], factor: f64) {
    for (d, &y) in dist.as_mut_slice().iter_mut().zip(labels) {
        *d *= if y > 0 { factor } else { 1.0 / factor };
    }
    dist.normalize();
}

/// Outcome of training one Haar boosting stage: the trained booster plus
/// the realized rates measured against the validation split, for the
/// cascade trainer to accumulate and log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageOutcome {
    pub detection_rate: f64,
    pub false_positive_rate: f64,
    pub rounds_used: usize,
    /// True if `false_positive_rate <= f*` was reached; false if the
    /// round budget ran out first (the caller accepts the stage's best
    /// effort either way, per the cascade's early-exit rule).
    pub reached_target: bool,
}

/// A boosted classifier over Haar descriptors: `score(window) = sum_t
/// alpha_t * h_t(window) - tau`; accepted iff `score > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaarBooster<O> {
    pub using_fold: bool,
    pub threshold: f64,
    pub rounds: Vec<Round<HaarStump<O>>>,
}

impl<O: StumpOutput> HaarBooster<O> {
    /// Cumulative score before the decision threshold is applied.
    pub fn raw_score(&self, window: &crate::sample::ImageSample, scale: f64) -> Result<f64> {
        let mut total = 0.0;
        for round in &self.rounds {
            total += round.alpha * round.hypothesis.margin(&window.integral, &window.sq_integral, scale)?;
        }
        Ok(total)
    }

    /// `raw_score - tau`; the window is accepted iff this is `> 0`.
    pub fn score(&self, window: &crate::sample::ImageSample, scale: f64) -> Result<f64> {
        Ok(self.raw_score(window, scale)? - self.threshold)
    }

    pub fn accepts(&self, window: &crate::sample::ImageSample, scale: f64) -> Result<bool> {
        Ok(self.score(window, scale)? > 0.0)
    }
}

/// Walk validation scores (descending) counting real positives until the
/// `detection_target` quota is met, widening across score ties, then set
/// `tau` to the midpoint of the two flanking scores (nudged away from the
/// lower flank by `config.min_interval` when the gap allows it).
fn calibrate_threshold(
    validation: &ImageDataset,
    scores: &[f64],
    detection_target: f64,
    config: &Config,
) -> (f64, f64, f64) {
    let m = scores.len();
    let n_pos = validation.samples().iter().filter(|s| s.label > 0).count().max(1);
    let n_neg = (m - n_pos).max(1);

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&i, &j| scores[j].partial_cmp(&scores[i]).unwrap());

    let quota = ((detection_target * n_pos as f64).ceil() as usize).clamp(1, n_pos);

    let mut accepted = 0usize;
    let mut pos_count = 0usize;
    let mut idx = 0;
    while idx < m {
        let cur_score = scores[order[idx]];
        let mut end = idx;
        while end < m && scores[order[end]] == cur_score {
            end += 1;
        }
        for &k in &order[idx..end] {
            if validation.sample(k).label > 0 {
                pos_count += 1;
            }
        }
        accepted = end;
        idx = end;
        if pos_count >= quota {
            break;
        }
    }

    let threshold = if accepted < m {
        let lower = scores[order[accepted - 1]];
        let upper = scores[order[accepted]];
        let nudged = lower + config.min_interval;
        if nudged < upper { nudged } else { 0.5 * (lower + upper) }
    } else {
        scores[order[accepted - 1]] - config.min_interval
    };

    let detection_rate =
        validation.samples().iter().zip(scores).filter(|(s, &sc)| s.label > 0 && sc > threshold).count() as f64
            / n_pos as f64;
    let false_positive_rate =
        validation.samples().iter().zip(scores).filter(|(s, &sc)| s.label <= 0 && sc > threshold).count() as f64
            / n_neg as f64;

    (threshold, detection_rate, false_positive_rate)
}

/// Train one cascade stage: repeatedly append Haar weak learners, running
/// the ratio-check threshold calibration after each one, until the
/// false-positive target `f_target` is met on the validation split or
/// `max_rounds` is exhausted (the latter accepted as the stage's best
/// effort).
pub fn train_haar_booster<O: StumpOutput>(
    train_set: &ImageDataset,
    validation_set: &ImageDataset,
    search: HaarSearch,
    solver: &dyn AlphaSolver,
    using_fold: bool,
    detection_target: f64,
    fp_target: f64,
    max_rounds: usize,
    asymmetric: AsymmetricMode,
    config: &Config,
    rng: &mut impl Rng,
) -> Result<(HaarBooster<O>, StageOutcome)> {
    let train_labels: Vec<i8> = train_set.samples().iter().map(|s| s.label).collect();

    let mut dist = Distribution::uniform(train_set.n_samples());
    if asymmetric == AsymmetricMode::Classical {
        apply_asymmetric_factor(&mut dist, &train_labels, config.asym_const.sqrt());
    }

    let mut rounds: Vec<Round<HaarStump<O>>> = Vec::new();
    let mut cumulative_scores = vec![0.0_f64; validation_set.n_samples()];

    let mut outcome = StageOutcome { detection_rate: 0.0, false_positive_rate: 1.0, rounds_used: 0, reached_target: false };

    for round_index in 0..max_rounds {
        let learner: HaarStump<O> = match search {
            HaarSearch::Exhaustive => train_haar_exhaustive(train_set, &dist, config.vec_seg_interval),
            HaarSearch::Genetic => train_haar_genetic(train_set, &dist, config, rng),
        };

        let margins: Result<Vec<f64>> = train_set
            .samples()
            .iter()
            .enumerate()
            .map(|(i, s)| Ok(train_labels[i] as f64 * learner.margin(&s.integral, &s.sq_integral, 1.0)?))
            .collect();
        let margins = margins?;

        let error = weighted_training_error(&margins, dist.as_slice());
        if error >= 0.5 {
            return Err(Error::Convergence { error });
        }

        let alpha = if error == 0.0 { 1.0 } else { solver.alpha(&margins, dist.as_slice())? };
        rounds.push(Round { alpha, hypothesis: learner.clone() });

        for (i, s) in validation_set.samples().iter().enumerate() {
            cumulative_scores[i] += alpha * learner.margin(&s.integral, &s.sq_integral, 1.0)?;
        }

        let (threshold, detection_rate, false_positive_rate) =
            calibrate_threshold(validation_set, &cumulative_scores, detection_target, config);

        outcome = StageOutcome {
            detection_rate,
            false_positive_rate,
            rounds_used: round_index + 1,
            reached_target: false_positive_rate <= fp_target,
        };

        if error == 0.0 || outcome.reached_target {
            outcome.reached_target = true;
            let booster = HaarBooster { using_fold, threshold, rounds };
            return Ok((booster, outcome));
        }

        if error > 0.0 {
            update_distribution(&mut dist, &margins, alpha);
        }
        if asymmetric == AsymmetricMode::Improved && round_index < config.asym_turn {
            let factor = config.asym_const.powf(1.0 / (2.0 * config.asym_turn as f64));
            apply_asymmetric_factor(&mut dist, &train_labels, factor);
        }
    }

    let (threshold, detection_rate, false_positive_rate) =
        calibrate_threshold(validation_set, &cumulative_scores, detection_target, config);
    outcome = StageOutcome { detection_rate, false_positive_rate, rounds_used: max_rounds, reached_target: false };
    Ok((HaarBooster { using_fold, threshold, rounds }, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Approx;
    use crate::sample::ImageSample;
    use crate::weak_learner::Plain;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn checker_dataset(n_each: usize) -> ImageDataset {
        let mut samples = Vec::new();
        for _ in 0..n_each {
            let mut grid = vec![0.0; 36];
            for y in 0..6 {
                for x in 0..6 {
                    grid[y * 6 + x] = if x >= 3 { 100.0 } else { 0.0 };
                }
            }
            samples.push(ImageSample::from_grid(&grid, 6, 6, 1));
        }
        for _ in 0..n_each {
            let mut grid = vec![0.0; 36];
            for y in 0..6 {
                for x in 0..6 {
                    grid[y * 6 + x] = if x < 3 { 100.0 } else { 0.0 };
                }
            }
            samples.push(ImageSample::from_grid(&grid, 6, 6, -1));
        }
        ImageDataset::new(samples, 6)
    }

    #[test]
    fn asymmetric_factor_reweights_positives_up_and_negatives_down() {
        let labels = [1i8, 1, -1, -1];
        let mut dist = Distribution::uniform(4);
        apply_asymmetric_factor(&mut dist, &labels, 4.0_f64.sqrt());

        let d = dist.as_slice();
        assert!((d[0] - 0.4).abs() < 1e-9);
        assert!((d[1] - 0.4).abs() < 1e-9);
        assert!((d[2] - 0.1).abs() < 1e-9);
        assert!((d[3] - 0.1).abs() < 1e-9);
        assert!((d.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stage_reaches_false_positive_target_on_separable_data() {
        let train_set = checker_dataset(6);
        let validation_set = checker_dataset(6);
        let mut rng = StdRng::seed_from_u64(5);

        let (booster, outcome): (HaarBooster<Plain>, StageOutcome) = train_haar_booster(
            &train_set,
            &validation_set,
            HaarSearch::Exhaustive,
            &Approx,
            false,
            0.99,
            0.01,
            10,
            AsymmetricMode::None,
            &Config::default(),
            &mut rng,
        )
        .unwrap();

        assert!(outcome.detection_rate >= 0.99 - 1e-9);
        assert!(outcome.reached_target || outcome.rounds_used == 10);
        for s in validation_set.samples() {
            let _ = booster.accepts(s, 1.0).unwrap();
        }
    }
}
