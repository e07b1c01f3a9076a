//! The generic boosting driver: a reweighting loop parameterized by a
//! per-round training closure, shared across the vector-binary,
//! vector-multiclass, and Haar boosters.
use crate::error::{Error, Result};
use crate::numeric::AlphaSolver;
use crate::sample::Distribution;

/// One accepted round: a weak learner and the coefficient it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct Round<H> {
    pub alpha: f64,
    pub hypothesis: H,
}

/// D-weighted fraction of samples this round's margins got wrong
/// (`margin <= 0`).
pub fn weighted_training_error(margins: &[f64], dist: &[f64]) -> f64 {
    margins.iter().zip(dist).filter(|(&m, _)| m <= 0.0).map(|(_, &d)| d).sum()
}

/// Reweight `D_i <- D_i * exp(-alpha * v_i)` and renormalize, working in
/// log space and folding the normalizer via an ascending-value sweep
/// (`a + ln(1 + exp(b - a))` with `a >= b`) so no individual term
/// overflows before the final exponentiation.
pub fn update_distribution(dist: &mut Distribution, margins: &[f64], alpha: f64) {
    let weights = dist.as_mut_slice();
    for (d, &v) in weights.iter_mut().zip(margins) {
        *d = d.ln() - alpha * v;
    }

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&i, &j| weights[i].partial_cmp(&weights[j]).unwrap());

    let mut normalizer = weights[order[0]];
    for &i in order.iter().skip(1) {
        let (a, b) = if normalizer >= weights[i] { (normalizer, weights[i]) } else { (weights[i], normalizer) };
        normalizer = a + (1.0 + (b - a).exp()).ln();
    }

    for d in weights.iter_mut() {
        *d = (*d - normalizer).exp();
    }
}

/// Outcome of one completed driver run.
pub struct DriverRun<H> {
    pub rounds: Vec<Round<H>>,
    /// True if the run stopped because a round reached zero weighted
    /// training error (the all-pass case), rather than exhausting its
    /// round budget.
    pub all_pass: bool,
}

/// Run the boosting loop for up to `max_rounds`, calling `train_round` once
/// per round with the current distribution and expecting back a trained
/// weak learner plus its per-sample signed margins `v_i = y_i * h(x_i)`.
///
/// Fails with [`Error::Convergence`] if a round's weighted training error
/// reaches or exceeds one half. Stops early (all-pass) the first round a
/// learner achieves zero weighted training error, fixing its coefficient
/// to `1.0` regardless of the supplied solver.
pub fn run_driver<H: Clone>(
    dist: &mut Distribution,
    max_rounds: usize,
    solver: &dyn AlphaSolver,
    mut train_round: impl FnMut(&Distribution) -> (H, Vec<f64>),
) -> Result<DriverRun<H>> {
    let mut rounds = Vec::with_capacity(max_rounds);

    for round_index in 0..max_rounds {
        let (hypothesis, margins) = train_round(dist);
        let error = weighted_training_error(&margins, dist.as_slice());
        if error >= 0.5 {
            return Err(Error::Convergence { error });
        }

        if error == 0.0 {
            // All-pass: fix alpha=1 and replicate this round across every
            // remaining slot rather than leaving the ensemble short.
            let filled = Round { alpha: 1.0, hypothesis };
            for _ in round_index..max_rounds {
                rounds.push(filled.clone());
            }
            return Ok(DriverRun { rounds, all_pass: true });
        }

        let alpha = solver.alpha(&margins, dist.as_slice())?;
        rounds.push(Round { alpha, hypothesis });
        update_distribution(dist, &margins, alpha);
    }

    Ok(DriverRun { rounds, all_pass: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_error_counts_only_nonpositive_margins() {
        let margins = [1.0, -1.0, 0.0, 2.0];
        let dist = [0.25, 0.25, 0.25, 0.25];
        assert!((weighted_training_error(&margins, &dist) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn update_distribution_stays_normalized() {
        let mut dist = Distribution::uniform(5);
        let margins = [1.0, -1.0, 1.0, 1.0, -0.5];
        update_distribution(&mut dist, &margins, 0.3);
        let sum: f64 = dist.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn all_pass_round_fixes_alpha_to_one_and_fills_remaining_slots() {
        use crate::numeric::Unit;

        let mut dist = Distribution::uniform(3);
        let run = run_driver(&mut dist, 10, &Unit, |_d| {
            // A learner that gets every sample right every time.
            (42_i32, vec![1.0, 1.0, 1.0])
        })
        .unwrap();

        assert!(run.all_pass);
        assert_eq!(run.rounds.len(), 10);
        assert!(run.rounds.iter().all(|r| r.alpha == 1.0 && r.hypothesis == 42));
    }

    #[test]
    fn convergence_failure_is_reported() {
        use crate::numeric::Unit;

        let mut dist = Distribution::uniform(2);
        let err = run_driver(&mut dist, 10, &Unit, |_d| (0_i32, vec![-1.0, -1.0])).unwrap_err();
        assert!(matches!(err, Error::Convergence { .. }));
    }
}
