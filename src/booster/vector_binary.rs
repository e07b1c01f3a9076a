//! The binary-vector boosted classifier: a sequence of `(alpha, stump)`
//! pairs trained by the generic driver over a feature-vector dataset.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::booster::driver::{run_driver, Round};
use crate::config::Config;
use crate::error::Result;
use crate::numeric::AlphaSolver;
use crate::sample::{Distribution, VectorDataset};
use crate::weak_learner::{
    build_sort_cache, train_vector_continuous_bnb, train_vector_continuous_cached, train_vector_discrete,
    StumpOutput, VectorStump,
};

/// Which weak-learner search strategy a training round uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorSearch {
    /// Sort-cache-based exhaustive continuous search.
    ContinuousCached,
    /// Branch-and-bound continuous search (no cache required).
    ContinuousBnb,
    /// Exhaustive discrete search.
    Discrete,
}

/// A boosted classifier over feature vectors: `sign(sum_t alpha_t * h_t(x))`
/// for plain outputs, or the raw weighted sum for confidence-rated ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorBinaryBooster<O> {
    /// When true, every round's coefficient is 1 and the α array is not
    /// stored separately (the learner's own output scale absorbs it).
    pub using_fold: bool,
    pub rounds: Vec<Round<VectorStump<O>>>,
}

impl<O: StumpOutput> VectorBinaryBooster<O> {
    /// Train by running the boosting driver for up to `max_rounds`,
    /// searching for each round's weak learner with `search`.
    pub fn train(
        dataset: &VectorDataset<i8>,
        search: VectorSearch,
        solver: &dyn AlphaSolver,
        using_fold: bool,
        max_rounds: usize,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let labels: Vec<f64> = (0..dataset.n_samples()).map(|i| *dataset.label(i) as f64).collect();
        let sort_cache = if search == VectorSearch::ContinuousCached { Some(build_sort_cache(dataset)) } else { None };

        let mut dist = Distribution::uniform(dataset.n_samples());
        let run = run_driver(&mut dist, max_rounds, solver, |d| {
            let stump: VectorStump<O> = match search {
                VectorSearch::ContinuousCached => {
                    train_vector_continuous_cached(dataset, d, sort_cache.as_ref().unwrap(), config.vec_seg_interval)
                }
                VectorSearch::ContinuousBnb => train_vector_continuous_bnb(dataset, d, config.vec_seg_interval, rng),
                VectorSearch::Discrete => train_vector_discrete(dataset, d),
            };
            let margins: Vec<f64> =
                (0..dataset.n_samples()).map(|i| labels[i] * stump.margin(dataset.row(i))).collect();
            (stump, margins)
        })?;

        Ok(VectorBinaryBooster { using_fold, rounds: run.rounds })
    }

    /// Real-valued weighted sum `sum_t alpha_t * h_t(x)`.
    pub fn confidence(&self, x: &[f64]) -> f64 {
        self.rounds.iter().map(|r| r.alpha * r.hypothesis.margin(x)).sum()
    }

    /// `{-1, +1}` prediction: the sign of [`Self::confidence`].
    pub fn predict(&self, x: &[f64]) -> i8 {
        if self.confidence(x) >= 0.0 { 1 } else { -1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Approx;
    use crate::sample::VectorRow;
    use crate::weak_learner::Plain;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn separable_dataset() -> VectorDataset<i8> {
        VectorDataset::new(vec![
            VectorRow { x: vec![-2.0], label: -1 },
            VectorRow { x: vec![-1.0], label: -1 },
            VectorRow { x: vec![1.0], label: 1 },
            VectorRow { x: vec![2.0], label: 1 },
        ])
    }

    #[test]
    fn trains_to_perfect_accuracy_on_separable_data() {
        let dataset = separable_dataset();
        let mut rng = StdRng::seed_from_u64(3);
        let booster: VectorBinaryBooster<Plain> =
            VectorBinaryBooster::train(&dataset, VectorSearch::ContinuousCached, &Approx, false, 10, &Config::default(), &mut rng)
                .unwrap();

        for i in 0..dataset.n_samples() {
            assert_eq!(booster.predict(dataset.row(i)), *dataset.label(i));
        }
    }
}
