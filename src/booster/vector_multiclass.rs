//! The multiclass-vector boosted classifier, trained by Hamming-loss
//! boosting: each round is a *group* of `K` per-class learners scored
//! against a dense `{-1,+1}` class-membership matrix.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::booster::driver::{run_driver, Round};
use crate::config::Config;
use crate::error::Result;
use crate::numeric::AlphaSolver;
use crate::sample::{Distribution, VectorDataset, VectorRow};
use crate::weak_learner::{
    build_sort_cache, train_vector_continuous_bnb, train_vector_continuous_cached, train_vector_discrete,
    StumpOutput, VectorStump,
};

use super::vector_binary::VectorSearch;

/// One class row's `{-1,+1}` membership value for every sample, row-major
/// `Y[class][sample]`.
fn membership_matrix(labels: &[usize], n_classes: usize) -> Vec<Vec<f64>> {
    let mut y = vec![vec![-1.0; labels.len()]; n_classes];
    for (i, &label) in labels.iter().enumerate() {
        y[label][i] = 1.0;
    }
    y
}

/// A boosted classifier over feature vectors with `K` classes: each round
/// contributes one learner per class, scored by `argmax_j sum_t alpha_t *
/// h_{j,t}(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMulticlassBooster<O> {
    pub using_fold: bool,
    pub n_classes: usize,
    pub rounds: Vec<Round<Vec<VectorStump<O>>>>,
}

impl<O: StumpOutput> VectorMulticlassBooster<O> {
    /// Train by Hamming-loss boosting: `D` is a flat length `K*m` array
    /// (row-major `(class, sample)`), one weak learner is trained per
    /// class each round, and the round's margins are the concatenation of
    /// every class row's `h_j(x_i) * Y_{j,i}`.
    pub fn train(
        dataset: &VectorDataset<usize>,
        n_classes: usize,
        search: VectorSearch,
        solver: &dyn AlphaSolver,
        using_fold: bool,
        max_rounds: usize,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let m = dataset.n_samples();
        let labels: Vec<usize> = (0..m).map(|i| *dataset.label(i)).collect();
        let y = membership_matrix(&labels, n_classes);

        // Reuse the per-feature vector machinery by training each class
        // row against a binary {-1,+1} dataset sharing the same rows.
        let binary_rows: Vec<VectorRow<i8>> = dataset
            .rows()
            .iter()
            .map(|r| VectorRow { x: r.x.clone(), label: 1 })
            .collect();
        let template = VectorDataset::new(binary_rows);
        let sort_cache = if search == VectorSearch::ContinuousCached { Some(build_sort_cache(&template)) } else { None };

        let mut dist = Distribution::uniform(n_classes * m);
        let run = run_driver(&mut dist, max_rounds, solver, |d| {
            let flat = d.as_slice();
            let mut group = Vec::with_capacity(n_classes);
            let mut margins = Vec::with_capacity(n_classes * m);

            for class in 0..n_classes {
                let class_dist: Distribution = flat[class * m..(class + 1) * m].to_vec().into();
                let class_labels: Vec<i8> = y[class].iter().map(|&v| if v > 0.0 { 1 } else { -1 }).collect();
                let class_dataset = VectorDataset::new(
                    dataset
                        .rows()
                        .iter()
                        .zip(&class_labels)
                        .map(|(r, &label)| VectorRow { x: r.x.clone(), label })
                        .collect(),
                );

                let stump: VectorStump<O> = match search {
                    VectorSearch::ContinuousCached => train_vector_continuous_cached(
                        &class_dataset,
                        &class_dist,
                        sort_cache.as_ref().unwrap(),
                        config.vec_seg_interval,
                    ),
                    VectorSearch::ContinuousBnb => {
                        train_vector_continuous_bnb(&class_dataset, &class_dist, config.vec_seg_interval, rng)
                    }
                    VectorSearch::Discrete => train_vector_discrete(&class_dataset, &class_dist),
                };

                for i in 0..m {
                    margins.push(y[class][i] * stump.margin(dataset.row(i)));
                }
                group.push(stump);
            }

            (group, margins)
        })?;

        Ok(VectorMulticlassBooster { using_fold, n_classes, rounds: run.rounds })
    }

    /// Per-class score `sum_t alpha_t * h_{j,t}(x)`.
    pub fn scores(&self, x: &[f64]) -> Vec<f64> {
        let mut scores = vec![0.0; self.n_classes];
        for round in &self.rounds {
            for (class, stump) in round.hypothesis.iter().enumerate() {
                scores[class] += round.alpha * stump.margin(x);
            }
        }
        scores
    }

    /// The argmax class under [`Self::scores`].
    pub fn predict(&self, x: &[f64]) -> usize {
        let scores = self.scores(x);
        scores
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
            .0
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

    fn three_class_dataset() -> VectorDataset<usize> {
        VectorDataset::new(vec![
            VectorRow { x: vec![-5.0], label: 0 },
            VectorRow { x: vec![-4.0], label: 0 },
            VectorRow { x: vec![0.0], label: 1 },
            VectorRow { x: vec![0.5], label: 1 },
            VectorRow { x: vec![5.0], label: 2 },
            VectorRow { x: vec![4.0], label: 2 },
        ])
    }

    #[test]
    fn trains_and_predicts_separable_classes() {
        let dataset = three_class_dataset();
        let mut rng = StdRng::seed_from_u64(11);
        let booster: VectorMulticlassBooster<Plain> = VectorMulticlassBooster::train(
            &dataset,
            3,
            VectorSearch::ContinuousCached,
            &Approx,
            false,
            6,
            &Config::default(),
            &mut rng,
        )
        .unwrap();

        let mut correct = 0;
        for i in 0..dataset.n_samples() {
            if booster.predict(dataset.row(i)) == *dataset.label(i) {
                correct += 1;
            }
        }
        assert!(correct >= dataset.n_samples() - 1, "multiclass booster got {correct}/{} right", dataset.n_samples());
    }
}
