//! Vector (feature-index) weak learners: a stump plus the feature index it
//! was trained on.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sample::{Distribution, VectorDataset};
use crate::weak_learner::continuous::{best_split_branch_and_bound, best_split_with_order};
use crate::weak_learner::discrete::train_discrete;
use crate::weak_learner::stump::{ContinuousStump, DiscreteStump, Stump, StumpOutput};

/// A weak learner over a vector sample: one feature index plus a stump on
/// that feature's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStump<O> {
    pub feature_index: usize,
    pub stump: Stump<O>,
}

impl<O: StumpOutput> VectorStump<O> {
    pub fn margin(&self, x: &[f64]) -> f64 {
        self.stump.eval(x[self.feature_index])
    }
}

fn labels_as_f64(dataset: &VectorDataset<i8>) -> Vec<f64> {
    (0..dataset.n_samples()).map(|i| *dataset.label(i) as f64).collect()
}

/// Exhaustive, per-feature continuous-stump search using a precomputed
/// ascending sort order per feature (the "cache" path, O(m log m) overall
/// once the cache is built).
pub fn train_vector_continuous_cached<O: StumpOutput>(
    dataset: &VectorDataset<i8>,
    dist: &Distribution,
    sort_cache: &[Vec<usize>],
    vec_seg_interval: f64,
) -> VectorStump<O> {
    let labels = labels_as_f64(dataset);
    let mut best_feature = 0;
    let mut best = None;

    for feature_index in 0..dataset.n_features() {
        let values = dataset.feature_column(feature_index);
        let outcome = best_split_with_order(
            &values,
            &labels,
            dist.as_slice(),
            &sort_cache[feature_index],
            vec_seg_interval,
            O::IS_CONFIDENCE,
        );
        if best.map(|b: crate::weak_learner::continuous::SplitOutcome| outcome.z < b.z).unwrap_or(true) {
            best = Some(outcome);
            best_feature = feature_index;
        }
    }

    let outcome = best.expect("dataset has at least one feature");
    VectorStump {
        feature_index: best_feature,
        stump: Stump::Continuous(ContinuousStump {
            threshold: outcome.threshold,
            below: O::from_margin(outcome.below),
            above: O::from_margin(outcome.above),
        }),
    }
}

/// Exhaustive, per-feature continuous-stump search using the randomized
/// branch-and-bound split search (no sort cache required).
pub fn train_vector_continuous_bnb<O: StumpOutput>(
    dataset: &VectorDataset<i8>,
    dist: &Distribution,
    vec_seg_interval: f64,
    rng: &mut impl Rng,
) -> VectorStump<O> {
    let labels = labels_as_f64(dataset);
    let mut best_feature = 0;
    let mut best = None;

    for feature_index in 0..dataset.n_features() {
        let values = dataset.feature_column(feature_index);
        let outcome = best_split_branch_and_bound(
            &values,
            &labels,
            dist.as_slice(),
            vec_seg_interval,
            O::IS_CONFIDENCE,
            rng,
        );
        if best.map(|b: crate::weak_learner::continuous::SplitOutcome| outcome.z < b.z).unwrap_or(true) {
            best = Some(outcome);
            best_feature = feature_index;
        }
    }

    let outcome = best.expect("dataset has at least one feature");
    VectorStump {
        feature_index: best_feature,
        stump: Stump::Continuous(ContinuousStump {
            threshold: outcome.threshold,
            below: O::from_margin(outcome.below),
            above: O::from_margin(outcome.above),
        }),
    }
}

/// Exhaustive, per-feature discrete-stump search.
pub fn train_vector_discrete<O: StumpOutput>(dataset: &VectorDataset<i8>, dist: &Distribution) -> VectorStump<O> {
    let labels = labels_as_f64(dataset);
    let mut best_feature = 0;
    let mut best: Option<crate::weak_learner::discrete::DiscreteOutcome> = None;

    for feature_index in 0..dataset.n_features() {
        let values = dataset.feature_column(feature_index);
        let outcome = train_discrete(&values, &labels, dist.as_slice(), O::IS_CONFIDENCE);
        if best.as_ref().map(|b| outcome.z < b.z).unwrap_or(true) {
            best_feature = feature_index;
            best = Some(outcome);
        }
    }

    let outcome = best.expect("dataset has at least one feature");
    VectorStump {
        feature_index: best_feature,
        stump: Stump::Discrete(DiscreteStump {
            values: outcome.values,
            outputs: outcome.outputs.into_iter().map(O::from_margin).collect(),
            default: O::from_margin(outcome.default),
        }),
    }
}

/// Precompute, per feature, the ascending-by-value sample-index sort order
/// used to cache repeated continuous-stump searches on the same feature.
pub fn build_sort_cache(dataset: &VectorDataset<i8>) -> Vec<Vec<usize>> {
    (0..dataset.n_features())
        .map(|feature_index| {
            let values = dataset.feature_column(feature_index);
            let mut order: Vec<usize> = (0..dataset.n_samples()).collect();
            order.sort_by(|&i, &j| values[i].partial_cmp(&values[j]).unwrap());
            order
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::VectorRow;
    use crate::weak_learner::stump::Plain;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn toy_dataset() -> VectorDataset<i8> {
        VectorDataset::new(vec![
            VectorRow { x: vec![-1.0, 5.0], label: -1 },
            VectorRow { x: vec![1.0, 5.0], label: 1 },
            VectorRow { x: vec![-2.0, -5.0], label: -1 },
            VectorRow { x: vec![2.0, -5.0], label: 1 },
        ])
    }

    #[test]
    fn cached_and_bnb_search_agree() {
        let dataset = toy_dataset();
        let dist = Distribution::uniform(dataset.n_samples());
        let cache = build_sort_cache(&dataset);

        let cached: VectorStump<Plain> = train_vector_continuous_cached(&dataset, &dist, &cache, 1e-3);
        let mut rng = StdRng::seed_from_u64(1);
        let bnb: VectorStump<Plain> = train_vector_continuous_bnb(&dataset, &dist, 1e-3, &mut rng);

        assert_eq!(cached.feature_index, 0);
        assert_eq!(bnb.feature_index, 0);
    }

    #[test]
    fn selected_feature_perfectly_separates_toy_dataset() {
        let dataset = toy_dataset();
        let dist = Distribution::uniform(dataset.n_samples());
        let cache = build_sort_cache(&dataset);
        let learner: VectorStump<Plain> = train_vector_continuous_cached(&dataset, &dist, &cache, 1e-3);

        for i in 0..dataset.n_samples() {
            let pred = learner.margin(dataset.row(i)).signum();
            assert_eq!(pred as i8, *dataset.label(i));
        }
    }
}
