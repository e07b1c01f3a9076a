//! Weak-learner training: decision stumps over either a feature vector or
//! a Haar descriptor, and the search strategies that fit them to a
//! weighted sample.
pub mod continuous;
pub mod discrete;
pub mod genetic;
pub mod haar;
pub mod stump;
pub mod vector;

pub use continuous::{best_split_branch_and_bound, best_split_sorted, best_split_with_order, SplitOutcome};
pub use discrete::{discrete_eval, train_discrete, DiscreteOutcome};
pub use genetic::train_haar_genetic;
pub use haar::{enumerate_descriptors, haar_values, train_haar_exhaustive, HaarStump};
pub use stump::{Confidence, ContinuousStump, DiscreteStump, Plain, Stump, StumpOutput};
pub use vector::{build_sort_cache, train_vector_continuous_bnb, train_vector_continuous_cached, train_vector_discrete, VectorStump};
