//! Boosted classifiers: the generic reweighting driver, and the three
//! concrete boosters built on top of it (feature-vector binary,
//! feature-vector multiclass, and Haar-feature).
pub mod driver;
pub mod haar;
pub mod vector_binary;
pub mod vector_multiclass;

pub use driver::{run_driver, update_distribution, weighted_training_error, DriverRun, Round};
pub use haar::{train_haar_booster, AsymmetricMode, HaarBooster, HaarSearch, StageOutcome};
pub use vector_binary::{VectorBinaryBooster, VectorSearch};
pub use vector_multiclass::VectorMulticlassBooster;
