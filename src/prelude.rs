//! Re-exports the surface most callers need: the config and error types,
//! the sample/distribution types, the weak-learner output kinds, the three
//! boosters, and the cascade/detector types.
pub use crate::config::Config;
pub use crate::error::{Error, Result};

pub use crate::sample::{
    BinaryVectorDataset, Distribution, ImageDataset, ImageSample, MulticlassVectorDataset, VectorDataset, VectorRow,
};

pub use crate::numeric::{AlphaSolver, Approx, HaarFeature, HaarKind, IntegralImage, NewtonBisection, Unit};

pub use crate::weak_learner::{Confidence, ContinuousStump, DiscreteStump, HaarStump, Plain, Stump, StumpOutput, VectorStump};

pub use crate::booster::{
    AsymmetricMode, HaarBooster, HaarSearch, Round, StageOutcome, VectorBinaryBooster, VectorMulticlassBooster, VectorSearch,
};

pub use crate::cascade::{
    bootstrap::bootstrap_negatives,
    geometry::{iou, GrayImage, Rect},
    sampling::{BackgroundSource, FaceSource},
    train_cascade, Cascade, CascadeParams, CascadeState, StageReport,
};

pub use crate::detector::{non_max_suppression, scan, Detection};

pub use crate::io::{cascade_from_bincode, cascade_from_bytes, cascade_to_bincode, cascade_to_bytes, WireOutput};
