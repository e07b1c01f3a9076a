//! Error taxonomy for the boosting, cascade-training, and detection paths.
//!
//! A constructor that can fail simply returns `Result`, and partially
//! built values are dropped in the usual reverse field order. The
//! variants below are the failures that are actually reachable from safe
//! code.
use thiserror::Error;

/// Errors produced while training or deserializing a model.
#[derive(Debug, Error)]
pub enum Error {
    /// A weak learner's D-weighted training error reached or exceeded
    /// one half; the boosting round cannot be used. The caller's booster
    /// keeps only the learners accepted in previous rounds.
    #[error("weak learner training error {error:.6} >= 0.5, boosting cannot continue")]
    Convergence {
        /// The offending weighted error.
        error: f64,
    },

    /// Cascade training asked its negative-image callback for more hard
    /// negatives than the stream could supply before cycling back to the
    /// start without producing any new false positive.
    #[error("negative image stream exhausted before the bootstrap quota was met \
             ({collected} of {needed} collected)")]
    CallbackExhausted {
        /// Hard negatives collected before the stream cycled dry.
        collected: usize,
        /// Hard negatives requested.
        needed: usize,
    },

    /// The Newton-bisection bracket for the alpha coefficient does not
    /// bracket a root (all margins share one sign, so `f` is monotone and
    /// never crosses zero in `[lb, ub]`). Detected rather than bisected
    /// forever.
    #[error("Newton-bisection bracket [{lb}, {ub}] does not bracket a root \
             (all margins have the same sign)")]
    NewtonBracketDivergent {
        /// Lower bracket bound.
        lb: f64,
        /// Upper bracket bound.
        ub: f64,
    },

    /// A Haar descriptor's scaled rectangle extends outside the window.
    #[error("Haar descriptor invalid for a {height}x{width} window at scale {scale}")]
    InvalidHaarDescriptor {
        /// Window height in pixels.
        height: usize,
        /// Window width in pixels.
        width: usize,
        /// Scale factor applied to the descriptor.
        scale: f64,
    },

    /// A training call was given an empty sample set.
    #[error("training requires at least one sample")]
    EmptySampleSet,

    /// Binary (de)serialization failed.
    #[error("binary (de)serialization failed: {0}")]
    Bincode(#[from] bincode::Error),

    /// The wrapped collaborator (image loader, CSV reader, ...) failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
