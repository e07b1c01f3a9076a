//! Numeric kernels: integral-image arithmetic, Haar evaluation, and the
//! alpha-coefficient solvers shared by every booster.
pub mod alpha;
pub mod haar;
pub mod integral;

pub use alpha::{AlphaSolver, Approx, NewtonBisection, Unit};
pub use haar::{HaarFeature, HaarKind};
pub use integral::IntegralImage;
