//! The decision-stump data model: the four weak-learner variants as a
//! `Stump<O>` enum over continuous/discrete splits, generic over an
//! output kind `O` that is either `Plain` (`{-1,+1}`) or `Confidence`
//! (real-valued).
//!
//! One split-rule enum parameterized over its output kind, rather than
//! four near-duplicate structs for {continuous, discrete} x {plain,
//! confidence-rated}.
use serde::{Deserialize, Serialize};

/// A stump output kind: something that can be read back as the `f64`
/// margin contribution `y * h(x)` expects.
pub trait StumpOutput: Copy + PartialEq + std::fmt::Debug + Serialize + for<'de> Deserialize<'de> {
    fn as_margin(self) -> f64;
    fn from_margin(v: f64) -> Self;
    /// Whether this output kind is confidence-rated (real-valued) rather
    /// than plain (`{-1, +1}`).
    const IS_CONFIDENCE: bool;
}

/// A plain `{-1, +1}` stump output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plain(pub i8);

impl StumpOutput for Plain {
    fn as_margin(self) -> f64 {
        self.0 as f64
    }

    fn from_margin(v: f64) -> Self {
        Plain(if v >= 0.0 { 1 } else { -1 })
    }

    const IS_CONFIDENCE: bool = false;
}

/// A real-valued, confidence-rated stump output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence(pub f64);

impl StumpOutput for Confidence {
    fn as_margin(self) -> f64 {
        self.0
    }

    fn from_margin(v: f64) -> Self {
        Confidence(v)
    }

    const IS_CONFIDENCE: bool = true;
}

/// A continuous stump: `below` if `x < threshold` else `above`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousStump<O> {
    pub threshold: f64,
    pub below: O,
    pub above: O,
}

impl<O: StumpOutput> ContinuousStump<O> {
    pub fn eval(&self, x: f64) -> f64 {
        if x < self.threshold { self.below.as_margin() } else { self.above.as_margin() }
    }
}

/// A discrete stump: a sorted, duplicate-free list of observed values with
/// one output each, plus a default output for unseen values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteStump<O> {
    pub values: Vec<f64>,
    pub outputs: Vec<O>,
    pub default: O,
}

impl<O: StumpOutput> DiscreteStump<O> {
    pub fn eval(&self, x: f64) -> f64 {
        match self.values.iter().position(|&v| v == x) {
            Some(idx) => self.outputs[idx].as_margin(),
            None => self.default.as_margin(),
        }
    }
}

/// One of the two stump shapes, generic over its output kind `O`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stump<O> {
    Continuous(ContinuousStump<O>),
    Discrete(DiscreteStump<O>),
}

impl<O: StumpOutput> Stump<O> {
    /// Classify a single scalar feature value.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Stump::Continuous(s) => s.eval(x),
            Stump::Discrete(s) => s.eval(x),
        }
    }
}
