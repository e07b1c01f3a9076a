//! Tunable constants shared by the genetic Haar search, the continuous-stump
//! boundary rule, and cascade/asymmetric-boosting training.
//!
//! A plain `Default` plus chainable builder setters for each group of
//! related knobs, rather than a config file loader.

/// Tunable constants for weak-learner search, continuous-stump boundary
/// placement, and asymmetric cascade-stage boosting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Crossover probability for the Haar-feature genetic search.
    pub p_c: f64,
    /// Mutation probability for the Haar-feature genetic search.
    pub p_m: f64,
    /// Number of generations the genetic search runs.
    pub gen: usize,
    /// Population size for the genetic search.
    pub pop_size: usize,
    /// Offset applied when a continuous-stump threshold sits outside the
    /// observed value range.
    pub vec_seg_interval: f64,
    /// Minimum gap enforced around a cascade stage's decision threshold.
    pub min_interval: f64,
    /// Asymmetry constant `k` for asymmetric cascade-stage boosting.
    pub asym_const: f64,
    /// Number of rounds the improved asymmetric variant spreads its
    /// reweighting over before leaving the distribution alone.
    pub asym_turn: usize,
    /// Seed the genetic Haar search's initial population from a handful of
    /// hand-picked descriptors (center strips, corner quads) instead of
    /// sampling uniformly at random.
    pub ga_seed_population: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            p_c: 0.9,
            p_m: 0.1,
            gen: 50,
            pop_size: 10,
            vec_seg_interval: 1e-3,
            min_interval: 1e-3,
            asym_const: 2.0,
            asym_turn: 50,
            ga_seed_population: true,
        }
    }
}

impl Config {
    /// Crossover/mutation probabilities for the genetic Haar search.
    pub fn ga_probabilities(mut self, p_c: f64, p_m: f64) -> Self {
        self.p_c = p_c;
        self.p_m = p_m;
        self
    }

    /// Generations and population size for the genetic Haar search.
    pub fn ga_population(mut self, gen: usize, pop_size: usize) -> Self {
        self.gen = gen;
        self.pop_size = pop_size;
        self
    }

    /// Continuous-stump out-of-range boundary offset.
    pub fn vec_seg_interval(mut self, value: f64) -> Self {
        self.vec_seg_interval = value;
        self
    }

    /// Minimum gap enforced around a cascade stage's threshold.
    pub fn min_interval(mut self, value: f64) -> Self {
        self.min_interval = value;
        self
    }

    /// Asymmetry constant and delay period for asymmetric boosting.
    pub fn asymmetry(mut self, asym_const: f64, asym_turn: usize) -> Self {
        self.asym_const = asym_const;
        self.asym_turn = asym_turn;
        self
    }

    /// Whether the genetic Haar search seeds its initial population from
    /// hand-picked descriptors rather than uniform-random ones.
    pub fn ga_seed_population(mut self, seed: bool) -> Self {
        self.ga_seed_population = seed;
        self
    }
}
