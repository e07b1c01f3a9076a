//! The sample and distribution types shared by every weak learner and
//! booster: fixed-length numeric vectors, integral-image windows, and the
//! reweighted distribution `D` the boosting driver maintains over sample
//! indices.
use crate::numeric::integral::IntegralImage;

/// A single `(x, y)` pair with a dense feature vector `x` of length `n`
/// shared across a training run, and a label `L` (`i8` for binary tasks,
/// `usize` for multi-class tasks).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRow<L> {
    pub x: Vec<f64>,
    pub label: L,
}

/// A batch of [`VectorRow`]s sharing one feature count `n`.
#[derive(Debug, Clone)]
pub struct VectorDataset<L> {
    rows: Vec<VectorRow<L>>,
    n_features: usize,
}

impl<L> VectorDataset<L> {
    /// Build a dataset from `(x, label)` pairs. Panics if the rows don't
    /// all share the same feature count, or the set is empty.
    pub fn new(rows: Vec<VectorRow<L>>) -> Self {
        assert!(!rows.is_empty(), "a vector dataset needs at least one sample");
        let n_features = rows[0].x.len();
        assert!(
            rows.iter().all(|r| r.x.len() == n_features),
            "all rows must share the same feature count"
        );
        VectorDataset { rows, n_features }
    }

    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i].x
    }

    pub fn label(&self, i: usize) -> &L {
        &self.rows[i].label
    }

    pub fn rows(&self) -> &[VectorRow<L>] {
        &self.rows
    }

    /// Value of feature `feature_index` for sample `i`.
    pub fn feature_value(&self, feature_index: usize, i: usize) -> f64 {
        self.rows[i].x[feature_index]
    }

    /// All sample values of one feature column, in sample order.
    pub fn feature_column(&self, feature_index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r.x[feature_index]).collect()
    }
}

/// A binary-label vector dataset; labels are in `{-1, +1}`.
pub type BinaryVectorDataset = VectorDataset<i8>;

/// A multi-class vector dataset; labels are in `{0, ..., K-1}`.
pub type MulticlassVectorDataset = VectorDataset<usize>;

/// A single image sample: a pair of same-size integral images (the pixel
/// integral and its squared-value counterpart) plus a binary label.
#[derive(Debug, Clone)]
pub struct ImageSample {
    pub integral: IntegralImage,
    pub sq_integral: IntegralImage,
    pub label: i8,
}

impl ImageSample {
    /// Build an image sample from a raw grayscale `height x width` grid.
    pub fn from_grid(grid: &[f64], height: usize, width: usize, label: i8) -> Self {
        ImageSample {
            integral: IntegralImage::build(grid, height, width),
            sq_integral: IntegralImage::build_squared(grid, height, width),
            label,
        }
    }
}

/// A batch of [`ImageSample`]s sharing one square window size `S` (pixels
/// per side), the common training image size a cascade is built around.
#[derive(Debug, Clone)]
pub struct ImageDataset {
    samples: Vec<ImageSample>,
    window: usize,
}

impl ImageDataset {
    pub fn new(samples: Vec<ImageSample>, window: usize) -> Self {
        ImageDataset { samples, window }
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn sample(&self, i: usize) -> &ImageSample {
        &self.samples[i]
    }

    pub fn samples(&self) -> &[ImageSample] {
        &self.samples
    }

    pub fn push(&mut self, sample: ImageSample) {
        self.samples.push(sample);
    }

    /// Drop every sample at an index for which `keep` returns `false`,
    /// preserving relative order. Used by cascade bootstrap to retain
    /// positives and the still-hard negatives.
    pub fn retain(&mut self, mut keep: impl FnMut(&ImageSample) -> bool) {
        self.samples.retain(|s| keep(s));
    }
}

/// The sample distribution `D`: a finite, always-renormalized mapping from
/// sample index (or, for multi-class Hamming-loss training, `(sample,
/// class)` pair flattened row-major) to nonnegative weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution(Vec<f64>);

impl Distribution {
    /// The uniform distribution over `n` indices.
    pub fn uniform(n: usize) -> Self {
        assert!(n > 0, "distribution needs at least one index");
        Distribution(vec![1.0 / n as f64; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    /// Renormalize so weights sum to exactly 1.
    pub fn normalize(&mut self) {
        let total: f64 = self.0.iter().sum();
        assert!(total > 0.0, "distribution mass collapsed to zero");
        for w in self.0.iter_mut() {
            *w /= total;
        }
    }

    /// `sum_i D_i * v_i`.
    pub fn weighted_sum(&self, v: &[f64]) -> f64 {
        self.0.iter().zip(v).map(|(&d, &x)| d * x).sum()
    }
}

impl From<Vec<f64>> for Distribution {
    fn from(v: Vec<f64>) -> Self {
        Distribution(v)
    }
}
