//! Cascade training: a sequence of Haar-boosted stages, each trained to a
//! per-stage detection/false-positive target, with hard-negative bootstrap
//! between stages. See [`train_cascade`] for the state machine this module
//! drives through.
pub mod bootstrap;
pub mod geometry;
pub mod sampling;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::booster::{train_haar_booster, AsymmetricMode, HaarBooster, HaarSearch};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::numeric::AlphaSolver;
use crate::sample::ImageSample;
use crate::weak_learner::StumpOutput;

use bootstrap::bootstrap_negatives;
use sampling::{build_initial_dataset, BackgroundSource, FaceSource};

/// The cascade trainer's state machine: `Init -> Sampling -> StageTraining
/// <-> Bootstrap -> Done | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    Init,
    Sampling,
    StageTraining,
    Bootstrap,
    Done,
    Failed,
}

/// Progress snapshot emitted once per completed stage, for callers who want
/// to watch training without parsing log lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageReport {
    pub stage_index: usize,
    pub rounds_used: usize,
    pub cumulative_detection_rate: f64,
    pub cumulative_false_positive_rate: f64,
}

/// Targets and budget for one cascade training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    /// Training window side length `S`, in pixels.
    pub window: usize,
    /// Per-stage minimum detection rate `d`.
    pub stage_detection_target: f64,
    /// Per-stage maximum false-positive rate `f`.
    pub stage_fp_target: f64,
    /// Overall cumulative false-positive rate `F` at which training stops.
    pub overall_fp_target: f64,
    /// Total positive sample count, split across train/validation.
    pub n_positive: usize,
    /// Total negative sample count, split across train/validation.
    pub n_negative: usize,
    /// Per-stage round budget handed to [`train_haar_booster`].
    pub max_rounds_per_stage: usize,
    pub search: HaarSearch,
    pub asymmetric: AsymmetricMode,
}

/// A trained cascade classifier: an ordered sequence of Haar-boosted
/// stages, rejecting a window as soon as any stage's score is non-positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cascade<O> {
    pub window: usize,
    pub false_positive_rate: f64,
    pub detection_rate: f64,
    pub stages: Vec<HaarBooster<O>>,
}

impl<O: StumpOutput> Cascade<O> {
    pub fn window(&self) -> usize {
        self.window
    }

    /// Run every stage in order; `None` on the first non-positive score,
    /// otherwise the last stage's post-threshold score.
    pub fn evaluate(&self, sample: &ImageSample) -> Result<Option<f64>> {
        let mut last = 0.0;
        for stage in &self.stages {
            let score = stage.score(sample, 1.0)?;
            if score <= 0.0 {
                return Ok(None);
            }
            last = score;
        }
        Ok(Some(last))
    }
}

/// Train a cascade: build the initial positive/negative pool, then append
/// Haar-boosted stages (bootstrapping hard negatives between each) until
/// the cumulative false-positive rate drops to `params.overall_fp_target`
/// or a stage can't reach its own target within budget, whichever comes
/// first.
#[allow(clippy::too_many_arguments)]
pub fn train_cascade<O: StumpOutput>(
    faces: &mut impl FaceSource,
    backgrounds: &mut impl BackgroundSource,
    train_fraction: f64,
    solver: &dyn AlphaSolver,
    using_fold: bool,
    params: &CascadeParams,
    config: &Config,
    rng: &mut impl Rng,
) -> Result<Cascade<O>> {
    info!(state = ?CascadeState::Init, "cascade training starting");

    let n_positive_train = (params.n_positive as f64 * train_fraction).round() as usize;
    let n_negative_train = (params.n_negative as f64 * train_fraction).round() as usize;
    let n_positive_val = params.n_positive.saturating_sub(n_positive_train);
    let n_negative_val = params.n_negative.saturating_sub(n_negative_train);

    info!(state = ?CascadeState::Sampling, "building initial sample set");
    let mut train_set =
        build_initial_dataset(params.window, n_positive_train, n_negative_train, faces, backgrounds, rng)?;
    let validation_set =
        build_initial_dataset(params.window, n_positive_val, n_negative_val, faces, backgrounds, rng)?;

    let mut cascade: Cascade<O> =
        Cascade { window: params.window, false_positive_rate: 1.0, detection_rate: 1.0, stages: Vec::new() };

    loop {
        info!(state = ?CascadeState::StageTraining, stage = cascade.stages.len(), "training stage");
        let (stage, outcome) = train_haar_booster::<O>(
            &train_set,
            &validation_set,
            params.search,
            solver,
            using_fold,
            params.stage_detection_target,
            params.stage_fp_target,
            params.max_rounds_per_stage,
            params.asymmetric,
            config,
            rng,
        )?;

        cascade.false_positive_rate *= outcome.false_positive_rate;
        cascade.detection_rate *= outcome.detection_rate;
        cascade.stages.push(stage);

        let report = StageReport {
            stage_index: cascade.stages.len() - 1,
            rounds_used: outcome.rounds_used,
            cumulative_detection_rate: cascade.detection_rate,
            cumulative_false_positive_rate: cascade.false_positive_rate,
        };
        info!(?report, "stage complete");

        if cascade.false_positive_rate <= params.overall_fp_target {
            info!(state = ?CascadeState::Done, "overall false-positive target reached");
            return Ok(cascade);
        }
        if !outcome.reached_target {
            info!(state = ?CascadeState::Done, "stage exhausted its round budget before meeting its target, accepting best effort");
            return Ok(cascade);
        }

        info!(state = ?CascadeState::Bootstrap, "bootstrapping hard negatives");
        let target_negatives =
            train_set.samples().iter().filter(|s| s.label <= 0).count().max(n_negative_train);
        match bootstrap_negatives(&mut train_set, target_negatives, &cascade, backgrounds) {
            Ok(()) => {}
            Err(Error::CallbackExhausted { .. }) => {
                info!(state = ?CascadeState::Done, "background stream exhausted during bootstrap, accepting cascade so far");
                return Ok(cascade);
            }
            Err(e) => {
                info!(state = ?CascadeState::Failed, error = %e, "bootstrap failed");
                return Err(e);
            }
        }
    }
}
