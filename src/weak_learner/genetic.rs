//! Genetic-algorithm search over Haar descriptors: evolve a population of
//! descriptors across generations, fitness-scoring each by the Z value of
//! its optimal continuous split, and keep the best-ever descriptor seen.
use rand::Rng;

use crate::config::Config;
use crate::numeric::haar::{HaarFeature, HaarKind};
use crate::sample::{Distribution, ImageDataset};
use crate::weak_learner::continuous::best_split_sorted;
use crate::weak_learner::haar::{haar_values, HaarStump};
use crate::weak_learner::stump::{ContinuousStump, StumpOutput};

const KINDS: [HaarKind; 4] =
    [HaarKind::TwoHorizontal, HaarKind::TwoVertical, HaarKind::ThreeHorizontal, HaarKind::FourQuad];

/// A handful of hand-picked starting descriptors (center strips, corner
/// quads) used to seed the population, rather than sampling uniformly at
/// random.
fn seed_descriptors(window: usize) -> Vec<HaarFeature> {
    let half = (window / 2).max(1);
    let third = (window / 3).max(1);
    let mut seeds = vec![
        HaarFeature::new(HaarKind::TwoHorizontal, 0, 0, half, window),
        HaarFeature::new(HaarKind::TwoVertical, 0, 0, window, half),
        HaarFeature::new(HaarKind::ThreeHorizontal, 0, 0, third, window),
        HaarFeature::new(HaarKind::FourQuad, 0, 0, half, half),
    ];
    seeds.retain(|d| d.is_valid(window, window, 1.0));
    if seeds.is_empty() {
        seeds.push(HaarFeature::new(HaarKind::TwoHorizontal, 0, 0, 1, 1));
    }
    seeds
}

fn random_descriptor(window: usize, rng: &mut impl Rng) -> HaarFeature {
    loop {
        let kind = KINDS[rng.gen_range(0..KINDS.len())];
        let width = rng.gen_range(1..=window);
        let height = rng.gen_range(1..=window);
        let start_x = rng.gen_range(0..window);
        let start_y = rng.gen_range(0..window);
        let f = HaarFeature::new(kind, start_x, start_y, width, height);
        if f.is_valid(window, window, 1.0) {
            return f;
        }
    }
}

fn clamp_to_valid(mut f: HaarFeature, window: usize, rng: &mut impl Rng) -> HaarFeature {
    // Shrink/reposition until valid, falling back to a random descriptor
    // if repeated attempts fail (keeps mutation/crossover total).
    for _ in 0..16 {
        if f.is_valid(window, window, 1.0) {
            return f;
        }
        f.width = f.width.saturating_sub(1).max(1);
        f.height = f.height.saturating_sub(1).max(1);
        f.start_x = f.start_x.min(window.saturating_sub(1));
        f.start_y = f.start_y.min(window.saturating_sub(1));
    }
    random_descriptor(window, rng)
}

fn crossover(a: HaarFeature, b: HaarFeature, window: usize, rng: &mut impl Rng) -> HaarFeature {
    let kind = if rng.gen_bool(0.5) { a.kind } else { b.kind };
    let t = rng.gen_range(0.0..=1.0);
    let blend = |x: usize, y: usize| -> usize {
        ((x as f64) * t + (y as f64) * (1.0 - t)).round() as usize
    };
    let child = HaarFeature::new(
        kind,
        blend(a.start_x, b.start_x),
        blend(a.start_y, b.start_y),
        blend(a.width, b.width).max(1),
        blend(a.height, b.height).max(1),
    );
    clamp_to_valid(child, window, rng)
}

fn mutate(f: HaarFeature, window: usize, rng: &mut impl Rng) -> HaarFeature {
    let step = (window / 8).max(1) as isize;
    let reflect = |v: isize, bound: isize| -> usize {
        let mut v = v;
        if v < 0 {
            v = -v;
        }
        if v > bound {
            v = 2 * bound - v;
        }
        v.clamp(0, bound) as usize
    };

    let jitter = |v: usize, bound: usize| -> usize {
        let delta = rng.gen_range(-step..=step);
        reflect(v as isize + delta, bound as isize)
    };

    let mutated = HaarFeature::new(
        f.kind,
        jitter(f.start_x, window.saturating_sub(1)),
        jitter(f.start_y, window.saturating_sub(1)),
        jitter(f.width, window).max(1),
        jitter(f.height, window).max(1),
    );
    clamp_to_valid(mutated, window, rng)
}

fn fitness(dataset: &ImageDataset, labels: &[f64], dist: &Distribution, descriptor: &HaarFeature, vec_seg_interval: f64) -> f64 {
    let values = haar_values(dataset, descriptor);
    best_split_sorted(&values, labels, dist.as_slice(), vec_seg_interval, false).z
}

/// Genetic-algorithm search over Haar descriptors: evolve `config.pop_size`
/// individuals over `config.gen` generations with per-field blend
/// crossover and reflected additive mutation, binary tournament between
/// each parent and its child, and track the best descriptor ever seen.
pub fn train_haar_genetic<O: StumpOutput>(
    dataset: &ImageDataset,
    dist: &Distribution,
    config: &Config,
    rng: &mut impl Rng,
) -> HaarStump<O> {
    let window = dataset.window();
    let labels: Vec<f64> = dataset.samples().iter().map(|s| s.label as f64).collect();

    let mut population: Vec<HaarFeature> = if config.ga_seed_population {
        let seeds = seed_descriptors(window);
        (0..config.pop_size)
            .map(|i| {
                let base = seeds[i % seeds.len()];
                if i < seeds.len() { base } else { mutate(base, window, rng) }
            })
            .collect()
    } else {
        (0..config.pop_size).map(|_| random_descriptor(window, rng)).collect()
    };

    let mut best_descriptor = population[0];
    let mut best_z = fitness(dataset, &labels, dist, &best_descriptor, config.vec_seg_interval);

    for p in &population {
        let z = fitness(dataset, &labels, dist, p, config.vec_seg_interval);
        if z < best_z {
            best_z = z;
            best_descriptor = *p;
        }
    }

    for _generation in 0..config.gen {
        for i in 0..population.len() {
            let parent = population[i];
            let parent_z = fitness(dataset, &labels, dist, &parent, config.vec_seg_interval);

            let mut child = if rng.gen_bool(config.p_c) {
                let mate = population[rng.gen_range(0..population.len())];
                crossover(parent, mate, window, rng)
            } else {
                parent
            };
            if rng.gen_bool(config.p_m) {
                child = mutate(child, window, rng);
            }

            let child_z = fitness(dataset, &labels, dist, &child, config.vec_seg_interval);

            // Binary tournament between parent and child.
            if child_z <= parent_z {
                population[i] = child;
            }

            let candidate_z = child_z.min(parent_z);
            let candidate = if child_z <= parent_z { child } else { parent };
            if candidate_z < best_z {
                best_z = candidate_z;
                best_descriptor = candidate;
            }
        }
    }

    let values = haar_values(dataset, &best_descriptor);
    let outcome = best_split_sorted(&values, &labels, dist.as_slice(), config.vec_seg_interval, O::IS_CONFIDENCE);

    HaarStump {
        haar: best_descriptor,
        stump: ContinuousStump {
            threshold: outcome.threshold,
            below: O::from_margin(outcome.below),
            above: O::from_margin(outcome.above),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::ImageSample;
    use crate::weak_learner::stump::Plain;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn checker_dataset() -> ImageDataset {
        let mut samples = Vec::new();
        for _ in 0..4 {
            let mut grid = vec![0.0; 36];
            for y in 0..6 {
                for x in 0..6 {
                    grid[y * 6 + x] = if x >= 3 { 100.0 } else { 0.0 };
                }
            }
            samples.push(ImageSample::from_grid(&grid, 6, 6, 1));
        }
        for _ in 0..4 {
            let mut grid = vec![0.0; 36];
            for y in 0..6 {
                for x in 0..6 {
                    grid[y * 6 + x] = if x < 3 { 100.0 } else { 0.0 };
                }
            }
            samples.push(ImageSample::from_grid(&grid, 6, 6, -1));
        }
        ImageDataset::new(samples, 6)
    }

    #[test]
    fn genetic_search_finds_a_reasonable_feature() {
        let dataset = checker_dataset();
        let dist = Distribution::uniform(dataset.n_samples());
        let config = Config::default().ga_population(15, 12);
        let mut rng = StdRng::seed_from_u64(42);

        let learner: HaarStump<Plain> = train_haar_genetic(&dataset, &dist, &config, &mut rng);

        let mut correct = 0;
        for s in dataset.samples() {
            let m = learner.margin(&s.integral, &s.sq_integral, 1.0).unwrap();
            if m.signum() as i8 == s.label {
                correct += 1;
            }
        }
        assert!(correct >= dataset.n_samples() - 1, "GA search found a poor feature ({correct}/{})", dataset.n_samples());
    }
}
