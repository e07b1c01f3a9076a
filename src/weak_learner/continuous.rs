//! Optimal continuous-stump split search: given one feature's values, find
//! the threshold minimizing the Schapire-Singer `Z` bound, and the
//! per-side outputs that go with it.
//!
//! Two algorithms are provided. [`best_split_sorted`] is the O(m log m)
//! sweep used when the caller already has (or caches) a sort order over
//! the feature; [`best_split_branch_and_bound`] is the randomized
//! quickselect variant used when no such order is available, pruning
//! subtrees whose best-possible `Z` cannot beat the current best.
use rand::Rng;

/// The outcome of an optimal-split search over one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOutcome {
    /// The chosen threshold `theta`.
    pub threshold: f64,
    /// Output for `x < theta` (the "below"/`o_-` branch).
    pub below: f64,
    /// Output for `x >= theta` (the "above"/`o_+` branch).
    pub above: f64,
    /// The Z value of this split (smaller is better).
    pub z: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Bin {
    pos: f64,
    neg: f64,
}

impl Bin {
    fn add(self, other: Bin) -> Bin {
        Bin { pos: self.pos + other.pos, neg: self.neg + other.neg }
    }

    fn has_mass(self) -> bool {
        self.pos + self.neg > 0.0
    }
}

#[inline]
fn z_term(bin: Bin, eps: f64) -> f64 {
    ((bin.pos + eps) * (bin.neg + eps)).sqrt()
}

#[inline]
fn z_of(left: Bin, right: Bin, eps: f64) -> f64 {
    z_term(left, eps) + z_term(right, eps)
}

fn majority(bin: Bin, eps: f64, confidence: bool) -> f64 {
    let pos = bin.pos + eps;
    let neg = bin.neg + eps;
    if confidence {
        0.5 * (pos / neg).ln()
    } else if pos > neg {
        1.0
    } else {
        -1.0
    }
}

/// Per-side outputs, with the rule that a side holding no real (non-eps)
/// mass borrows its output from the other side instead of defaulting
/// arbitrarily — this is what makes a single-sample split report the same
/// majority output on both sides.
fn outputs_for(left: Bin, right: Bin, eps: f64, confidence: bool) -> (f64, f64) {
    let left_raw = majority(left, eps, confidence);
    let right_raw = majority(right, eps, confidence);

    let left_out = if !left.has_mass() && right.has_mass() { right_raw } else { left_raw };
    let right_out = if !right.has_mass() && left.has_mass() { left_raw } else { right_raw };
    (left_out, right_out)
}

fn label_weight(label: f64, weight: f64) -> Bin {
    if label > 0.0 {
        Bin { pos: weight, neg: 0.0 }
    } else {
        Bin { pos: 0.0, neg: weight }
    }
}

/// Sort-based optimal split search, O(m log m).
///
/// `values`/`labels`/`dist` must have equal length `m >= 1`. `labels` are
/// signed (`>0.0` treated as positive, else negative).
pub fn best_split_sorted(
    values: &[f64],
    labels: &[f64],
    dist: &[f64],
    vec_seg_interval: f64,
    confidence: bool,
) -> SplitOutcome {
    let m = values.len();
    assert!(m > 0, "continuous-stump search needs at least one sample");

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&i, &j| values[i].partial_cmp(&values[j]).unwrap());

    best_split_with_order(values, labels, dist, &order, vec_seg_interval, confidence)
}

/// Same algorithm as [`best_split_sorted`], but taking a caller-supplied
/// ascending-by-value sort order instead of computing one — the "cache"
/// "cache" path, used when the same feature is searched across many
/// rounds and its sort order is worth keeping around.
pub fn best_split_with_order(
    values: &[f64],
    labels: &[f64],
    dist: &[f64],
    order: &[usize],
    vec_seg_interval: f64,
    confidence: bool,
) -> SplitOutcome {
    let m = values.len();
    assert_eq!(order.len(), m);
    let eps = 1.0 / m as f64;

    // Group by distinct value.
    let mut groups: Vec<(f64, Bin)> = Vec::new();
    for &i in order {
        let w = label_weight(labels[i], dist[i]);
        match groups.last_mut() {
            Some((v, bin)) if *v == values[i] => *bin = bin.add(w),
            _ => groups.push((values[i], w)),
        }
    }

    let total: Bin = groups.iter().fold(Bin::default(), |acc, (_, b)| acc.add(*b));

    let mut left = Bin::default();
    let mut best: Option<SplitOutcome> = None;

    let n_groups = groups.len();
    for k in 0..=n_groups {
        let right = Bin { pos: total.pos - left.pos, neg: total.neg - left.neg };
        let z = z_of(left, right, eps);
        let threshold = if k == 0 {
            groups[0].0 - vec_seg_interval
        } else if k == n_groups {
            groups[n_groups - 1].0 + vec_seg_interval
        } else {
            0.5 * (groups[k - 1].0 + groups[k].0)
        };

        if best.map(|b| z < b.z).unwrap_or(true) {
            let (below, above) = outputs_for(left, right, eps, confidence);
            best = Some(SplitOutcome { threshold, below, above, z });
        }

        if k < n_groups {
            left = left.add(groups[k].1);
        }
    }

    best.expect("at least one candidate cut exists")
}

/// Randomized quickselect / branch-and-bound optimal split search.
///
/// Recurses only into subranges whose best-possible `Z` (assuming any
/// remaining, not-yet-assigned mass contributes nothing extra to either
/// side) can still beat the best `Z` found so far.
pub fn best_split_branch_and_bound(
    values: &[f64],
    labels: &[f64],
    dist: &[f64],
    vec_seg_interval: f64,
    confidence: bool,
    rng: &mut impl Rng,
) -> SplitOutcome {
    let m = values.len();
    assert!(m > 0, "continuous-stump search needs at least one sample");
    let eps = 1.0 / m as f64;

    let mut items: Vec<(f64, Bin)> =
        values.iter().zip(labels).zip(dist).map(|((&v, &y), &d)| (v, label_weight(y, d))).collect();

    let total: Bin = items.iter().fold(Bin::default(), |acc, (_, b)| acc.add(*b));
    let min_v = items.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
    let max_v = items.iter().map(|(v, _)| *v).fold(f64::NEG_INFINITY, f64::max);

    // Global edge candidates: everything on one side.
    let mut best = {
        let (below, above) = outputs_for(Bin::default(), total, eps, confidence);
        SplitOutcome { threshold: min_v - vec_seg_interval, below, above, z: z_of(Bin::default(), total, eps) }
    };
    {
        let (below, above) = outputs_for(total, Bin::default(), eps, confidence);
        let z = z_of(total, Bin::default(), eps);
        if z < best.z {
            best = SplitOutcome { threshold: max_v + vec_seg_interval, below, above, z };
        }
    }

    bnb_recurse(&mut items, Bin::default(), Bin::default(), eps, vec_seg_interval, confidence, rng, &mut best);

    best
}

fn bnb_recurse(
    items: &mut [(f64, Bin)],
    fixed_left: Bin,
    fixed_right: Bin,
    eps: f64,
    vec_seg_interval: f64,
    confidence: bool,
    rng: &mut impl Rng,
    best: &mut SplitOutcome,
) {
    if items.len() <= 1 {
        return;
    }

    let pivot = items[rng.gen_range(0..items.len())].0;
    let (mut less, mut rest): (Vec<_>, Vec<_>) = items.iter().copied().partition(|(v, _)| *v < pivot);

    if less.is_empty() || rest.is_empty() {
        // Pivot didn't split the range (all equal); nothing more to gain.
        return;
    }

    let less_bin: Bin = less.iter().fold(Bin::default(), |acc, (_, b)| acc.add(*b));
    let rest_bin: Bin = rest.iter().fold(Bin::default(), |acc, (_, b)| acc.add(*b));

    let left_total = fixed_left.add(less_bin);
    let right_total = fixed_right.add(rest_bin);

    let max_less = less.iter().map(|(v, _)| *v).fold(f64::NEG_INFINITY, f64::max);
    let min_rest = rest.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);

    let z = z_of(left_total, right_total, eps);
    if z < best.z {
        let (below, above) = outputs_for(left_total, right_total, eps, confidence);
        best.threshold = 0.5 * (max_less + min_rest);
        best.below = below;
        best.above = above;
        best.z = z;
    }

    // Recurse into `less`: any further split stays left of all of `rest`.
    let bound_left = z_of(fixed_left, right_total, eps);
    if bound_left < best.z {
        bnb_recurse(&mut less, fixed_left, right_total, eps, vec_seg_interval, confidence, rng, best);
    }

    // Recurse into `rest`: any further split stays right of all of `less`.
    let bound_right = z_of(left_total, fixed_right, eps);
    if bound_right < best.z {
        bnb_recurse(&mut rest, left_total, fixed_right, eps, vec_seg_interval, confidence, rng, best);
    }
}
