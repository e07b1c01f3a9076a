//! Discrete-stump training: bucket samples by distinct observed feature
//! value, score each bucket's majority/log-odds output, and derive a
//! default output for values never seen in training.

/// The outcome of discrete-stump training: a sorted, duplicate-free value
/// list with one output per value, a default output for unseen values, and
/// the feature's total Z.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteOutcome {
    pub values: Vec<f64>,
    pub outputs: Vec<f64>,
    pub default: f64,
    pub z: f64,
}

fn majority(pos: f64, neg: f64, confidence: bool) -> f64 {
    if confidence {
        0.5 * (pos / neg).ln()
    } else if pos > neg {
        1.0
    } else {
        -1.0
    }
}

/// Train a discrete stump over one feature's `(value, label, weight)`
/// triples. `labels` are signed (`>0.0` positive, else negative).
pub fn train_discrete(values: &[f64], labels: &[f64], dist: &[f64], confidence: bool) -> DiscreteOutcome {
    let m = values.len();
    assert!(m > 0, "discrete-stump training needs at least one sample");
    let eps = 1.0 / m as f64;

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&i, &j| values[i].partial_cmp(&values[j]).unwrap());

    let mut buckets: Vec<(f64, f64, f64)> = Vec::new(); // (value, pos, neg)
    for &i in &order {
        let (pos_w, neg_w) = if labels[i] > 0.0 { (dist[i], 0.0) } else { (0.0, dist[i]) };
        match buckets.last_mut() {
            Some((v, pos, neg)) if *v == values[i] => {
                *pos += pos_w;
                *neg += neg_w;
            }
            _ => buckets.push((values[i], pos_w, neg_w)),
        }
    }

    let (global_pos, global_neg) = buckets.iter().fold((0.0, 0.0), |(p, n), (_, bp, bn)| (p + bp, n + bn));

    let mut z = 0.0;
    let mut out_values = Vec::with_capacity(buckets.len());
    let mut outputs = Vec::with_capacity(buckets.len());
    for (v, pos, neg) in buckets {
        z += ((pos + eps) * (neg + eps)).sqrt();
        out_values.push(v);
        outputs.push(majority(pos + eps, neg + eps, confidence));
    }

    let default = majority(global_pos + eps, global_neg + eps, confidence);

    DiscreteOutcome { values: out_values, outputs, default, z }
}

/// Looks up the output for `x`, falling back to `default` when `x` was
/// never observed in training.
pub fn discrete_eval(values: &[f64], outputs: &[f64], default: f64, x: f64) -> f64 {
    match values.iter().position(|&v| v == x) {
        Some(idx) => outputs[idx],
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_values_are_sorted_and_deduplicated() {
        let values = [3.0, 1.0, 3.0, 2.0, 1.0];
        let labels = [1.0, -1.0, 1.0, 1.0, -1.0];
        let dist = [0.2; 5];
        let out = train_discrete(&values, &labels, &dist, false);
        assert_eq!(out.values, vec![1.0, 2.0, 3.0]);
        assert!(out.values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unseen_value_uses_default_output() {
        let values = [1.0, 1.0, 2.0, 2.0];
        let labels = [1.0, 1.0, -1.0, -1.0];
        let dist = [0.25; 4];
        let out = train_discrete(&values, &labels, &dist, false);
        let v = discrete_eval(&out.values, &out.outputs, out.default, 99.0);
        assert_eq!(v, out.default);
    }
}
