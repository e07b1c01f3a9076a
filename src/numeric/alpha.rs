//! α-coefficient solvers: given per-sample signed margins `v_i = y_i *
//! h(x_i)` and the current distribution `D`, return the scalar weight a
//! boosting round assigns its new weak learner.
use crate::error::{Error, Result};

/// Common contract implemented by the three interchangeable α strategies.
pub trait AlphaSolver {
    /// Compute α from per-sample margins `v` and distribution `d`.
    ///
    /// Both slices must have the same length (one entry per sample).
    fn alpha(&self, margins: &[f64], dist: &[f64]) -> Result<f64>;
}

/// Closed-form α from the weighted edge `r = sum_i d_i v_i`:
/// `alpha = 1/2 * ln((1+r)/(1-r))`. Valid when `|r| < 1`; the driver's
/// error-rate guard is what catches `r` drifting out of range in practice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Approx;

impl AlphaSolver for Approx {
    fn alpha(&self, margins: &[f64], dist: &[f64]) -> Result<f64> {
        let r = weighted_edge(margins, dist);
        Ok(0.5 * ((1.0 + r) / (1.0 - r)).ln())
    }
}

/// α is always 1; used when the coefficient is folded into a
/// confidence-rated learner's own output scale instead of stored
/// separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unit;

impl AlphaSolver for Unit {
    fn alpha(&self, _margins: &[f64], _dist: &[f64]) -> Result<f64> {
        Ok(1.0)
    }
}

/// Solves `f(alpha) = -sum_i d_i v_i exp(-alpha v_i) = 0` by bisection,
/// bracketing the root from the signed extremes of `v`.
#[derive(Debug, Clone, Copy)]
pub struct NewtonBisection {
    /// `|f(mid)|` convergence tolerance.
    pub tolerance: f64,
    /// Maximum bisection iterations before giving up.
    pub max_iter: usize,
}

impl Default for NewtonBisection {
    fn default() -> Self {
        NewtonBisection { tolerance: 1e-6, max_iter: 200 }
    }
}

impl NewtonBisection {
    fn f(alpha: f64, margins: &[f64], dist: &[f64]) -> f64 {
        -margins
            .iter()
            .zip(dist)
            .map(|(&v, &d)| d * v * (-alpha * v).exp())
            .sum::<f64>()
    }
}

impl AlphaSolver for NewtonBisection {
    fn alpha(&self, margins: &[f64], dist: &[f64]) -> Result<f64> {
        let r_pos: f64 = margins
            .iter()
            .zip(dist)
            .filter(|(&v, _)| v > 0.0)
            .map(|(&v, &d)| d * v)
            .sum();
        let r_neg: f64 = margins
            .iter()
            .zip(dist)
            .filter(|(&v, _)| v < 0.0)
            .map(|(&v, &d)| d * v.abs())
            .sum();

        if r_pos == 0.0 || r_neg == 0.0 {
            // All margins share one sign: f is monotone on any bracket and
            // never crosses zero.
            return Err(Error::NewtonBracketDivergent { lb: 0.0, ub: 0.0 });
        }

        let v_extreme = margins.iter().cloned().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1e-12);
        let bracket = (r_pos / r_neg).ln().abs() / v_extreme + 1.0;
        let (mut lb, mut ub) = (-bracket, bracket);

        let mut f_lb = Self::f(lb, margins, dist);
        let f_ub = Self::f(ub, margins, dist);
        if f_lb.signum() == f_ub.signum() {
            return Err(Error::NewtonBracketDivergent { lb, ub });
        }

        for _ in 0..self.max_iter {
            let mid = 0.5 * (lb + ub);
            let f_mid = Self::f(mid, margins, dist);
            if f_mid.abs() <= self.tolerance {
                return Ok(mid);
            }
            if f_mid.signum() == f_lb.signum() {
                lb = mid;
                f_lb = f_mid;
            } else {
                ub = mid;
            }
        }

        Ok(0.5 * (lb + ub))
    }
}

fn weighted_edge(margins: &[f64], dist: &[f64]) -> f64 {
    margins.iter().zip(dist).map(|(&v, &d)| v * d).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_matches_closed_form() {
        let margins = vec![1.0, 1.0, -1.0];
        let dist = vec![0.5, 0.3, 0.2];
        let alpha = Approx.alpha(&margins, &dist).unwrap();
        let r = 0.5 * 1.0 + 0.3 * 1.0 + 0.2 * -1.0;
        let expect = 0.5 * ((1.0 + r) / (1.0 - r)).ln();
        assert!((alpha - expect).abs() < 1e-12);
    }

    #[test]
    fn unit_is_always_one() {
        assert_eq!(Unit.alpha(&[1.0, -1.0], &[0.5, 0.5]).unwrap(), 1.0);
    }

    #[test]
    fn newton_bisection_root_satisfies_f_near_zero() {
        let margins = vec![1.0, 1.0, -1.0, -1.0];
        let dist = vec![0.4, 0.1, 0.3, 0.2];
        let solver = NewtonBisection::default();
        let alpha = solver.alpha(&margins, &dist).unwrap();
        let f_val = NewtonBisection::f(alpha, &margins, &dist);
        assert!(f_val.abs() <= solver.tolerance * 10.0, "f(alpha)={f_val}");
    }

    #[test]
    fn newton_bisection_reports_degenerate_single_sign() {
        let margins = vec![1.0, 1.0, 1.0];
        let dist = vec![0.3, 0.3, 0.4];
        let solver = NewtonBisection::default();
        assert!(solver.alpha(&margins, &dist).is_err());
    }
}
