//! Statistics primitives shared by the analyzers.
//!
//! Everything here is total over its inputs: short or constant series map to
//! `0.0` or `None` instead of `NaN`.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::models::{CorrelationStrength, PValueMethod};

/// Widest possible gap between two cohort means on the 0-10 score scale.
pub const MAX_SCORE_DIFFERENCE: f64 = 10.0;

/// p-value reported when two constant cohorts differ.
pub const DISTINCT_CONSTANTS_P_VALUE: f64 = 0.0001;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Pearson product-moment correlation, clamped to `[-1, 1]`.
///
/// Returns `0.0` for fewer than two points, for a constant series, and for
/// any computation that ends in `NaN`.
///
/// # Panics
///
/// Panics if `x` and `y` differ in length.
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "correlation needs paired series");
    if x.len() < 2 {
        return 0.0;
    }

    let (Some(mean_x), Some(mean_y)) = (mean(x), mean(y)) else {
        return 0.0;
    };

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    let r = covariance / (var_x * var_y).sqrt();
    if r.is_nan() {
        0.0
    } else {
        r.clamp(-1.0, 1.0)
    }
}

pub fn correlation_strength(r: f64) -> CorrelationStrength {
    let magnitude = r.abs();
    if magnitude.is_nan() || magnitude < 0.1 {
        CorrelationStrength::Negligible
    } else if magnitude < 0.3 {
        CorrelationStrength::Weak
    } else if magnitude < 0.5 {
        CorrelationStrength::Moderate
    } else if magnitude < 0.7 {
        CorrelationStrength::Strong
    } else {
        CorrelationStrength::VeryStrong
    }
}

/// Sample variance (divides by `n - 1`).
fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some(squares / (values.len() - 1) as f64)
}

/// Sample standard deviation; `None` for fewer than two values.
pub fn standard_deviation(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// `sqrt(((n1-1)*sd1^2 + (n2-1)*sd2^2) / (n1+n2-2))`
pub fn pooled_standard_deviation(group1: &[f64], group2: &[f64]) -> Option<f64> {
    let var1 = sample_variance(group1)?;
    let var2 = sample_variance(group2)?;
    let n1 = group1.len() as f64;
    let n2 = group2.len() as f64;
    Some((((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / (n1 + n2 - 2.0)).sqrt())
}

/// Cohen's d: `|mean1 - mean2| / pooled_sd`.
///
/// `None` when either group has fewer than two points or the pooled standard
/// deviation is zero.
pub fn effect_size(group1: &[f64], group2: &[f64]) -> Option<f64> {
    let pooled = pooled_standard_deviation(group1, group2)?;
    if pooled == 0.0 {
        return None;
    }
    let d = (mean(group1)? - mean(group2)?).abs() / pooled;
    d.is_finite().then_some(d)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PValue {
    pub value: f64,
    pub method: PValueMethod,
}

/// Two-sided p-value for a difference in cohort means.
///
/// Uses Welch's t-test when both groups have at least two points and a
/// non-zero standard error. Otherwise falls back to [`heuristic_p_value`],
/// which is an approximation and is labelled as such. `None` when either
/// group is empty.
pub fn p_value(group1: &[f64], group2: &[f64]) -> Option<PValue> {
    if group1.is_empty() || group2.is_empty() {
        return None;
    }

    if let Some(value) = welch_t_test(group1, group2) {
        return Some(PValue {
            value,
            method: PValueMethod::TTest,
        });
    }

    heuristic_p_value(group1, group2).map(|value| PValue {
        value,
        method: PValueMethod::Heuristic,
    })
}

fn welch_t_test(group1: &[f64], group2: &[f64]) -> Option<f64> {
    let var1 = sample_variance(group1)?;
    let var2 = sample_variance(group2)?;
    let n1 = group1.len() as f64;
    let n2 = group2.len() as f64;

    let se1 = var1 / n1;
    let se2 = var2 / n2;
    let standard_error = (se1 + se2).sqrt();
    if standard_error == 0.0 || !standard_error.is_finite() {
        return None;
    }

    let t = (mean(group1)? - mean(group2)?) / standard_error;
    let freedom = (se1 + se2).powi(2)
        / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
    if !t.is_finite() || !freedom.is_finite() || freedom <= 0.0 {
        return None;
    }

    let distribution = StudentsT::new(0.0, 1.0, freedom).ok()?;
    let p = 2.0 * distribution.sf(t.abs());
    p.is_finite().then(|| p.clamp(0.0, 1.0))
}

/// Mean-difference approximation of a p-value.
///
/// Two internally constant groups give `1.0` when equal and
/// [`DISTINCT_CONSTANTS_P_VALUE`] when not. Otherwise the result is
/// `1 - min(1, |mean1 - mean2| / MAX_SCORE_DIFFERENCE)`. This is not a
/// hypothesis test.
pub fn heuristic_p_value(group1: &[f64], group2: &[f64]) -> Option<f64> {
    let mean1 = mean(group1)?;
    let mean2 = mean(group2)?;

    if is_constant(group1) && is_constant(group2) {
        return Some(if group1[0] == group2[0] {
            1.0
        } else {
            DISTINCT_CONSTANTS_P_VALUE
        });
    }

    Some(1.0 - ((mean1 - mean2).abs() / MAX_SCORE_DIFFERENCE).min(1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}
