use crate::engine::types::Component;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of `values` weighted by the paired `weights`. Returns 0.0 when the
/// weights sum to zero.
pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let (total, weight_sum) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(t, w), (value, weight)| {
            (t + value * weight, w + weight)
        });

    if weight_sum == 0.0 {
        0.0
    } else {
        total / weight_sum
    }
}

/// Distance of `value` from `mean` in units of `standard_deviation`.
///
/// Returns `None` when the deviation is not strictly positive.
pub fn standardize(value: f64, mean: f64, standard_deviation: f64) -> Option<f64> {
    if standard_deviation > 0.0 {
        Some((value - mean) / standard_deviation)
    } else {
        None
    }
}

/// `(score - average) / standard_deviation`, or `None` for a zero deviation.
pub fn z_score(component: &Component) -> Option<f64> {
    standardize(
        component.score,
        component.average,
        component.standard_deviation,
    )
}

/// Share of the class ranked at or below the student, 0–100.
pub fn percentile_rank(component: &Component) -> f64 {
    if component.student_count <= 0 {
        return 0.0;
    }
    let count = component.student_count as f64;
    (count - component.rank as f64) / count * 100.0
}
