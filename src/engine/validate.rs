use std::collections::HashSet;

use tracing::debug;

use crate::engine::types::Component;
use crate::error::{GradeError, GradeResult};

/// Percentages must add up to this total.
pub const EXPECTED_TOTAL_PERCENTAGE: f64 = 100.0;

/// Default allowed absolute distance between the percentage sum and 100.
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 0.6;

/// Absorbs accumulation error when the sum sits right on the tolerance edge.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Checks a component collection before any computation runs.
///
/// Rules run in a fixed order and the first violation is returned: empty
/// input, duplicate names, per-component statistics and ranks, then the
/// percentage total.
pub fn validate(components: &[Component], weight_tolerance: f64) -> GradeResult<()> {
    if components.is_empty() {
        return Err(GradeError::EmptyInput);
    }

    let mut seen = HashSet::with_capacity(components.len());
    for component in components {
        if !seen.insert(component.name.as_str()) {
            return Err(GradeError::DuplicateComponent(component.name.clone()));
        }
    }

    for component in components {
        validate_component(component)?;
    }

    let total = total_percentage(components);
    if (total - EXPECTED_TOTAL_PERCENTAGE).abs() > weight_tolerance + WEIGHT_EPSILON {
        return Err(GradeError::InvalidWeights {
            total,
            tolerance: weight_tolerance,
        });
    }

    debug!(components = components.len(), total, "Input validated");
    Ok(())
}

fn validate_component(component: &Component) -> GradeResult<()> {
    if component.standard_deviation < 0.0 {
        return Err(GradeError::InvalidStatistic {
            component: component.name.clone(),
            value: component.standard_deviation,
        });
    }

    if component.student_count < 1
        || component.rank < 1
        || component.rank > component.student_count
    {
        return Err(GradeError::InvalidRank {
            component: component.name.clone(),
            rank: component.rank,
            student_count: component.student_count,
        });
    }

    Ok(())
}

pub fn total_percentage(components: &[Component]) -> f64 {
    components.iter().map(|c| c.percentage).sum()
}

/// Spreads the weight left over by the weighted components across the
/// components whose percentage is zero.
///
/// Nothing changes when no component is zero-weighted or when nothing is
/// left to spread; validation then decides whether the input is usable.
pub fn fill_missing_weights(components: &mut [Component]) {
    let missing = components.iter().filter(|c| c.percentage == 0.0).count();
    if missing == 0 {
        return;
    }

    let remainder = EXPECTED_TOTAL_PERCENTAGE - total_percentage(components);
    if remainder <= 0.0 {
        return;
    }

    let share = remainder / missing as f64;
    for component in components.iter_mut().filter(|c| c.percentage == 0.0) {
        component.percentage = share;
    }
    debug!(missing, share, "Filled missing component weights");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, percentage: f64) -> Component {
        Component {
            name: name.to_string(),
            score: 70.0,
            percentage,
            average: 65.0,
            standard_deviation: 10.0,
            student_count: 40,
            rank: 10,
        }
    }

    fn weights(pcts: &[f64]) -> Vec<Component> {
        pcts.iter()
            .enumerate()
            .map(|(i, p)| component(&format!("C{i}"), *p))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            validate(&[], DEFAULT_WEIGHT_TOLERANCE),
            Err(GradeError::EmptyInput)
        );
    }

    fn check_total(pcts: &[f64]) -> GradeResult<()> {
        validate(&weights(pcts), DEFAULT_WEIGHT_TOLERANCE)
    }

    #[test]
    fn test_exact_total_validates() {
        assert!(check_total(&[15.0, 15.0, 30.0, 40.0]).is_ok());
    }

    #[test]
    fn test_totals_within_tolerance_validate() {
        assert!(check_total(&[15.0, 15.0, 30.0, 39.4]).is_ok());
        assert!(check_total(&[15.0, 15.0, 30.0, 40.6]).is_ok());
        assert!(check_total(&[99.4]).is_ok());
        assert!(check_total(&[100.6]).is_ok());
    }

    #[test]
    fn test_totals_outside_tolerance_fail() {
        let cases = [[15.0, 15.0, 20.0, 40.0], [15.0, 15.0, 40.0, 40.0]];
        for pcts in cases {
            let err = check_total(&pcts).unwrap_err();
            assert!(matches!(err, GradeError::InvalidWeights { .. }), "{err:?}");
        }
    }

    #[test]
    fn test_tolerance_boundary() {
        assert!(check_total(&[100.55]).is_ok());
        assert!(check_total(&[99.45]).is_ok());
        for total in [100.61, 99.39] {
            assert_eq!(
                check_total(&[total]),
                Err(GradeError::InvalidWeights {
                    total,
                    tolerance: DEFAULT_WEIGHT_TOLERANCE
                })
            );
        }
    }

    #[test]
    fn test_custom_tolerance() {
        assert!(validate(&weights(&[99.0]), 1.0).is_ok());
        assert!(validate(&weights(&[99.0]), 0.5).is_err());
    }

    #[test]
    fn test_duplicate_wins_over_other_violations() {
        let mut first = component("Q", 200.0);
        first.rank = 500;
        let mut second = component("Q", 50.0);
        second.standard_deviation = -1.0;

        assert_eq!(
            validate(&[first, second], DEFAULT_WEIGHT_TOLERANCE),
            Err(GradeError::DuplicateComponent("Q".into()))
        );
    }

    #[test]
    fn test_rank_bounds() {
        for (count, rank) in [(40, 0), (40, 41), (0, 0), (-3, 1)] {
            let mut c = component("Q", 100.0);
            c.student_count = count;
            c.rank = rank;
            let err = validate(&[c], DEFAULT_WEIGHT_TOLERANCE).unwrap_err();
            assert_eq!(err.kind(), "InvalidRank", "count={count} rank={rank}");
        }

        let mut edge = component("Q", 100.0);
        edge.rank = edge.student_count;
        assert!(validate(&[edge], DEFAULT_WEIGHT_TOLERANCE).is_ok());
    }

    #[test]
    fn test_negative_deviation() {
        let mut c = component("F", 100.0);
        c.standard_deviation = -0.1;
        assert_eq!(
            validate(&[c], DEFAULT_WEIGHT_TOLERANCE),
            Err(GradeError::InvalidStatistic {
                component: "F".into(),
                value: -0.1
            })
        );
    }

    #[test]
    fn test_zero_deviation_is_valid() {
        let mut c = component("F", 100.0);
        c.standard_deviation = 0.0;
        assert!(validate(&[c], DEFAULT_WEIGHT_TOLERANCE).is_ok());
    }

    #[test]
    fn test_fill_missing_weights_spreads_remainder() {
        let mut comps = weights(&[40.0, 0.0, 0.0]);
        fill_missing_weights(&mut comps);
        assert_eq!(comps[1].percentage, 30.0);
        assert_eq!(comps[2].percentage, 30.0);
    }

    #[test]
    fn test_fill_missing_weights_all_zero() {
        let mut comps = weights(&[0.0, 0.0, 0.0, 0.0]);
        fill_missing_weights(&mut comps);
        assert!(comps.iter().all(|c| c.percentage == 25.0));
    }

    #[test]
    fn test_fill_missing_weights_nothing_left() {
        let mut comps = weights(&[60.0, 40.0, 0.0]);
        fill_missing_weights(&mut comps);
        assert_eq!(comps[2].percentage, 0.0);
    }
}
