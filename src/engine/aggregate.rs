use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::engine::grade::GradingScale;
use crate::engine::stats::{mean, percentile_rank, standardize, weighted_mean, z_score};
use crate::engine::types::{
    Component, ComponentReport, GradingMethod, OverallStats, Report, ReportStatistics, ScoreRange,
};
use crate::engine::validate::{
    DEFAULT_WEIGHT_TOLERANCE, fill_missing_weights, total_percentage, validate,
};
use crate::error::{GradeError, GradeResult};

/// Sum of `score * percentage / 100` over all components, unrounded.
pub fn compute_final_grade(components: &[Component]) -> f64 {
    components.iter().map(weighted_contribution).sum()
}

pub fn weighted_contribution(component: &Component) -> f64 {
    component.score * component.percentage / 100.0
}

/// Turns a component collection into a [`Report`].
///
/// The engine holds only immutable configuration, so one instance can serve
/// any number of independent calculations.
#[derive(Debug, Clone)]
pub struct GradeEngine {
    catalog_scale: GradingScale,
    deviation_scale: GradingScale,
    method: GradingMethod,
    weight_tolerance: f64,
    fill_missing_weights: bool,
}

impl Default for GradeEngine {
    fn default() -> Self {
        Self {
            catalog_scale: GradingScale::catalog(),
            deviation_scale: GradingScale::standard_deviation(),
            method: GradingMethod::Catalog,
            weight_tolerance: DEFAULT_WEIGHT_TOLERANCE,
            fill_missing_weights: false,
        }
    }
}

impl GradeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the bands applied to the numeric final grade.
    pub fn with_catalog_scale(mut self, scale: GradingScale) -> Self {
        self.catalog_scale = scale;
        self
    }

    /// Replaces the bands applied to the final grade's z-score.
    pub fn with_deviation_scale(mut self, scale: GradingScale) -> Self {
        self.deviation_scale = scale;
        self
    }

    pub fn with_method(mut self, method: GradingMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_weight_tolerance(mut self, tolerance: f64) -> Self {
        self.weight_tolerance = tolerance;
        self
    }

    /// Give zero-weighted components an equal share of the missing weight
    /// before validating.
    pub fn with_fill_missing_weights(mut self, enabled: bool) -> Self {
        self.fill_missing_weights = enabled;
        self
    }

    pub fn method(&self) -> GradingMethod {
        self.method
    }

    /// Letter for a numeric final grade on the catalog scale.
    pub fn assign_letter_grade(&self, final_grade: f64) -> String {
        self.catalog_scale.letter_for(final_grade).to_string()
    }

    /// Validates `components` and computes the full report.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; no partial report is produced.
    pub fn build_report(&self, components: &[Component]) -> GradeResult<Report> {
        let mut components = components.to_vec();
        if self.fill_missing_weights {
            fill_missing_weights(&mut components);
        }
        validate(&components, self.weight_tolerance)?;

        let final_grade = compute_final_grade(&components);

        let rows: Vec<ComponentReport> = components
            .iter()
            .map(|c| ComponentReport {
                component: c.clone(),
                weighted_contribution: weighted_contribution(c),
                z_score: z_score(c),
                percentile_rank: percentile_rank(c),
            })
            .collect();

        let best = select(&rows, |a, b| b.total_cmp(&a)).ok_or(GradeError::EmptyInput)?;
        let weakest = select(&rows, |a, b| a.total_cmp(&b)).ok_or(GradeError::EmptyInput)?;

        let overall = overall_stats(final_grade, &rows);
        let letter_grade = self.letter_for(final_grade, &overall);

        debug!(
            final_grade,
            letter_grade = %letter_grade,
            method = %self.method,
            best,
            weakest,
            "Report computed"
        );

        Ok(Report {
            final_grade,
            letter_grade,
            grading_method: self.method,
            best_component: best.to_string(),
            weakest_component: weakest.to_string(),
            overall,
            statistics: statistics(&components),
            components: rows,
            generated_at: None,
        })
    }

    fn letter_for(&self, final_grade: f64, overall: &OverallStats) -> String {
        match self.method {
            GradingMethod::Catalog => self.assign_letter_grade(final_grade),
            GradingMethod::StandardDeviation => match overall.z_score {
                Some(z) => self.deviation_scale.letter_for(z).to_string(),
                None => {
                    warn!("Class deviation is zero, falling back to catalog scale");
                    self.assign_letter_grade(final_grade)
                }
            },
        }
    }
}

/// Picks the component whose percentile rank sorts first under `order`,
/// breaking ties by name ascending.
fn select(rows: &[ComponentReport], order: impl Fn(f64, f64) -> Ordering) -> Option<&str> {
    rows.iter()
        .min_by(|a, b| {
            order(a.percentile_rank, b.percentile_rank)
                .then_with(|| a.component.name.cmp(&b.component.name))
        })
        .map(|row| row.component.name.as_str())
}

/// Weight-averages a per-row value using each component's percentage.
fn by_weight(rows: &[ComponentReport], value: impl Fn(&ComponentReport) -> f64) -> f64 {
    weighted_mean(rows.iter().map(|r| (value(r), r.component.percentage)))
}

fn overall_stats(final_grade: f64, rows: &[ComponentReport]) -> OverallStats {
    let average = by_weight(rows, |r| r.component.average);
    let standard_deviation = by_weight(rows, |r| r.component.standard_deviation.powi(2)).sqrt();

    OverallStats {
        average,
        standard_deviation,
        z_score: standardize(final_grade, average, standard_deviation),
        percentile_rank: by_weight(rows, |r| r.percentile_rank),
    }
}

fn statistics(components: &[Component]) -> ReportStatistics {
    let scores: Vec<f64> = components.iter().map(|c| c.score).collect();

    ReportStatistics {
        total_components: components.len(),
        total_percentage: total_percentage(components),
        average_score: mean(&scores),
        score_range: ScoreRange {
            min: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        },
    }
}
