//! Data types shared by the grading pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One graded activity (quiz, homework, midterm, final) with the class
/// statistics it was graded against.
///
/// Counts are signed so that a negative `student_count` or `rank` in the
/// input surfaces as a rank violation rather than a type error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub score: f64,
    /// Weight in the final grade, 0–100.
    pub percentage: f64,
    pub average: f64,
    pub standard_deviation: f64,
    pub student_count: i64,
    /// 1 is the best position in the class.
    pub rank: i64,
}

/// How the final letter grade is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GradingMethod {
    /// Fixed bands applied to the numeric final grade.
    #[default]
    Catalog,
    /// Bands applied to the z-score of the final grade against the
    /// weighted class average and deviation.
    #[serde(alias = "sd_method")]
    #[value(alias = "sd")]
    StandardDeviation,
}

impl fmt::Display for GradingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingMethod::Catalog => f.write_str("catalog"),
            GradingMethod::StandardDeviation => f.write_str("standard_deviation"),
        }
    }
}

impl FromStr for GradingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(GradingMethod::Catalog),
            "sd" | "sd_method" | "standard_deviation" | "standard-deviation" => {
                Ok(GradingMethod::StandardDeviation)
            }
            other => Err(format!("unknown grading method `{other}`")),
        }
    }
}

/// A component as it appears in the report, with its derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentReport {
    #[serde(flatten)]
    pub component: Component,
    pub weighted_contribution: f64,
    /// `None` when the class deviation is zero.
    pub z_score: Option<f64>,
    pub percentile_rank: f64,
}

/// Class-level context for the final grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub average: f64,
    pub standard_deviation: f64,
    pub z_score: Option<f64>,
    pub percentile_rank: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

/// Descriptive numbers about the input itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub total_components: usize,
    pub total_percentage: f64,
    pub average_score: f64,
    pub score_range: ScoreRange,
}

/// Complete result of one grade calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub final_grade: f64,
    pub letter_grade: String,
    pub grading_method: GradingMethod,
    pub components: Vec<ComponentReport>,
    pub best_component: String,
    pub weakest_component: String,
    pub overall: OverallStats,
    pub statistics: ReportStatistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Stamps the report with the time it was produced.
    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Looks up a component row by name.
    pub fn component(&self, name: &str) -> Option<&ComponentReport> {
        self.components.iter().find(|c| c.component.name == name)
    }
}
