//! Weighted grade calculation.
//!
//! Validates a collection of graded components, aggregates their weighted
//! scores into a final grade, derives z-scores and percentile ranks, and maps
//! the result onto a letter grade through a configurable cutoff table.

pub mod aggregate;
pub mod grade;
pub mod stats;
pub mod types;
pub mod validate;

pub use aggregate::{GradeEngine, compute_final_grade};
pub use grade::{GradeBand, GradingScale};
pub use stats::{percentile_rank, z_score};
pub use types::{Component, ComponentReport, GradingMethod, Report};
