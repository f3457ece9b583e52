//! Error taxonomy for grade calculation.
//!
//! Every variant is final: the input is static, so retrying without changing
//! it cannot succeed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradeError {
    #[error("no components supplied")]
    EmptyInput,

    #[error("component {component}: missing required field `{field}`")]
    MissingField {
        component: String,
        field: &'static str,
    },

    #[error("component percentages sum to {total:.2}, expected 100 ± {tolerance}")]
    InvalidWeights { total: f64, tolerance: f64 },

    #[error("component {component}: rank {rank} is outside 1..={student_count}")]
    InvalidRank {
        component: String,
        rank: i64,
        student_count: i64,
    },

    #[error("component {component}: standard deviation {value} is negative")]
    InvalidStatistic { component: String, value: f64 },

    #[error("duplicate component name `{0}`")]
    DuplicateComponent(String),

    #[error("malformed input record: {0}")]
    MalformedInput(String),

    #[error("invalid grading scale: {0}")]
    InvalidScale(String),
}

impl GradeError {
    /// Short name of the variant, printed by the CLI next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            GradeError::EmptyInput => "EmptyInput",
            GradeError::MissingField { .. } => "MissingField",
            GradeError::InvalidWeights { .. } => "InvalidWeights",
            GradeError::InvalidRank { .. } => "InvalidRank",
            GradeError::InvalidStatistic { .. } => "InvalidStatistic",
            GradeError::DuplicateComponent(_) => "DuplicateComponent",
            GradeError::MalformedInput(_) => "MalformedInput",
            GradeError::InvalidScale(_) => "InvalidScale",
        }
    }
}

impl From<serde_json::Error> for GradeError {
    fn from(err: serde_json::Error) -> Self {
        GradeError::MalformedInput(err.to_string())
    }
}

pub type GradeResult<T> = Result<T, GradeError>;
