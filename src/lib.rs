pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod output;
pub mod psv;

pub use engine::{Component, GradeEngine, GradingMethod, GradingScale, Report};
pub use error::{GradeError, GradeResult};
