//! Parser for the JSON input record.
//!
//! The record is `{"components": [...], "statistics": {...}}`. Unknown keys
//! are ignored; a required key that is absent or `null` is reported as
//! [`GradeError::MissingField`].

use serde::Deserialize;
use tracing::debug;

use crate::engine::types::{Component, GradingMethod};
use crate::error::{GradeError, GradeResult};

/// Components plus the optional grading method named in the record.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeInput {
    pub components: Vec<Component>,
    pub grading_method: Option<GradingMethod>,
}

#[derive(Deserialize)]
struct RawRecord {
    components: Option<Vec<RawComponent>>,
    statistics: Option<RawStatistics>,
}

#[derive(Deserialize)]
struct RawStatistics {
    grading_method: Option<GradingMethod>,
}

#[derive(Deserialize)]
struct RawComponent {
    name: Option<String>,
    score: Option<f64>,
    percentage: Option<f64>,
    average: Option<f64>,
    standard_deviation: Option<f64>,
    student_count: Option<i64>,
    rank: Option<i64>,
}

impl RawComponent {
    fn into_component(self, index: usize) -> GradeResult<Component> {
        let name = self.name.ok_or_else(|| GradeError::MissingField {
            component: format!("#{index}"),
            field: "name",
        })?;

        let missing = |field: &'static str| GradeError::MissingField {
            component: name.clone(),
            field,
        };

        Ok(Component {
            score: self.score.ok_or_else(|| missing("score"))?,
            percentage: self.percentage.ok_or_else(|| missing("percentage"))?,
            average: self.average.ok_or_else(|| missing("average"))?,
            standard_deviation: self
                .standard_deviation
                .ok_or_else(|| missing("standard_deviation"))?,
            student_count: self.student_count.ok_or_else(|| missing("student_count"))?,
            rank: self.rank.ok_or_else(|| missing("rank"))?,
            name,
        })
    }
}

/// Parses an input record from JSON text.
///
/// # Errors
///
/// [`GradeError::MalformedInput`] for invalid JSON or mistyped values,
/// [`GradeError::MissingField`] for absent required keys.
pub fn parse_input(json: &str) -> GradeResult<GradeInput> {
    let raw: RawRecord = serde_json::from_str(json)?;

    let components = raw
        .components
        .ok_or_else(|| GradeError::MissingField {
            component: "<record>".to_string(),
            field: "components",
        })?
        .into_iter()
        .enumerate()
        .map(|(index, c)| c.into_component(index))
        .collect::<GradeResult<Vec<_>>>()?;

    let grading_method = raw.statistics.and_then(|s| s.grading_method);
    debug!(components = components.len(), ?grading_method, "Input record parsed");

    Ok(GradeInput {
        components,
        grading_method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "components": [
            {"name": "Q", "score": 40, "percentage": 15, "average": 68.06,
             "standard_deviation": 16.41, "student_count": 78, "rank": 66,
             "comment": "ignored"}
        ],
        "statistics": {"grading_method": "sd_method", "extra": 1}
    }"#;

    #[test]
    fn test_parse_valid_record() {
        let input = parse_input(RECORD).unwrap();
        assert_eq!(input.components.len(), 1);

        let q = &input.components[0];
        assert_eq!(q.name, "Q");
        assert_eq!(q.score, 40.0);
        assert_eq!(q.student_count, 78);
        assert_eq!(q.rank, 66);
        assert_eq!(input.grading_method, Some(GradingMethod::StandardDeviation));
    }

    #[test]
    fn test_statistics_block_is_optional() {
        let input = parse_input(r#"{"components": []}"#).unwrap();
        assert!(input.components.is_empty());
        assert_eq!(input.grading_method, None);
    }

    #[test]
    fn test_missing_field_names_component() {
        let err = parse_input(
            r#"{"components": [{"name": "H", "score": 80, "percentage": 15,
                "average": 70, "standard_deviation": 12, "student_count": 78}]}"#,
        )
        .unwrap_err();

        assert_eq!(
            err,
            GradeError::MissingField {
                component: "H".into(),
                field: "rank"
            }
        );
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = parse_input(
            r#"{"components": [{"name": "H", "score": null, "percentage": 15,
                "average": 70, "standard_deviation": 12, "student_count": 78, "rank": 1}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "MissingField");
    }

    #[test]
    fn test_missing_name_uses_index() {
        let err = parse_input(r#"{"components": [{"score": 1}]}"#).unwrap_err();
        assert_eq!(
            err,
            GradeError::MissingField {
                component: "#0".into(),
                field: "name"
            }
        );
    }

    #[test]
    fn test_missing_components_key() {
        let err = parse_input(r#"{"statistics": {}}"#).unwrap_err();
        assert_eq!(err.kind(), "MissingField");
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let err = parse_input(
            r#"{"components": [{"name": "H", "score": "eighty"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "MalformedInput");

        let err = parse_input("not json").unwrap_err();
        assert_eq!(err.kind(), "MalformedInput");
    }
}
