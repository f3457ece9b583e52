//! Letter-grade lookup tables.

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, GradeResult};

/// Fixed boundaries applied to the numeric final grade.
///
/// | Range   | Grade |
/// |---------|-------|
/// | >= 90   | AA    |
/// | >= 85   | BA    |
/// | >= 80   | BB    |
/// | >= 75   | CB    |
/// | >= 70   | CC    |
/// | >= 65   | DC    |
/// | >= 60   | DD    |
/// | >= 50   | FD    |
/// | < 50    | FF    |
static CATALOG_BANDS: &[(f64, &str)] = &[
    (90.0, "AA"),
    (85.0, "BA"),
    (80.0, "BB"),
    (75.0, "CB"),
    (70.0, "CC"),
    (65.0, "DC"),
    (60.0, "DD"),
    (50.0, "FD"),
];

/// Boundaries applied to the z-score of the final grade.
static DEVIATION_BANDS: &[(f64, &str)] = &[
    (1.5, "AA"),
    (1.0, "BA"),
    (0.5, "BB"),
    (0.0, "CB"),
    (-0.5, "CC"),
    (-1.0, "DC"),
    (-1.5, "DD"),
    (-2.0, "FD"),
];

static FLOOR_LETTER: &str = "FF";

/// One row of a grading scale: values at or above `threshold` earn `letter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub threshold: f64,
    pub letter: String,
}

/// Ordered cutoff table mapping a number onto a letter grade.
///
/// Bands are kept in strictly descending threshold order; the first band
/// whose threshold is at or below the value wins, and anything below every
/// band gets the floor letter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingScale {
    bands: Vec<GradeBand>,
    floor: String,
}

#[derive(Deserialize)]
struct RawScale {
    bands: Vec<GradeBand>,
    floor: String,
}

impl GradingScale {
    /// Builds a scale, rejecting tables that cannot be looked up unambiguously.
    pub fn new(bands: Vec<GradeBand>, floor: impl Into<String>) -> GradeResult<Self> {
        let floor = floor.into();

        if bands.is_empty() {
            return Err(GradeError::InvalidScale("scale has no bands".into()));
        }
        if floor.trim().is_empty() {
            return Err(GradeError::InvalidScale("floor letter is empty".into()));
        }
        for band in &bands {
            if !band.threshold.is_finite() {
                return Err(GradeError::InvalidScale(format!(
                    "threshold for `{}` is not a finite number",
                    band.letter
                )));
            }
            if band.letter.trim().is_empty() {
                return Err(GradeError::InvalidScale(format!(
                    "band at {} has an empty letter",
                    band.threshold
                )));
            }
        }
        if let Some(pair) = bands.windows(2).find(|w| w[0].threshold <= w[1].threshold) {
            return Err(GradeError::InvalidScale(format!(
                "thresholds must be strictly descending ({} then {})",
                pair[0].threshold, pair[1].threshold
            )));
        }

        Ok(Self { bands, floor })
    }

    /// Parses a scale from `{"bands": [{"threshold": .., "letter": ..}], "floor": ..}`.
    pub fn from_json(json: &str) -> GradeResult<Self> {
        let raw: RawScale = serde_json::from_str(json)
            .map_err(|e| GradeError::InvalidScale(e.to_string()))?;
        Self::new(raw.bands, raw.floor)
    }

    /// The default catalog scale (AA down to FF).
    pub fn catalog() -> Self {
        Self::from_static(CATALOG_BANDS)
    }

    /// The default scale for the standard-deviation method, keyed on z-scores.
    pub fn standard_deviation() -> Self {
        Self::from_static(DEVIATION_BANDS)
    }

    fn from_static(table: &[(f64, &str)]) -> Self {
        Self {
            bands: table
                .iter()
                .map(|(threshold, letter)| GradeBand {
                    threshold: *threshold,
                    letter: (*letter).to_string(),
                })
                .collect(),
            floor: FLOOR_LETTER.to_string(),
        }
    }

    /// Letter for `value`. NaN falls through to the floor letter.
    pub fn letter_for(&self, value: f64) -> &str {
        self.bands
            .iter()
            .find(|band| value >= band.threshold)
            .map(|band| band.letter.as_str())
            .unwrap_or(self.floor.as_str())
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    pub fn floor(&self) -> &str {
        &self.floor
    }
}

impl Default for GradingScale {
    fn default() -> Self {
        Self::catalog()
    }
}
