use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::engine::grade::GradingScale;
use crate::engine::types::GradingMethod;

const DEFAULT_LOG_FILE_PATH: &str = "logs/grade_engine.log";

/// Runtime settings read from the environment (and `.env`, when the binary
/// loads one).
///
/// | Variable           | Meaning                                    |
/// |--------------------|--------------------------------------------|
/// | `LOG_FILE_PATH`    | JSON log file, rotated daily               |
/// | `GRADE_SCALE_PATH` | catalog scale used when none is passed     |
/// | `GRADING_METHOD`   | `catalog` or `sd_method`                   |
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_file_path: PathBuf,
    pub scale_path: Option<PathBuf>,
    pub grading_method: Option<GradingMethod>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file_path: PathBuf::from(DEFAULT_LOG_FILE_PATH),
            scale_path: None,
            grading_method: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let grading_method = match get("GRADING_METHOD") {
            Some(raw) => Some(
                raw.parse::<GradingMethod>()
                    .map_err(anyhow::Error::msg)
                    .context("GRADING_METHOD is invalid")?,
            ),
            None => None,
        };

        Ok(Self {
            log_file_path: get("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH)),
            scale_path: get("GRADE_SCALE_PATH").map(PathBuf::from),
            grading_method,
        })
    }
}

/// Loads a grading scale from a JSON file:
/// ```json
/// {
///   "bands": [{"threshold": 90, "letter": "AA"}, {"threshold": 50, "letter": "FD"}],
///   "floor": "FF"
/// }
/// ```
pub fn load_scale(path: &Path) -> Result<GradingScale> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scale {}", path.display()))?;
    Ok(GradingScale::from_json(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_reads_all_variables() {
        let settings = Settings::from_lookup(lookup(&[
            ("LOG_FILE_PATH", "/tmp/grades.log"),
            ("GRADE_SCALE_PATH", "scales/strict.json"),
            ("GRADING_METHOD", "sd_method"),
        ]))
        .unwrap();

        assert_eq!(settings.log_file_path, PathBuf::from("/tmp/grades.log"));
        assert_eq!(
            settings.scale_path,
            Some(PathBuf::from("scales/strict.json"))
        );
        assert_eq!(
            settings.grading_method,
            Some(GradingMethod::StandardDeviation)
        );
    }

    #[test]
    fn test_blank_values_are_unset() {
        let vars = [("GRADE_SCALE_PATH", "  "), ("GRADING_METHOD", "")];
        let settings = Settings::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(settings.scale_path, None);
        assert_eq!(settings.grading_method, None);
    }

    #[test]
    fn test_invalid_method_is_an_error() {
        let vars = [("GRADING_METHOD", "curve")];
        assert!(Settings::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_load_scale_from_file() {
        let path = std::env::temp_dir().join("grade_engine_test_scale.json");
        fs::write(
            &path,
            r#"{"bands": [{"threshold": 60, "letter": "P"}], "floor": "F"}"#,
        )
        .unwrap();

        let scale = load_scale(&path).unwrap();
        assert_eq!(scale.letter_for(68.9), "P");
        assert_eq!(scale.letter_for(12.0), "F");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_scale_missing_file() {
        let path = std::env::temp_dir().join("grade_engine_test_scale_missing.json");
        let _ = fs::remove_file(&path);
        assert!(load_scale(&path).is_err());
    }
}
