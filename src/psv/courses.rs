use anyhow::Result;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use tracing::{debug, warn};

use super::{is_blank, line_of, psv_reader, read_text};

const COURSE_FIELDS: usize = 8;

/// Written in place of a prerequisite list when there is none.
const NONE_MARKER: &str = "Yok";
const OTHER_CONDITIONS: &str = "Diğer Şartlar";
const YEAR_SUFFIX: &str = ".Sınıf";
const OR_KEYWORD: &str = "veya";
const AND_KEYWORD: &str = "ve";
const MIN_KEYWORD: &str = "MIN";

/// A course that satisfies a prerequisite with at least `min` as its grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub code: String,
    pub min: String,
}

/// Alternatives of which any one satisfies the group. All groups must be met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteGroup {
    pub group: usize,
    pub courses: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub name: String,
    pub language: String,
    pub credits: String,
    pub ects_credits: String,
    pub prerequisites: Vec<PrerequisiteGroup>,
    pub special_conditions: Vec<String>,
    pub corequisites: String,
    pub description: String,
}

/// Parses one `SUBJ 123X MIN GG` alternative. The code loses its inner space.
fn parse_requirement(text: &str) -> Option<Requirement> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|t| !t.is_empty())
        .collect();

    let pos = tokens.iter().position(|t| *t == MIN_KEYWORD)?;
    if pos < 2 {
        return None;
    }

    let subject = tokens[pos - 2];
    let number = tokens[pos - 1];
    let subject_ok = (2..=4).contains(&subject.len())
        && subject.chars().all(|c| c.is_ascii_uppercase());
    let number_ok = number.starts_with(|c: char| c.is_ascii_digit());
    if !subject_ok || !number_ok {
        return None;
    }

    let min: String = tokens
        .get(pos + 1)?
        .chars()
        .take_while(|c| c.is_ascii_uppercase())
        .collect();
    if min.is_empty() {
        return None;
    }

    Some(Requirement {
        code: format!("{subject}{number}"),
        min,
    })
}

/// Parses prerequisite text such as
/// `(MAT 281 MIN DDveya MAT 281E MIN DD)ve (BIL 105E MIN DDveya BIL 105 MIN DD)`
/// into AND-groups of OR-alternatives, numbered from 1.
pub fn parse_prerequisites(text: &str) -> Vec<PrerequisiteGroup> {
    let text = text.trim();
    if text.is_empty() || text == NONE_MARKER {
        return Vec::new();
    }

    // "veya" contains "ve", so the OR keyword is swapped out before splitting on AND.
    let marked = text.replace(OR_KEYWORD, "\u{1F}");

    marked
        .split(AND_KEYWORD)
        .map(|group| {
            group
                .split('\u{1F}')
                .filter_map(parse_requirement)
                .collect::<Vec<_>>()
        })
        .filter(|courses| !courses.is_empty())
        .enumerate()
        .map(|(i, courses)| PrerequisiteGroup {
            group: i + 1,
            courses,
        })
        .collect()
}

/// Collects year restrictions (`4.Sınıf`) from the corequisites and the
/// "other conditions" flag from the prerequisites.
pub fn parse_special_conditions(prerequisites: &str, corequisites: &str) -> Vec<String> {
    let mut conditions: Vec<String> = Vec::new();

    if corequisites.trim() != NONE_MARKER {
        conditions.extend(
            corequisites
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| {
                    token
                        .strip_suffix(YEAR_SUFFIX)
                        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
                })
                .map(str::to_string),
        );
    }

    if prerequisites.contains(OTHER_CONDITIONS) {
        conditions.push(OTHER_CONDITIONS.to_string());
    }

    conditions
}

fn parse_course(record: &StringRecord) -> Course {
    let field = |i: usize| record.get(i).unwrap_or("").to_string();
    let prerequisites = record.get(5).unwrap_or("");
    let corequisites = record.get(6).unwrap_or("");

    Course {
        code: field(0),
        name: field(1),
        language: field(2),
        credits: field(3),
        ects_credits: field(4),
        prerequisites: parse_prerequisites(prerequisites),
        special_conditions: parse_special_conditions(prerequisites, corequisites),
        corequisites: corequisites.to_string(),
        description: field(7),
    }
}

/// Converts the eight-column course catalog. Lines with another width are skipped.
///
/// Files that are not valid UTF-8 are read as Latin-1.
pub fn convert_courses<R: Read>(reader: R) -> Result<Vec<Course>> {
    let text = read_text(reader)?;
    let mut rdr = psv_reader(text.as_bytes());
    let mut courses = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }

        if record.len() != COURSE_FIELDS {
            warn!(
                line = line_of(&record),
                found = record.len(),
                expected = COURSE_FIELDS,
                "Skipping course line"
            );
            continue;
        }

        courses.push(parse_course(&record));
    }

    let mut languages: BTreeMap<&str, usize> = BTreeMap::new();
    for course in &courses {
        *languages.entry(course.language.as_str()).or_default() += 1;
    }
    debug!(courses = courses.len(), ?languages, "Courses converted");

    Ok(courses)
}
