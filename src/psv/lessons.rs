use anyhow::Result;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{debug, warn};

use super::{is_blank, line_of, psv_reader};

const LESSON_FIELDS: usize = 11;
const CONVERSION_NOTES: &str = "Location, days, times, and room fields parsed into sessions array";

/// One meeting of a lesson section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub location: String,
    pub day: String,
    pub time: String,
    pub room: String,
}

/// A lesson section with its meeting sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_id: String,
    pub course_code: String,
    pub delivery_mode: String,
    pub instructor: String,
    pub sessions: Vec<Session>,
    pub capacity: String,
    pub enrolled: String,
    pub allowed_programs: Vec<String>,
}

/// Where a lessons file came from and how it was converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonsMetadata {
    pub source_file: String,
    pub total_lessons: usize,
    pub conversion_notes: String,
}

/// The written form of a converted lessons file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonsDocument {
    pub metadata: LessonsMetadata,
    pub lessons: Vec<Lesson>,
}

impl LessonsDocument {
    pub fn new(source_file: impl Into<String>, lessons: Vec<Lesson>) -> Self {
        Self {
            metadata: LessonsMetadata {
                source_file: source_file.into(),
                total_lessons: lessons.len(),
                conversion_notes: CONVERSION_NOTES.to_string(),
            },
            lessons,
        }
    }
}

/// Zips the whitespace-separated location, day, time and room columns into
/// sessions. A column with fewer entries repeats its last one.
pub fn parse_sessions(location: &str, days: &str, times: &str, room: &str) -> Vec<Session> {
    let columns: [Vec<&str>; 4] =
        [location, days, times, room].map(|field| field.split_whitespace().collect());
    let len = columns.iter().map(Vec::len).max().unwrap_or(0);

    let pick = |column: &[&str], i: usize| -> String {
        column
            .get(i)
            .or(column.last())
            .copied()
            .unwrap_or("")
            .to_string()
    };

    (0..len)
        .map(|i| Session {
            location: pick(&columns[0], i),
            day: pick(&columns[1], i),
            time: pick(&columns[2], i),
            room: pick(&columns[3], i),
        })
        .collect()
}

fn parse_lesson(record: &StringRecord) -> Lesson {
    let field = |i: usize| record.get(i).unwrap_or("").to_string();

    Lesson {
        lesson_id: field(0),
        course_code: field(1),
        delivery_mode: field(2),
        instructor: field(3),
        sessions: parse_sessions(&record[4], &record[5], &record[6], &record[7]),
        capacity: field(8),
        enrolled: field(9),
        allowed_programs: record[10]
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Converts the eleven-column lessons file. Lines with another width are skipped.
pub fn convert_lessons<R: Read>(reader: R) -> Result<Vec<Lesson>> {
    let mut rdr = psv_reader(reader);
    let mut lessons = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }

        if record.len() != LESSON_FIELDS {
            warn!(
                line = line_of(&record),
                found = record.len(),
                expected = LESSON_FIELDS,
                "Skipping lesson line"
            );
            skipped += 1;
            continue;
        }

        lessons.push(parse_lesson(&record));
    }

    debug!(lessons = lessons.len(), skipped, "Lessons converted");
    Ok(lessons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_zip_columns() {
        let sessions = parse_sessions(
            "MED MED",
            "Pazartesi Çarşamba",
            "0830/1029 1330/1529",
            "D101 D102",
        );
        assert_eq!(sessions.len(), 2);
        assert_eq!(
            sessions[1],
            Session {
                location: "MED".into(),
                day: "Çarşamba".into(),
                time: "1330/1529".into(),
                room: "D102".into(),
            }
        );
    }

    #[test]
    fn test_short_columns_repeat_last_value() {
        let sessions = parse_sessions("MED", "Pazartesi Salı", "0830/1029 1330/1529", "");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].location, "MED");
        assert_eq!(sessions[1].room, "");
    }

    #[test]
    fn test_no_sessions_for_empty_columns() {
        assert!(parse_sessions("", "", "", "").is_empty());
    }

    #[test]
    fn test_convert_lessons() {
        let input = "\
30001|FIZ 101|Yüz yüze|Ayşe Yılmaz|FEB FEB|Pazartesi Perşembe|0830/1029 0830/1029|D201 D202|60|58|BLG, END,,MAK
broken|line
";
        let lessons = convert_lessons(input.as_bytes()).unwrap();

        assert_eq!(lessons.len(), 1);
        let lesson = &lessons[0];
        assert_eq!(lesson.lesson_id, "30001");
        assert_eq!(lesson.course_code, "FIZ 101");
        assert_eq!(lesson.sessions.len(), 2);
        assert_eq!(lesson.capacity, "60");
        assert_eq!(lesson.enrolled, "58");
        assert_eq!(lesson.allowed_programs, ["BLG", "END", "MAK"]);
    }

    #[test]
    fn test_lessons_document_counts_lessons() {
        let input = "30002|MAT 101E|Yüz yüze|Mehmet Demir|EEB|Salı|1330/1629|5102|80|80|BLG\n";
        let lessons = convert_lessons(input.as_bytes()).unwrap();
        let document = LessonsDocument::new("data/lessons.psv", lessons);

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["metadata"]["source_file"], "data/lessons.psv");
        assert_eq!(value["metadata"]["total_lessons"], 1);
        assert_eq!(value["lessons"][0]["course_code"], "MAT 101E");
    }
}
