use anyhow::Result;
use serde_json::{Map, Value};
use std::io::Read;
use tracing::{debug, warn};

use super::{is_blank, line_of, psv_reader};

/// One exam row keyed by the header names, in header order.
pub type ExamRow = Map<String, Value>;

/// Converts a headed PSV file (exam schedules) into one object per row.
///
/// Short rows are padded with empty strings and long rows truncated so that
/// every object has exactly the header's keys.
pub fn convert_final_exams<R: Read>(reader: R) -> Result<Vec<ExamRow>> {
    let mut rdr = psv_reader(reader);
    let mut records = rdr.records();

    let headers: Vec<String> = match records.next() {
        Some(first) => first?.iter().map(str::to_string).collect(),
        None => {
            warn!("Exam file is empty");
            return Ok(Vec::new());
        }
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        if is_blank(&record) {
            continue;
        }

        if record.len() != headers.len() {
            warn!(
                line = line_of(&record),
                found = record.len(),
                expected = headers.len(),
                "Row width differs from header"
            );
        }

        let row: ExamRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = record.get(i).unwrap_or("");
                (header.clone(), Value::String(value.to_string()))
            })
            .collect();
        rows.push(row);
    }

    debug!(
        rows = rows.len(),
        columns = headers.len(),
        "Exam rows converted"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_keyed_by_header_in_order() {
        let rows = convert_final_exams(
            "Course Code|Course Name|Date\nMAT 101E|Mathematics I|2024-01-10\n".as_bytes(),
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["Course Code", "Course Name", "Date"]);
        assert_eq!(rows[0]["Course Name"], "Mathematics I");
    }

    #[test]
    fn test_short_rows_padded_long_rows_truncated() {
        let rows = convert_final_exams("A|B|C\n1|2\n1|2|3|4\n".as_bytes()).unwrap();

        assert_eq!(rows[0]["C"], "");
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1]["C"], "3");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let rows = convert_final_exams("A|B\n\n1|2\n   \n3|4\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(convert_final_exams("".as_bytes()).unwrap().is_empty());
    }
}
