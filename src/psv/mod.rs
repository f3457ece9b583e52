//! Converters from pipe-separated educational records to JSON.
//!
//! Each converter knows one fixed layout and is a plain function over a
//! reader. Malformed lines are skipped with a warning rather than failing the
//! whole file.

pub mod courses;
pub mod exams;
pub mod lessons;
pub mod plans;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

use crate::output::write_json;

/// The record layouts that can be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConvertKind {
    /// Header line followed by exam rows.
    FinalExams,
    /// Eleven-column lesson sections with meeting sessions.
    Lessons,
    /// Eight-column course catalog with prerequisites.
    Courses,
    /// `#`/`##`/`###` headed course plans with `=`-separated semesters.
    Plans,
}

/// Pipe-delimited reader with trimmed fields and no quoting.
pub(crate) fn psv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(reader)
}

/// Line number of a record in the source file, for diagnostics.
pub(crate) fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// True for lines that held nothing but whitespace.
pub(crate) fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Reads the whole input as text, falling back to Latin-1 when it is not UTF-8.
pub(crate) fn read_text<R: Read>(mut reader: R) -> Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(
                valid_up_to = e.utf8_error().valid_up_to(),
                "Input is not UTF-8, reading as Latin-1"
            );
            Ok(e.into_bytes().into_iter().map(char::from).collect())
        }
    }
}

/// Converts `reader` according to `kind` and returns the JSON document.
/// `source` names the input in documents that record it.
pub fn convert<R: Read>(kind: ConvertKind, reader: R, source: &str) -> Result<(Value, usize)> {
    let (value, count) = match kind {
        ConvertKind::FinalExams => {
            let rows = exams::convert_final_exams(reader)?;
            let count = rows.len();
            (serde_json::to_value(rows)?, count)
        }
        ConvertKind::Lessons => {
            let lessons = lessons::convert_lessons(reader)?;
            let count = lessons.len();
            let document = lessons::LessonsDocument::new(source, lessons);
            (serde_json::to_value(document)?, count)
        }
        ConvertKind::Courses => {
            let courses = courses::convert_courses(reader)?;
            let count = courses.len();
            (serde_json::to_value(courses)?, count)
        }
        ConvertKind::Plans => {
            let plans = plans::convert_plans(BufReader::new(reader))?;
            let count = plans.semester_count();
            (serde_json::to_value(plans)?, count)
        }
    };
    Ok((value, count))
}

/// Converts the file at `input` and writes pretty JSON to `output`.
/// Returns the number of records written.
#[tracing::instrument(
    skip(input, output),
    fields(input = %input.display(), output = %output.display())
)]
pub fn convert_file(kind: ConvertKind, input: &Path, output: &Path) -> Result<usize> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let (value, count) = convert(kind, file, &input.display().to_string())?;
    write_json(output, &value)?;
    info!(?kind, records = count, "Conversion complete");
    Ok(count)
}
