//! Course-plan converter.
//!
//! Plans are not column data: `# `, `## ` and `### ` lines open a faculty,
//! program and period, and every line containing `=` lists one semester as
//! `=`-separated course codes and `[...]` elective slots. A file with no
//! headers is a single plan and converts to a flat list of semesters.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, warn};

const SEMESTER_SEPARATOR: char = '=';

/// One slot of a semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlanEntry {
    Course {
        code: String,
    },
    Elective {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        options: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub courses: Vec<PlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub name: String,
    pub semesters: Vec<Semester>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub periods: Vec<Period>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub name: String,
    pub programs: Vec<Program>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoursePlans {
    Catalog { faculties: Vec<Faculty> },
    Single(Vec<Vec<PlanEntry>>),
}

impl CoursePlans {
    pub fn semester_count(&self) -> usize {
        match self {
            CoursePlans::Catalog { faculties } => faculties
                .iter()
                .flat_map(|f| &f.programs)
                .flat_map(|p| &p.periods)
                .map(|p| p.semesters.len())
                .sum(),
            CoursePlans::Single(semesters) => semesters.len(),
        }
    }
}

/// Parses `[Name (CATEGORY)*(OPT 1|OPT 2)]`; the category is optional.
pub fn parse_elective(text: &str) -> Option<PlanEntry> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;

    let (name, category, options) = match inner.split_once(")*(") {
        Some((head, options)) => {
            let (name, category) = head.rsplit_once('(')?;
            (name, Some(category.trim().to_string()), options)
        }
        None => {
            let (name, options) = inner.split_once("*(")?;
            (name, None, options)
        }
    };

    let options = options
        .strip_suffix(')')?
        .split('|')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    Some(PlanEntry::Elective {
        name: name.trim().to_string(),
        category,
        options,
    })
}

/// Splits a semester line into its entries. Unparseable elective slots are dropped.
pub fn parse_semester(line: &str) -> Vec<PlanEntry> {
    line.split(SEMESTER_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            if part.starts_with('[') && part.ends_with(']') {
                let entry = parse_elective(part);
                if entry.is_none() {
                    warn!(slot = part, "Unrecognized elective slot");
                }
                entry
            } else {
                Some(PlanEntry::Course {
                    code: part.to_string(),
                })
            }
        })
        .collect()
}

enum Line<'a> {
    Faculty(&'a str),
    Program(&'a str),
    Period(&'a str),
    Semester(&'a str),
    Other,
}

fn classify(line: &str) -> Line<'_> {
    if let Some(name) = line.strip_prefix("### ") {
        Line::Period(name.trim())
    } else if let Some(name) = line.strip_prefix("## ") {
        Line::Program(name.trim())
    } else if let Some(name) = line.strip_prefix("# ") {
        Line::Faculty(name.trim())
    } else if !line.starts_with('#') && line.contains(SEMESTER_SEPARATOR) {
        Line::Semester(line)
    } else {
        Line::Other
    }
}

/// Converts a plan file into either the faculty/program/period tree or, when
/// the file has no headers, a flat list of semesters.
pub fn convert_plans<R: BufRead>(reader: R) -> Result<CoursePlans> {
    let mut faculties: Vec<Faculty> = Vec::new();
    let mut flat: Vec<Vec<PlanEntry>> = Vec::new();
    let mut saw_header = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index + 1;

        match classify(line) {
            Line::Faculty(name) => {
                saw_header = true;
                faculties.push(Faculty {
                    name: name.to_string(),
                    programs: Vec::new(),
                });
            }
            Line::Program(name) => {
                saw_header = true;
                match faculties.last_mut() {
                    Some(faculty) => faculty.programs.push(Program {
                        name: name.to_string(),
                        periods: Vec::new(),
                    }),
                    None => warn!(line = line_no, program = name, "Program outside a faculty"),
                }
            }
            Line::Period(name) => {
                saw_header = true;
                match faculties.last_mut().and_then(|f| f.programs.last_mut()) {
                    Some(program) => program.periods.push(Period {
                        name: name.to_string(),
                        semesters: Vec::new(),
                    }),
                    None => warn!(line = line_no, period = name, "Period outside a program"),
                }
            }
            Line::Semester(text) => {
                let courses = parse_semester(text);
                if !saw_header {
                    flat.push(courses);
                    continue;
                }
                match faculties
                    .last_mut()
                    .and_then(|f| f.programs.last_mut())
                    .and_then(|p| p.periods.last_mut())
                {
                    Some(period) => period.semesters.push(Semester { courses }),
                    None => warn!(line = line_no, "Semester outside a period"),
                }
            }
            Line::Other if !saw_header => flat.push(parse_semester(line)),
            Line::Other => debug!(line = line_no, "Ignoring line"),
        }
    }

    if saw_header {
        Ok(CoursePlans::Catalog { faculties })
    } else {
        Ok(CoursePlans::Single(flat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str) -> PlanEntry {
        PlanEntry::Course { code: code.into() }
    }

    #[test]
    fn test_elective_with_category() {
        let text = "[5th Semester Elective Course (TM)*(INS 313E|INS 315E|INS 317E)]";
        let entry = parse_elective(text);
        assert_eq!(
            entry,
            Some(PlanEntry::Elective {
                name: "5th Semester Elective Course".into(),
                category: Some("TM".into()),
                options: vec!["INS 313E".into(), "INS 315E".into(), "INS 317E".into()],
            })
        );
    }

    #[test]
    fn test_elective_without_category() {
        let entry = parse_elective("[English Course I*(ING 101|ING 102)]").unwrap();
        match entry {
            PlanEntry::Elective {
                name,
                category,
                options,
            } => {
                assert_eq!(name, "English Course I");
                assert_eq!(category, None);
                assert_eq!(options, ["ING 101", "ING 102"]);
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn test_malformed_elective() {
        assert_eq!(parse_elective("[Free Elective]"), None);
        assert_eq!(parse_elective("MAT 101"), None);
    }

    #[test]
    fn test_semester_line() {
        let entries = parse_semester("FIZ 101=KIM 101= =[English Course I*(ING 101|ING 102)]");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], course("FIZ 101"));
        assert!(matches!(entries[2], PlanEntry::Elective { .. }));
    }

    #[test]
    fn test_headed_plan_tree() {
        let input = "\
# Faculty of Engineering
## Computer Engineering
### 2021 and later
FIZ 101=MAT 101E
BLG 102E=MAT 102E

### Before 2021
FIZ 101=MAT 103E
# Faculty of Science
## Physics
### 2020
FIZ 121=MAT 101
";
        let plans = convert_plans(input.as_bytes()).unwrap();
        assert_eq!(plans.semester_count(), 4);

        let CoursePlans::Catalog { faculties } = plans else {
            panic!("expected a catalog");
        };
        assert_eq!(faculties.len(), 2);
        let program = &faculties[0].programs[0];
        assert_eq!(program.name, "Computer Engineering");
        assert_eq!(program.periods.len(), 2);
        let spring = &program.periods[0].semesters[1];
        assert_eq!(spring.courses[1], course("MAT 102E"));
        assert_eq!(faculties[1].programs[0].periods[0].name, "2020");
    }

    #[test]
    fn test_single_plan_without_headers() {
        let plans = convert_plans("FIZ 101=KIM 101\nMAT 102\n".as_bytes()).unwrap();
        assert_eq!(
            plans,
            CoursePlans::Single(vec![
                vec![course("FIZ 101"), course("KIM 101")],
                vec![course("MAT 102")],
            ])
        );
    }

    #[test]
    fn test_serialized_shape() {
        let plans = convert_plans("# F\n## P\n### 2020\nA 1=[X (Y)*(B 2)]\n".as_bytes()).unwrap();
        let value = serde_json::to_value(&plans).unwrap();
        let slot = &value["faculties"][0]["programs"][0]["periods"][0]["semesters"][0]["courses"];
        assert_eq!(slot[0]["type"], "course");
        assert_eq!(slot[1]["type"], "elective");
        assert_eq!(slot[1]["category"], "Y");
    }
}
