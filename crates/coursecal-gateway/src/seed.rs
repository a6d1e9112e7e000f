//! Bulk import of course offerings from a JSON array.
//!
//! Each element uses the same camelCase field names the API returns. Every
//! record is validated before the first insert, so a bad file leaves the
//! table untouched.

use std::io::Read;

use anyhow::Context;
use coursecal_core::dates::parse_day;
use coursecal_core::{CalendarError, DateError, DayFormat};
use coursecal_store::{NewCourse, RecordStore};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseImport {
    pub source: String,
    pub start_program_dates: String,
    pub end_program_dates: String,
    pub start_time: String,
    pub end_time: String,
    pub course_name: String,
    pub target_audience: String,
    pub format: String,
}

impl CourseImport {
    pub fn into_new_course(self, format: &DayFormat) -> Result<NewCourse, CalendarError> {
        let start = parse_day(&self.start_program_dates, format)?;
        let end = parse_day(&self.end_program_dates, format)?;
        if let (Some(s), Some(e)) = (start.determined(), end.determined()) {
            if e < s {
                return Err(DateError::InvalidRange(format!("end {e} is before start {s}")).into());
            }
        }
        Ok(NewCourse {
            source: self.source,
            start,
            end,
            start_time: self.start_time,
            end_time: self.end_time,
            course_name: self.course_name,
            target_audience: self.target_audience,
            format: self.format,
        })
    }
}

/// Read, validate and insert every course; returns how many were stored.
pub fn seed_from_reader(
    reader: impl Read,
    store: &dyn RecordStore,
    format: &DayFormat,
) -> anyhow::Result<usize> {
    let imports: Vec<CourseImport> =
        serde_json::from_reader(reader).context("course file is not a JSON array of courses")?;

    let courses = imports
        .into_iter()
        .enumerate()
        .map(|(i, import)| {
            let name = import.course_name.clone();
            import
                .into_new_course(format)
                .with_context(|| format!("course #{i} ({name})"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    for course in &courses {
        let id = store.insert_course(course)?;
        info!(id, name = %course.course_name, "course imported");
    }
    Ok(courses.len())
}
