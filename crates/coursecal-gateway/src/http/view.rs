//! JSON shapes returned by the course endpoints. Field names are the
//! camelCase wire names clients already depend on.

use coursecal_core::dates::format_day;
use coursecal_core::{CourseRecord, CourseStatus, DailyCount, DayFormat};
use serde::Serialize;

const PLACEHOLDER: &str = "NA";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub source: String,
    pub start_program_dates: String,
    pub end_program_dates: String,
    pub start_time: String,
    pub end_time: String,
    pub course_name: String,
    pub target_audience: String,
    pub format: String,
}

impl CourseView {
    pub fn new(course: &CourseRecord, format: &DayFormat) -> Self {
        Self {
            id: Some(course.id),
            source: course.source.clone(),
            start_program_dates: format_day(course.start, format),
            end_program_dates: format_day(course.end, format),
            start_time: course.start_time.clone(),
            end_time: course.end_time.clone(),
            course_name: course.course_name.clone(),
            target_audience: course.target_audience.clone(),
            format: course.format.clone(),
        }
    }

    /// Row returned when a date search finds nothing: every column "NA".
    pub fn placeholder() -> Self {
        Self {
            id: None,
            source: PLACEHOLDER.into(),
            start_program_dates: PLACEHOLDER.into(),
            end_program_dates: PLACEHOLDER.into(),
            start_time: PLACEHOLDER.into(),
            end_time: PLACEHOLDER.into(),
            course_name: PLACEHOLDER.into(),
            target_audience: PLACEHOLDER.into(),
            format: PLACEHOLDER.into(),
        }
    }

    pub fn list<'a>(courses: impl IntoIterator<Item = &'a CourseRecord>, format: &DayFormat) -> Vec<Self> {
        courses.into_iter().map(|c| Self::new(c, format)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseWithStatus {
    #[serde(flatten)]
    pub course: CourseView,
    pub status: CourseStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCountView {
    pub date: String,
    pub course_count: u64,
}

impl DailyCountView {
    pub fn new(count: &DailyCount, format: &DayFormat) -> Self {
        Self {
            date: format_day(count.day.into(), format),
            course_count: count.count,
        }
    }
}
