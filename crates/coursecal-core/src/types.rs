use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CalendarError, Result};

/// A course bound that may not be scheduled yet.
///
/// Stored as text; the undetermined literal is configured per deployment
/// (see [`crate::dates::DayFormat`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseDate {
    Determined(NaiveDate),
    Undetermined,
}

impl CourseDate {
    pub fn determined(&self) -> Option<NaiveDate> {
        match self {
            CourseDate::Determined(d) => Some(*d),
            CourseDate::Undetermined => None,
        }
    }

    pub fn is_undetermined(&self) -> bool {
        matches!(self, CourseDate::Undetermined)
    }
}

impl From<NaiveDate> for CourseDate {
    fn from(d: NaiveDate) -> Self {
        CourseDate::Determined(d)
    }
}

/// One scheduled course offering (a row of the `courses` table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub id: i64,
    pub source: String,
    pub start: CourseDate,
    pub end: CourseDate,
    pub start_time: String,
    pub end_time: String,
    pub course_name: String,
    pub target_audience: String,
    pub format: String,
}

/// Where a course sits relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    #[serde(rename = "TBD")]
    Tbd,
    Upcoming,
    Ongoing,
    Completed,
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseStatus::Tbd => write!(f, "TBD"),
            CourseStatus::Upcoming => write!(f, "Upcoming"),
            CourseStatus::Ongoing => write!(f, "Ongoing"),
            CourseStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// A (start, end) pair weighted by how many courses share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCount {
    pub start: CourseDate,
    pub end: CourseDate,
    pub count: u64,
}

impl RangeCount {
    pub fn new(start: impl Into<CourseDate>, end: impl Into<CourseDate>, count: u64) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            count,
        }
    }
}

/// Number of courses running on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: u64,
}

/// Snapshot of a course taken when someone enrols in it.
///
/// The scheduling fields are kept as the text the client sent; enrollment
/// rows are never re-parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub start_program_dates: String,
    #[serde(default)]
    pub end_program_dates: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub format: String,
}

impl EnrollmentRecord {
    /// Wire names of the fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("email", &self.email),
            ("source", &self.source),
            ("startProgramDates", &self.start_program_dates),
            ("endProgramDates", &self.end_program_dates),
            ("startTime", &self.start_time),
            ("endTime", &self.end_time),
            ("courseName", &self.course_name),
            ("targetAudience", &self.target_audience),
            ("format", &self.format),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// All nine fields must be present before the record is persisted.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CalendarError::MissingFields(missing))
        }
    }
}
