use chrono::NaiveDate;
use coursecal_core::{CourseDate, CourseRecord, EnrollmentRecord, RangeCount};

use crate::error::Result;

/// A course about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub source: String,
    pub start: CourseDate,
    pub end: CourseDate,
    pub start_time: String,
    pub end_time: String,
    pub course_name: String,
    pub target_audience: String,
    pub format: String,
}

/// Query surface over the course and enrollment tables.
///
/// Implementations own their own locking; every method may be called
/// concurrently from request handlers.
pub trait RecordStore: Send + Sync {
    /// Every course, in insertion order.
    fn fetch_all_courses(&self) -> Result<Vec<CourseRecord>>;

    /// Every course ordered by start date, undetermined starts first.
    fn fetch_all_courses_by_start(&self) -> Result<Vec<CourseRecord>>;

    /// Courses whose name matches exactly.
    fn fetch_courses_by_name(&self, name: &str) -> Result<Vec<CourseRecord>>;

    /// Courses starting on or after `date`, ascending by start.
    /// Courses with an undetermined start are never included.
    fn fetch_courses_from_date(&self, date: NaiveDate) -> Result<Vec<CourseRecord>>;

    /// Number of courses per distinct (start, end) pair.
    fn fetch_course_counts_grouped_by_range(&self) -> Result<Vec<RangeCount>>;

    /// Persist an enrollment and return its generated id.
    fn insert_enrollment(&self, enrollment: &EnrollmentRecord) -> Result<i64>;

    /// Persist a course and return its generated id.
    fn insert_course(&self, course: &NewCourse) -> Result<i64>;
}
