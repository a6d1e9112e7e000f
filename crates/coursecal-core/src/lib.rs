//! `coursecal-core` — shared configuration, error and domain types for the
//! course calendar service, plus the pure date-range engine in [`dates`].

pub mod config;
pub mod dates;
pub mod error;
pub mod types;

pub use dates::{DailyOrder, DateError, DayFormat};
pub use error::{CalendarError, Result};
pub use types::{CourseDate, CourseRecord, CourseStatus, DailyCount, EnrollmentRecord, RangeCount};
