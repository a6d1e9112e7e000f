use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use coursecal_core::dates::{format_day, parse_day};
use coursecal_core::{CourseDate, CourseRecord, DayFormat, EnrollmentRecord, RangeCount};
use rusqlite::Connection;
use tracing::{debug, info, instrument};

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::store::{NewCourse, RecordStore};

const COURSE_COLUMNS: &str = "id, source, start_program_dates, end_program_dates,
     start_time, end_time, course_name, target_audience, format";

/// SQLite-backed [`RecordStore`].
///
/// Wraps a single connection in a `Mutex`; dates are stored as text in the
/// configured [`DayFormat`] and parsed on the way out.
pub struct SqliteStore {
    db: Mutex<Connection>,
    format: DayFormat,
}

/// Raw column values of one `courses` row, before date parsing.
struct CourseRow {
    id: i64,
    source: String,
    start: String,
    end: String,
    start_time: String,
    end_time: String,
    course_name: String,
    target_audience: String,
    format: String,
}

impl SqliteStore {
    /// Wrap an open connection, creating the schema if needed.
    pub fn new(conn: Connection, format: DayFormat) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
            format,
        })
    }

    /// Open (or create) the database file at `path` with WAL enabled.
    pub fn open(path: &str, format: DayFormat) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!(path, "opened course database");
        Self::new(conn, format)
    }

    /// A throwaway database, used by tests and dry runs.
    pub fn open_in_memory(format: DayFormat) -> Result<Self> {
        Self::new(Connection::open_in_memory()?, format)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn parse_column(&self, text: &str, context: impl FnOnce() -> String) -> Result<CourseDate> {
        parse_day(text, &self.format).map_err(|source| StoreError::MalformedDate {
            context: context(),
            source,
        })
    }

    fn record_from_row(&self, row: CourseRow) -> Result<CourseRecord> {
        let id = row.id;
        let start = self.parse_column(&row.start, || format!("course {id} start"))?;
        let end = self.parse_column(&row.end, || format!("course {id} end"))?;
        ensure_ordered(start, end, || format!("course {id}"))?;
        Ok(CourseRecord {
            id,
            source: row.source,
            start,
            end,
            start_time: row.start_time,
            end_time: row.end_time,
            course_name: row.course_name,
            target_audience: row.target_audience,
            format: row.format,
        })
    }

    fn query_courses(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<CourseRecord>> {
        let rows = {
            let db = self.conn()?;
            let mut stmt = db.prepare(sql)?;
            let rows = stmt.query_map(params, row_to_course)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        rows.into_iter().map(|row| self.record_from_row(row)).collect()
    }
}

/// Reject a row whose determined end falls before its determined start.
fn ensure_ordered(
    start: CourseDate,
    end: CourseDate,
    context: impl FnOnce() -> String,
) -> Result<()> {
    match (start.determined(), end.determined()) {
        (Some(start), Some(end)) if end < start => Err(StoreError::ReversedRange {
            context: context(),
            start,
            end,
        }),
        _ => Ok(()),
    }
}

/// Map a SELECT row (column order from `COURSE_COLUMNS`) to raw values.
fn row_to_course(row: &rusqlite::Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        id: row.get(0)?,
        source: row.get(1)?,
        start: row.get(2)?,
        end: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        course_name: row.get(6)?,
        target_audience: row.get(7)?,
        format: row.get(8)?,
    })
}

impl RecordStore for SqliteStore {
    #[instrument(skip(self))]
    fn fetch_all_courses(&self) -> Result<Vec<CourseRecord>> {
        self.query_courses(
            &format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY id"),
            [],
        )
    }

    #[instrument(skip(self))]
    fn fetch_all_courses_by_start(&self) -> Result<Vec<CourseRecord>> {
        let mut courses = self.fetch_all_courses()?;
        // Option ordering puts None (undetermined) first; the sort is stable
        // so ties keep id order.
        courses.sort_by_key(|c| c.start.determined());
        Ok(courses)
    }

    #[instrument(skip(self))]
    fn fetch_courses_by_name(&self, name: &str) -> Result<Vec<CourseRecord>> {
        self.query_courses(
            &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_name = ?1 ORDER BY id"),
            [name],
        )
    }

    #[instrument(skip(self))]
    fn fetch_courses_from_date(&self, date: NaiveDate) -> Result<Vec<CourseRecord>> {
        let mut courses: Vec<CourseRecord> = self
            .fetch_all_courses()?
            .into_iter()
            .filter(|c| c.start.determined().is_some_and(|start| start >= date))
            .collect();
        courses.sort_by_key(|c| c.start.determined());
        debug!(count = courses.len(), "courses starting on or after date");
        Ok(courses)
    }

    #[instrument(skip(self))]
    fn fetch_course_counts_grouped_by_range(&self) -> Result<Vec<RangeCount>> {
        let groups = {
            let db = self.conn()?;
            let mut stmt = db.prepare(
                "SELECT start_program_dates, end_program_dates, COUNT(*)
                 FROM courses
                 GROUP BY start_program_dates, end_program_dates
                 ORDER BY MIN(id)",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        groups
            .into_iter()
            .map(|(start, end, count)| -> Result<RangeCount> {
                let context = || format!("range {start}..{end}");
                let range = RangeCount {
                    start: self.parse_column(&start, context)?,
                    end: self.parse_column(&end, context)?,
                    count: count.max(0) as u64,
                };
                ensure_ordered(range.start, range.end, context)?;
                Ok(range)
            })
            .collect()
    }

    #[instrument(skip(self, enrollment), fields(course = %enrollment.course_name))]
    fn insert_enrollment(&self, enrollment: &EnrollmentRecord) -> Result<i64> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.conn()?;
        db.execute(
            "INSERT INTO enrollments
             (email, source, start_program_dates, end_program_dates, start_time,
              end_time, course_name, target_audience, format, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                enrollment.email,
                enrollment.source,
                enrollment.start_program_dates,
                enrollment.end_program_dates,
                enrollment.start_time,
                enrollment.end_time,
                enrollment.course_name,
                enrollment.target_audience,
                enrollment.format,
                now
            ],
        )?;
        let id = db.last_insert_rowid();
        info!(enrollment_id = id, "enrollment stored");
        Ok(id)
    }

    #[instrument(skip(self, course), fields(course = %course.course_name))]
    fn insert_course(&self, course: &NewCourse) -> Result<i64> {
        let start = format_day(course.start, &self.format);
        let end = format_day(course.end, &self.format);
        let db = self.conn()?;
        db.execute(
            "INSERT INTO courses
             (source, start_program_dates, end_program_dates, start_time,
              end_time, course_name, target_audience, format)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                course.source,
                start,
                end,
                course.start_time,
                course.end_time,
                course.course_name,
                course.target_audience,
                course.format
            ],
        )?;
        Ok(db.last_insert_rowid())
    }
}
