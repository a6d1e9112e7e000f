use rusqlite::Connection;

use crate::error::Result;

/// Initialise the courses and enrollments tables.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS courses (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            source              TEXT NOT NULL,
            start_program_dates TEXT NOT NULL,   -- day text or the undetermined marker
            end_program_dates   TEXT NOT NULL,
            start_time          TEXT NOT NULL,
            end_time            TEXT NOT NULL,
            course_name         TEXT NOT NULL,
            target_audience     TEXT NOT NULL,
            format              TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_courses_name ON courses (course_name);

        CREATE TABLE IF NOT EXISTS enrollments (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            email               TEXT NOT NULL CHECK (length(trim(email)) > 0),
            source              TEXT NOT NULL CHECK (length(trim(source)) > 0),
            start_program_dates TEXT NOT NULL CHECK (length(trim(start_program_dates)) > 0),
            end_program_dates   TEXT NOT NULL CHECK (length(trim(end_program_dates)) > 0),
            start_time          TEXT NOT NULL CHECK (length(trim(start_time)) > 0),
            end_time            TEXT NOT NULL CHECK (length(trim(end_time)) > 0),
            course_name         TEXT NOT NULL CHECK (length(trim(course_name)) > 0),
            target_audience     TEXT NOT NULL CHECK (length(trim(target_audience)) > 0),
            format              TEXT NOT NULL CHECK (length(trim(format)) > 0),
            created_at          TEXT NOT NULL
        );",
    )?;
    Ok(())
}
