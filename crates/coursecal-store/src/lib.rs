//! `coursecal-store` — persistence for course and enrollment records.
//!
//! The [`RecordStore`] trait is the query surface the HTTP layer depends on;
//! [`SqliteStore`] implements it over a single SQLite connection.

pub mod db;
pub mod error;
pub mod sqlite;
pub mod store;

pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;
pub use store::{NewCourse, RecordStore};
