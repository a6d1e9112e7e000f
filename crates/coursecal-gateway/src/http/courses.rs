//! Read-only course endpoints.
//!
//! Each handler fetches rows from the record store and hands them to the
//! date engine; an empty result is a 404 with an explanatory message.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coursecal_core::dates::{classify_status, expand_daily_counts, find_active_on, parse_day};
use coursecal_core::CourseDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::error::ApiError;
use super::view::{CourseView, CourseWithStatus, DailyCountView};
use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub date: Option<String>,
}

/// GET /search-course?date=DD/MM/YYYY — courses running on the given day.
pub async fn search_course(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let raw = query
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Date parameter is missing".to_string()))?;

    let date = match parse_day(&raw, &state.format)? {
        CourseDate::Determined(date) => date,
        CourseDate::Undetermined => {
            return Err(ApiError::BadRequest(format!(
                "search date must be a calendar day, not {raw:?}"
            )))
        }
    };

    let courses = state.store.fetch_all_courses()?;
    let active = find_active_on(date, &courses)?;
    debug!(%date, matched = active.len(), "course search");

    if active.is_empty() {
        return Ok((StatusCode::NOT_FOUND, Json(CourseView::placeholder())).into_response());
    }
    Ok(Json(CourseView::list(active, &state.format)).into_response())
}

/// GET /all-courses — courses starting today or later, soonest first.
pub async fn upcoming_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseView>>, ApiError> {
    let courses = state.store.fetch_courses_from_date(state.today())?;
    if courses.is_empty() {
        return Err(ApiError::NotFound(
            "No courses found starting from the current date".to_string(),
        ));
    }
    Ok(Json(CourseView::list(&courses, &state.format)))
}

/// GET /course-details/{course_name} — every offering with that exact name.
pub async fn course_details(
    State(state): State<Arc<AppState>>,
    Path(course_name): Path<String>,
) -> Result<Json<Vec<CourseView>>, ApiError> {
    if course_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Course name parameter is missing".to_string(),
        ));
    }
    let courses = state.store.fetch_courses_by_name(&course_name)?;
    if courses.is_empty() {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }
    Ok(Json(CourseView::list(&courses, &state.format)))
}

/// GET /courses-count-by-date — number of courses running on each day.
pub async fn courses_count_by_date(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DailyCountView>>, ApiError> {
    let ranges = state.store.fetch_course_counts_grouped_by_range()?;
    if ranges.is_empty() {
        return Err(ApiError::NotFound("No courses found".to_string()));
    }

    let skipped = ranges
        .iter()
        .filter(|r| r.start.is_undetermined() || r.end.is_undetermined())
        .count();
    if skipped > 0 {
        debug!(skipped, "ranges with an undetermined bound left out of daily counts");
    }

    let counts = expand_daily_counts(&ranges, state.config.dates.daily_order)?;
    Ok(Json(
        counts
            .iter()
            .map(|c| DailyCountView::new(c, &state.format))
            .collect(),
    ))
}

/// GET /all-courses-with-status — every course, ordered by start, with its
/// status relative to today.
pub async fn courses_with_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseWithStatus>>, ApiError> {
    let courses = state.store.fetch_all_courses_by_start()?;
    if courses.is_empty() {
        return Err(ApiError::NotFound(
            "No courses found in the database".to_string(),
        ));
    }

    let today = state.today();
    Ok(Json(
        courses
            .iter()
            .map(|c| CourseWithStatus {
                course: CourseView::new(c, &state.format),
                status: classify_status(today, c.start, c.end),
            })
            .collect(),
    ))
}
