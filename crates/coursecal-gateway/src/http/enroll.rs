//! Enrollment endpoint — POST /enroll
//!
//! Request:  the nine enrollment fields in camelCase, all non-empty.
//! Response: `{"message": "Enrollment data added successfully", "insertId": 1}`
//! Error:    `{"error": "..."}`

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use coursecal_core::EnrollmentRecord;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollReply {
    pub message: String,
    pub insert_id: i64,
}

/// POST /enroll — store a snapshot of the course a user signed up for.
pub async fn enroll_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EnrollmentRecord>, JsonRejection>,
) -> Result<Json<EnrollReply>, ApiError> {
    let Json(enrollment) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "POST /enroll: unreadable body");
        ApiError::BadRequest(rejection.body_text())
    })?;

    enrollment.validate()?;
    let insert_id = state.store.insert_enrollment(&enrollment)?;
    info!(insert_id, course = %enrollment.course_name, "enrollment added");

    Ok(Json(EnrollReply {
        message: "Enrollment data added successfully".to_string(),
        insert_id,
    }))
}
