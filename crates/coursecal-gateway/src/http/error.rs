use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coursecal_core::{CalendarError, DateError};
use coursecal_store::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of a request handler, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Details are logged at the conversion site and never sent to clients.
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "record store failure");
        ApiError::Internal
    }
}

impl From<DateError> for ApiError {
    fn from(e: DateError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<CalendarError> for ApiError {
    fn from(e: CalendarError) -> Self {
        match e {
            CalendarError::Date(e) => e.into(),
            CalendarError::MissingFields(fields) => {
                warn!(?fields, "request is missing required fields");
                ApiError::BadRequest(CalendarError::MissingFields(fields).to_string())
            }
            other => {
                error!(error = %other, code = other.code(), "request failed");
                ApiError::Internal
            }
        }
    }
}
