use thiserror::Error;

use crate::dates::DateError;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Date(#[from] DateError),

    /// Required enrollment fields that were absent or blank, by wire name.
    #[error("Missing required fields in the request body")]
    MissingFields(Vec<&'static str>),
}

impl CalendarError {
    /// Short error code string, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            CalendarError::Config(_) => "CONFIG_ERROR",
            CalendarError::Date(DateError::Parse { .. }) => "DATE_PARSE_ERROR",
            CalendarError::Date(DateError::InvalidRange(_)) => "INVALID_RANGE",
            CalendarError::Date(DateError::Pattern(_)) => "DATE_PATTERN_ERROR",
            CalendarError::MissingFields(_) => "VALIDATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;
