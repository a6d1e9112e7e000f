use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use coursecal_core::{config::CalendarConfig, DayFormat};
use coursecal_store::RecordStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: CalendarConfig,
    /// Validated from `config.dates` once at startup.
    pub format: DayFormat,
    pub store: Box<dyn RecordStore>,
}

impl AppState {
    pub fn new(config: CalendarConfig, format: DayFormat, store: Box<dyn RecordStore>) -> Self {
        Self {
            config,
            format,
            store,
        }
    }

    /// Today's calendar day in the server's local time zone.
    pub fn today(&self) -> chrono::NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/search-course", get(crate::http::courses::search_course))
        .route("/all-courses", get(crate::http::courses::upcoming_courses))
        .route(
            "/course-details/{course_name}",
            get(crate::http::courses::course_details),
        )
        .route(
            "/courses-count-by-date",
            get(crate::http::courses::courses_count_by_date),
        )
        .route(
            "/all-courses-with-status",
            get(crate::http::courses::courses_with_status),
        )
        .route("/enroll", post(crate::http::enroll::enroll_handler))
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use coursecal_core::CourseDate;
    use coursecal_store::{NewCourse, SqliteStore};
    use serde_json::Value;
    use tower::ServiceExt;

    pub fn day(day: u32, month: u32, year: i32) -> CourseDate {
        CourseDate::Determined(chrono::NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    pub fn course(name: &str, start: CourseDate, end: CourseDate) -> NewCourse {
        NewCourse {
            source: "Internal Academy".into(),
            start,
            end,
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            course_name: name.into(),
            target_audience: "Engineers".into(),
            format: "Virtual".into(),
        }
    }

    /// Router over an in-memory store pre-filled with `courses`.
    pub fn router_with(courses: &[NewCourse]) -> Router {
        let format = DayFormat::default();
        let store = SqliteStore::open_in_memory(format.clone()).unwrap();
        for c in courses {
            store.insert_course(c).unwrap();
        }
        let state = AppState::new(CalendarConfig::default(), format, Box::new(store));
        build_router(Arc::new(state))
    }

    pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
        send(router, Request::get(uri).body(Body::empty()).unwrap()).await
    }
}
