use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

/// PersistenceFailure. The store never retries; callers decide.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected value {value:?} in column `{column}`")]
    Decode { column: &'static str, value: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures returned to whoever submitted or queried attendance.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Invalid date format: {0:?}, expected YYYY-MM-DD")]
    InvalidDateFormat(String),
    #[error("Cannot mark attendance on weekends ({0})")]
    WeekendRejected(NaiveDate),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::InvalidDateFormat(_) | AttendanceError::WeekendRejected(_) => {
                StatusCode::BAD_REQUEST
            }
            AttendanceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AttendanceError::Persistence(e) => {
                tracing::error!(error = %e, "Attendance persistence failed");
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal Server Error"
                }))
            }
            _ => HttpResponse::build(self.status_code()).json(json!({
                "error": self.to_string()
            })),
        }
    }
}
