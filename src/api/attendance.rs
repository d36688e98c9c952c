use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::attendance::AttendanceService;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::user::UserId;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAttendance {
    #[schema(example = "2024-06-10", format = "date")]
    pub date: String,
    #[schema(example = "office")]
    pub status: AttendanceStatus, // enum ensures Swagger dropdown
}

#[derive(Serialize, ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = "Cutoff time passed. Attendance marked for tomorrow.")]
    pub message: String,
    #[schema(example = "2024-06-11", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = true)]
    pub rolled_over: bool,
    pub status: AttendanceStatus,
    #[schema(example = "2024-06-10T21:45:00Z", value_type = String)]
    pub marked_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// Earliest date to include (YYYY-MM-DD)
    #[schema(example = "2024-06-01")]
    pub start_date: Option<String>,
    /// Latest date to include (YYYY-MM-DD)
    #[schema(example = "2024-06-30")]
    pub end_date: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub attendance: Vec<AttendanceRecord>,
}

/// Mark attendance
#[utoipa::path(
    post,
    path = "/api/attendance/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User marking attendance")
    ),
    request_body = SubmitAttendance,
    responses(
        (status = 200, description = "Attendance marked", body = SubmissionResponse),
        (status = 400, description = "Invalid date, unknown status or weekend date", body = Object, example = json!({
            "error": "Cannot mark attendance on weekends (2024-06-08)"
        })),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(name = "mark_attendance", skip(service, payload), fields(user_id = *path))]
pub async fn mark_attendance(
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
    payload: web::Json<SubmitAttendance>,
) -> actix_web::Result<impl Responder> {
    let user_id = UserId(path.into_inner());
    let payload = payload.into_inner();

    let submission = service
        .submit(user_id, &payload.date, payload.status)
        .await?;

    Ok(HttpResponse::Ok().json(SubmissionResponse {
        message: submission.message.to_string(),
        date: submission.record.date,
        rolled_over: submission.rolled_over,
        status: submission.record.status,
        marked_at: submission.record.marked_at,
    }))
}

/// Attendance history for one user, newest first
#[utoipa::path(
    get,
    path = "/api/attendance/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User whose history to list"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Attendance records", body = HistoryResponse),
        (status = 400, description = "Invalid date format"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn attendance_history(
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = UserId(path.into_inner());

    let attendance = service
        .history(
            user_id,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(HistoryResponse { attendance }))
}
