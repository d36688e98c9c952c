use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::store::NotificationLog;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    /// How many entries to return, newest first (max 500)
    #[schema(example = 50)]
    pub limit: Option<u32>,
}

/// Recent notification outcomes
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Most recent notification log entries", body = Object, example = json!({
            "notifications": [{
                "run_id": "7c4f3f0e-1f0a-4a57-9d53-2f4b8f6a0c11",
                "kind": "daily_count",
                "recipient_email": "chef@company.com",
                "content": "Dear Chef, ...",
                "office_count": 12,
                "status": "failed",
                "detail": "email gateway credential not configured",
                "created_at": "2024-06-10T09:30:02Z"
            }]
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Notifications"
)]
pub async fn recent_notifications(
    log: web::Data<dyn NotificationLog>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let notifications = log.recent(limit).await.map_err(|e| {
        error!(error = %e, "Failed to read notification log");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "notifications": notifications })))
}
