use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::attendance::AttendanceService;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DailyCountQuery {
    /// Day to count (YYYY-MM-DD), today when omitted
    #[schema(example = "2024-06-11")]
    pub date: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DailyCountResponse {
    #[schema(example = "2024-06-11", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = 3)]
    pub office_count: i64,
    #[schema(example = "3 employees will be in office today")]
    pub message: String,
}

/// Office headcount for a day
#[utoipa::path(
    get,
    path = "/api/chef/daily-count",
    params(DailyCountQuery),
    responses(
        (status = 200, description = "Office headcount", body = DailyCountResponse),
        (status = 400, description = "Invalid date format", body = Object, example = json!({
            "error": "Invalid date format: \"11-06-2024\", expected YYYY-MM-DD"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Chef"
)]
pub async fn daily_count(
    service: web::Data<AttendanceService>,
    query: web::Query<DailyCountQuery>,
) -> actix_web::Result<impl Responder> {
    let (date, office_count) = service.office_count(query.date.as_deref()).await?;

    Ok(HttpResponse::Ok().json(DailyCountResponse {
        date,
        office_count,
        message: format!("{office_count} employees will be in office today"),
    }))
}
