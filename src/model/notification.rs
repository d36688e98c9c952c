use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, AsRefStr, Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    DailyCount,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, AsRefStr, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationStatus {
    Sent,
    Failed,
}

/// One send attempt to one recipient within one dispatch run. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "run_id": "7c4f3f0e-1f0a-4a57-9d53-2f4b8f6a0c11",
    "kind": "daily_count",
    "recipient_email": "chef@company.com",
    "content": "Dear Chef, ...",
    "office_count": 12,
    "status": "sent",
    "detail": null,
    "created_at": "2024-06-10T09:30:02Z"
}))]
pub struct NotificationLogEntry {
    pub run_id: String,
    pub kind: NotificationKind,
    #[schema(example = "chef@company.com")]
    pub recipient_email: String,
    pub content: String,
    #[schema(example = 12)]
    pub office_count: i64,
    pub status: NotificationStatus,
    /// Why the send failed, when it did.
    #[schema(nullable = true)]
    pub detail: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}
