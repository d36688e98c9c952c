use crate::api::attendance::{HistoryQuery, HistoryResponse, SubmissionResponse, SubmitAttendance};
use crate::api::chef::{DailyCountQuery, DailyCountResponse};
use crate::api::notification::NotificationQuery;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::notification::{NotificationKind, NotificationLogEntry, NotificationStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lunch Manager API",
        version = "1.0.0",
        description = r#"
## Lunch Manager

Employees declare where they work each business day; the kitchen gets the office headcount
by email every business morning.

### 🔹 Key Features
- **Attendance**
  - Mark `office`, `home` or `leave` for a date; same-day submissions after the cutoff move to the next day
  - Weekend dates are rejected
- **Chef**
  - Office headcount for any day
- **Notifications**
  - Outcome of every daily email, one entry per chef per run

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::mark_attendance,
        crate::api::attendance::attendance_history,

        crate::api::chef::daily_count,

        crate::api::notification::recent_notifications
    ),
    components(
        schemas(
            SubmitAttendance,
            SubmissionResponse,
            HistoryQuery,
            HistoryResponse,
            AttendanceRecord,
            AttendanceStatus,
            DailyCountQuery,
            DailyCountResponse,
            NotificationQuery,
            NotificationLogEntry,
            NotificationKind,
            NotificationStatus
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance submission and history"),
        (name = "Chef", description = "Kitchen headcount"),
        (name = "Notifications", description = "Daily notification log"),
    )
)]
pub struct ApiDoc;
