//! Persistence seams used by the attendance path and the dispatcher.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreResult;
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus, DateRange},
    notification::NotificationLogEntry,
    role::Role,
    user::{User, UserId},
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Create or overwrite the record for `(user_id, date)`. The returned
    /// record is the committed state; `marked_at` never goes backwards.
    async fn upsert(
        &self,
        user_id: UserId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> StoreResult<AttendanceRecord>;

    /// Records for one user, newest date first.
    async fn query(&self, user_id: UserId, range: DateRange) -> StoreResult<Vec<AttendanceRecord>>;

    async fn count_by_status(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn active_users_by_role(&self, role: Role) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait NotificationLog: Send + Sync {
    async fn append(&self, entry: &NotificationLogEntry) -> StoreResult<()>;

    async fn recent(&self, limit: u32) -> StoreResult<Vec<NotificationLogEntry>>;
}
