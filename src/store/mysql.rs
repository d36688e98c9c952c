use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::TryStreamExt;
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder};
use tracing::debug;

use super::{AttendanceStore, NotificationLog, UserDirectory};
use crate::error::{StoreError, StoreResult};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus, DateRange},
    notification::NotificationLogEntry,
    role::Role,
    user::{User, UserId},
};

/// All three persistence seams over one MySQL pool. Each call holds a pooled
/// connection (or transaction) only for its own duration.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    user_id: u64,
    date: NaiveDate,
    status: String,
    marked_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct UserRow {
    id: u64,
    email: String,
    name: String,
    role: String,
    is_active: bool,
}

#[derive(FromRow)]
struct NotificationRow {
    run_id: String,
    #[sqlx(rename = "type")]
    kind: String,
    recipient_email: String,
    content: String,
    office_count: i64,
    status: String,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

fn decode<T: FromStr>(column: &'static str, value: String) -> StoreResult<T> {
    value
        .parse()
        .map_err(|_| StoreError::Decode { column, value })
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> StoreResult<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            user_id: UserId(row.user_id),
            date: row.date,
            status: decode("status", row.status)?,
            marked_at: row.marked_at,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(User {
            id: UserId(row.id),
            email: row.email,
            name: row.name,
            role: decode("role", row.role)?,
            is_active: row.is_active,
        })
    }
}

impl TryFrom<NotificationRow> for NotificationLogEntry {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> StoreResult<Self> {
        Ok(NotificationLogEntry {
            run_id: row.run_id,
            kind: decode("type", row.kind)?,
            recipient_email: row.recipient_email,
            content: row.content,
            office_count: row.office_count,
            status: decode("status", row.status)?,
            detail: row.detail,
            created_at: row.created_at,
        })
    }
}

const ATTENDANCE_COLUMNS: &str = "SELECT id, user_id, date, status, marked_at FROM attendance";

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn upsert(
        &self,
        user_id: UserId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> StoreResult<AttendanceRecord> {
        // The unique key on (user_id, date) serializes writers to the same
        // row; the read-back sees whichever write committed last.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO attendance (user_id, date, status, marked_at)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                status = VALUES(status),
                marked_at = GREATEST(marked_at, VALUES(marked_at))
            "#,
        )
        .bind(user_id.0)
        .bind(date)
        .bind(status.as_ref())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{ATTENDANCE_COLUMNS} WHERE user_id = ? AND date = ?"
        ))
        .bind(user_id.0)
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(%user_id, %date, %status, "Attendance upserted");
        row.try_into()
    }

    async fn query(&self, user_id: UserId, range: DateRange) -> StoreResult<Vec<AttendanceRecord>> {
        let mut conn = self.pool.acquire().await?;

        let mut builder = QueryBuilder::<MySql>::new(ATTENDANCE_COLUMNS);
        builder.push(" WHERE user_id = ").push_bind(user_id.0);
        if let Some(start) = range.start {
            builder.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = range.end {
            builder.push(" AND date <= ").push_bind(end);
        }
        builder.push(" ORDER BY date DESC");

        builder
            .build_query_as::<AttendanceRow>()
            .fetch(&mut *conn)
            .map_err(StoreError::from)
            .and_then(|row| futures::future::ready(AttendanceRecord::try_from(row)))
            .try_collect()
            .await
    }

    async fn count_by_status(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64> {
        let mut conn = self.pool.acquire().await?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance WHERE date = ? AND status = ?",
        )
        .bind(date)
        .bind(status.as_ref())
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl UserDirectory for MySqlStore {
    async fn active_users_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role, is_active
            FROM users
            WHERE role = ? AND is_active = 1
            ORDER BY id
            "#,
        )
        .bind(role.as_ref())
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[async_trait]
impl NotificationLog for MySqlStore {
    async fn append(&self, entry: &NotificationLogEntry) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            INSERT INTO notifications
                (run_id, type, recipient_email, content, office_count, status, detail, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.run_id)
        .bind(entry.kind.as_ref())
        .bind(&entry.recipient_email)
        .bind(&entry.content)
        .bind(entry.office_count)
        .bind(entry.status.as_ref())
        .bind(entry.detail.as_deref())
        .bind(entry.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: u32) -> StoreResult<Vec<NotificationLogEntry>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT run_id, type, recipient_email, content, office_count, status, detail, created_at
            FROM notifications
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(NotificationLogEntry::try_from).collect()
    }
}
