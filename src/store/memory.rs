use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{AttendanceStore, NotificationLog, UserDirectory};
use crate::error::{StoreError, StoreResult};
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus, DateRange},
    notification::NotificationLogEntry,
    role::Role,
    user::{User, UserId},
};

/// In-process store for tests. One mutex per table keeps same-key writes
/// serialized the same way the unique index does in MySQL.
#[derive(Default)]
pub struct MemoryStore {
    attendance: Mutex<BTreeMap<(UserId, NaiveDate), AttendanceRecord>>,
    users: Mutex<Vec<User>>,
    notifications: Mutex<Vec<NotificationLogEntry>>,
    next_id: AtomicUsize,
    pub unavailable: AtomicBool,
    /// Appends beyond this many fail with `Unavailable`.
    pub log_capacity: Mutex<Option<usize>>,
    pub count_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::default();
        *store.users.lock().unwrap() = users;
        store
    }

    pub fn logged(&self) -> Vec<NotificationLogEntry> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn record_count(&self) -> usize {
        self.attendance.lock().unwrap().len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

pub fn user(id: u64, role: Role, active: bool) -> User {
    User {
        id: UserId(id),
        email: format!("user{id}@company.com"),
        name: format!("User {id}"),
        role,
        is_active: active,
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn upsert(
        &self,
        user_id: UserId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> StoreResult<AttendanceRecord> {
        self.check_available()?;
        let now = Utc::now();
        let mut table = self.attendance.lock().unwrap();
        let record = table
            .entry((user_id, date))
            .and_modify(|r| {
                r.status = status;
                r.marked_at = r.marked_at.max(now);
            })
            .or_insert_with(|| AttendanceRecord {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) as u64 + 1,
                user_id,
                date,
                status,
                marked_at: now,
            });
        Ok(record.clone())
    }

    async fn query(&self, user_id: UserId, range: DateRange) -> StoreResult<Vec<AttendanceRecord>> {
        self.check_available()?;
        let table = self.attendance.lock().unwrap();
        let mut records: Vec<_> = table
            .values()
            .filter(|r| r.user_id == user_id && range.contains(r.date))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn count_by_status(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let table = self.attendance.lock().unwrap();
        Ok(table
            .values()
            .filter(|r| r.date == date && r.status == status)
            .count() as i64)
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn active_users_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role == role && u.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationLog for MemoryStore {
    async fn append(&self, entry: &NotificationLogEntry) -> StoreResult<()> {
        self.check_available()?;
        let mut log = self.notifications.lock().unwrap();
        if let Some(capacity) = *self.log_capacity.lock().unwrap() {
            if log.len() >= capacity {
                return Err(StoreError::Unavailable("notification log full".into()));
            }
        }
        log.push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: u32) -> StoreResult<Vec<NotificationLogEntry>> {
        self.check_available()?;
        let log = self.notifications.lock().unwrap();
        Ok(log.iter().rev().take(limit as usize).cloned().collect())
    }
}
