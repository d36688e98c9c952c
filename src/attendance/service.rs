use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};

use super::cutoff::{self, Resolution};
use crate::clock::Clock;
use crate::error::AttendanceError;
use crate::model::{
    attendance::{AttendanceRecord, AttendanceStatus, DateRange},
    user::UserId,
};
use crate::store::AttendanceStore;

pub const MSG_MARKED: &str = "Attendance marked successfully.";
pub const MSG_ROLLED_OVER: &str = "Cutoff time passed. Attendance marked for tomorrow.";

#[derive(Debug, Clone)]
pub struct Submission {
    pub record: AttendanceRecord,
    pub rolled_over: bool,
    pub message: &'static str,
}

/// The attendance submission path: parse, resolve against the cutoff, upsert.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
    cutoff: NaiveTime,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AttendanceError> {
    let invalid = || AttendanceError::InvalidDateFormat(raw.to_string());
    // chrono skips whitespace ahead of numeric fields
    if raw.starts_with(char::is_whitespace) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AttendanceError> {
    raw.filter(|s| !s.is_empty())
        .map(parse_date)
        .transpose()
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, clock: Arc<dyn Clock>, cutoff: NaiveTime) -> Self {
        Self {
            store,
            clock,
            cutoff,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    pub async fn submit(
        &self,
        user_id: UserId,
        date: &str,
        status: AttendanceStatus,
    ) -> Result<Submission, AttendanceError> {
        let requested = parse_date(date)?;
        let Resolution {
            effective_date,
            rolled_over,
        } = cutoff::resolve(requested, self.clock.now(), self.cutoff)?;

        let record = self.store.upsert(user_id, effective_date, status).await?;

        if rolled_over {
            info!(%user_id, %requested, %effective_date, "Submission after cutoff rolled over");
        } else {
            debug!(%user_id, %effective_date, %status, "Attendance marked");
        }

        Ok(Submission {
            record,
            rolled_over,
            message: if rolled_over {
                MSG_ROLLED_OVER
            } else {
                MSG_MARKED
            },
        })
    }

    pub async fn history(
        &self,
        user_id: UserId,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let range = DateRange {
            start: parse_optional_date(start_date)?,
            end: parse_optional_date(end_date)?,
        };
        Ok(self.store.query(user_id, range).await?)
    }

    /// Office headcount for `date`, or for today when absent.
    pub async fn office_count(
        &self,
        date: Option<&str>,
    ) -> Result<(NaiveDate, i64), AttendanceError> {
        let date = parse_optional_date(date)?.unwrap_or_else(|| self.today());
        let count = self
            .store
            .count_by_status(date, AttendanceStatus::Office)
            .await?;
        Ok((date, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::{ManualClock, at};
    use crate::store::memory::MemoryStore;
    use std::sync::atomic::Ordering;

    fn service(now: &str) -> (AttendanceService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let clock = Arc::new(ManualClock::new(at(&now[..10], &now[11..])));
        let svc = AttendanceService::new(
            store.clone(),
            clock,
            NaiveTime::from_hms_opt(21, 30, 0).unwrap(),
        );
        (svc, store)
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn late_monday_submission_lands_on_tuesday() {
        let (svc, store) = service("2024-06-10 21:45:00");

        let sub = svc
            .submit(UserId(1), "2024-06-10", AttendanceStatus::Office)
            .await
            .unwrap();

        assert!(sub.rolled_over);
        assert_eq!(sub.message, MSG_ROLLED_OVER);
        assert_eq!(sub.record.date, d("2024-06-11"));
        assert_eq!(sub.record.status, AttendanceStatus::Office);
        assert_eq!(
            store
                .count_by_status(d("2024-06-10"), AttendanceStatus::Office)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn on_time_submission_keeps_the_date() {
        let (svc, _) = service("2024-06-10 09:00:00");
        let sub = svc
            .submit(UserId(1), "2024-06-10", AttendanceStatus::Home)
            .await
            .unwrap();
        assert!(!sub.rolled_over);
        assert_eq!(sub.message, MSG_MARKED);
        assert_eq!(sub.record.date, d("2024-06-10"));
    }

    #[tokio::test]
    async fn rejections_write_nothing() {
        let (svc, store) = service("2024-06-10 09:00:00");

        let err = svc
            .submit(UserId(1), "2024-06-08", AttendanceStatus::Office)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::WeekendRejected(_)));

        let err = svc
            .submit(UserId(1), "10/06/2024", AttendanceStatus::Office)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidDateFormat(ref s) if s == "10/06/2024"));

        for padded in [" 2024-06-10", "2024-06-10 "] {
            let err = svc
                .submit(UserId(1), padded, AttendanceStatus::Office)
                .await
                .unwrap_err();
            assert!(matches!(err, AttendanceError::InvalidDateFormat(ref s) if s == padded));
        }

        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn resubmission_overwrites_in_place() {
        let (svc, store) = service("2024-06-10 09:00:00");

        let first = svc
            .submit(UserId(5), "2024-06-12", AttendanceStatus::Office)
            .await
            .unwrap();
        let second = svc
            .submit(UserId(5), "2024-06-12", AttendanceStatus::Office)
            .await
            .unwrap();
        let third = svc
            .submit(UserId(5), "2024-06-12", AttendanceStatus::Leave)
            .await
            .unwrap();

        assert_eq!(store.record_count(), 1);
        assert_eq!(first.record.id, third.record.id);
        assert!(second.record.marked_at >= first.record.marked_at);
        assert!(third.record.marked_at >= second.record.marked_at);
        assert_eq!(third.record.status, AttendanceStatus::Leave);
    }

    #[tokio::test]
    async fn office_count_counts_only_office() {
        let (svc, _) = service("2024-06-10 09:00:00");
        for (user, status) in [
            (1, AttendanceStatus::Office),
            (2, AttendanceStatus::Office),
            (3, AttendanceStatus::Office),
            (4, AttendanceStatus::Home),
        ] {
            svc.submit(UserId(user), "2024-06-11", status)
                .await
                .unwrap();
        }

        let (date, count) = svc.office_count(Some("2024-06-11")).await.unwrap();
        assert_eq!(date, d("2024-06-11"));
        assert_eq!(count, 3);

        let (date, count) = svc.office_count(None).await.unwrap();
        assert_eq!(date, d("2024-06-10"));
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_respects_range() {
        let (svc, _) = service("2024-06-10 09:00:00");
        for day in ["2024-06-04", "2024-06-12", "2024-06-06", "2024-06-10"] {
            svc.submit(UserId(9), day, AttendanceStatus::Home)
                .await
                .unwrap();
        }
        svc.submit(UserId(10), "2024-06-05", AttendanceStatus::Office)
            .await
            .unwrap();

        let all = svc.history(UserId(9), None, None).await.unwrap();
        let dates: Vec<_> = all.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2024-06-12", "2024-06-10", "2024-06-06", "2024-06-04"]);

        let some = svc
            .history(UserId(9), Some("2024-06-05"), Some("2024-06-10"))
            .await
            .unwrap();
        assert_eq!(some.len(), 2);

        assert!(matches!(
            svc.history(UserId(9), Some("june"), None).await,
            Err(AttendanceError::InvalidDateFormat(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_same_key_writes_leave_one_record() {
        let (svc, store) = service("2024-06-10 09:00:00");
        let statuses = [
            AttendanceStatus::Office,
            AttendanceStatus::Home,
            AttendanceStatus::Leave,
        ];

        let handles: Vec<_> = (0..30)
            .map(|i| {
                let svc = svc.clone();
                let status = statuses[i % 3];
                tokio::spawn(async move { svc.submit(UserId(1), "2024-06-13", status).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let records = svc.history(UserId(1), None, None).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(statuses.contains(&records[0].status));
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_persistence_failure() {
        let (svc, store) = service("2024-06-10 09:00:00");
        store.unavailable.store(true, Ordering::SeqCst);

        let err = svc
            .submit(UserId(1), "2024-06-10", AttendanceStatus::Office)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Persistence(_)));
    }
}
