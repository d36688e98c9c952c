use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use futures::future::join_all;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::gateway::{EmailGateway, GatewayError};
use super::scheduler::ScheduledJob;
use crate::attendance::cutoff::is_weekend;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::model::{
    attendance::AttendanceStatus,
    notification::{NotificationKind, NotificationLogEntry, NotificationStatus},
    role::Role,
};
use crate::store::{AttendanceStore, NotificationLog, UserDirectory};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("could not count office attendance: {0}")]
    Count(#[source] StoreError),
    #[error("could not resolve recipients: {0}")]
    Recipients(#[source] StoreError),
}

/// Sends the daily office headcount to every active chef.
pub struct NotificationDispatcher {
    attendance: Arc<dyn AttendanceStore>,
    directory: Arc<dyn UserDirectory>,
    log: Arc<dyn NotificationLog>,
    gateway: Arc<dyn EmailGateway>,
    clock: Arc<dyn Clock>,
    send_timeout: Duration,
}

pub fn subject(date: NaiveDate) -> String {
    format!("Daily Lunch Count - {}", date.format("%B %d, %Y"))
}

pub fn body(date: NaiveDate, office_count: i64, sent_at: NaiveDateTime) -> String {
    format!(
        "Dear Chef,\n\n\
         Today's office attendance count: {office_count} employees\n\n\
         Please prepare lunch accordingly.\n\n\
         Date: {}\n\
         Time: {}\n\n\
         Best regards,\n\
         Lunch Management System\n",
        date.format("%B %d, %Y"),
        sent_at.format("%I:%M %p"),
    )
}

impl NotificationDispatcher {
    pub fn new(
        attendance: Arc<dyn AttendanceStore>,
        directory: Arc<dyn UserDirectory>,
        log: Arc<dyn NotificationLog>,
        gateway: Arc<dyn EmailGateway>,
        clock: Arc<dyn Clock>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            attendance,
            directory,
            log,
            gateway,
            clock,
            send_timeout,
        }
    }

    /// One dispatch run for `trigger_date`. Every recipient gets exactly one
    /// log entry, sent or failed; one recipient's failure never stops the
    /// others.
    #[instrument(name = "dispatch_run", skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn dispatch(
        &self,
        trigger_date: NaiveDate,
    ) -> Result<Vec<NotificationLogEntry>, DispatchError> {
        if is_weekend(trigger_date) {
            info!(%trigger_date, "Skipping chef notification - weekend");
            return Ok(Vec::new());
        }

        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let office_count = self
            .attendance
            .count_by_status(trigger_date, AttendanceStatus::Office)
            .await
            .map_err(DispatchError::Count)?;

        let chefs = self
            .directory
            .active_users_by_role(Role::Chef)
            .await
            .map_err(DispatchError::Recipients)?;

        if chefs.is_empty() {
            warn!("No active chefs found for notification");
            return Ok(Vec::new());
        }

        let subject = subject(trigger_date);
        let content = body(trigger_date, office_count, self.clock.now());

        let credential = self.gateway.has_credential();
        if !credential {
            warn!(
                recipients = chefs.len(),
                "Email gateway credential not configured, all sends in this run will fail"
            );
        }

        let run_id = run_id.as_str();
        let attempts = chefs.iter().map(|chef| {
            let subject = subject.as_str();
            let content = content.as_str();
            async move {
                let outcome = if credential {
                    self.send_one(&chef.email, subject, content).await
                } else {
                    Err(GatewayError::MissingCredential)
                };
                if let (true, Err(e)) = (credential, &outcome) {
                    error!(recipient = %chef.email, name = %chef.name, error = %e, "Chef notification failed");
                }
                NotificationLogEntry {
                    run_id: run_id.to_string(),
                    kind: NotificationKind::DailyCount,
                    recipient_email: chef.email.clone(),
                    content: content.to_string(),
                    office_count,
                    status: if outcome.is_ok() {
                        NotificationStatus::Sent
                    } else {
                        NotificationStatus::Failed
                    },
                    detail: outcome.err().map(|e| e.to_string()),
                    created_at: Utc::now(),
                }
            }
        });
        let entries = join_all(attempts).await;

        self.persist(&entries).await;

        let sent = entries
            .iter()
            .filter(|e| e.status == NotificationStatus::Sent)
            .count();
        info!(
            office_count,
            sent,
            failed = entries.len() - sent,
            "Chef notifications dispatched"
        );

        Ok(entries)
    }

    async fn send_one(&self, to: &str, subject: &str, body: &str) -> Result<(), GatewayError> {
        match tokio::time::timeout(self.send_timeout, self.gateway.send(to, subject, body)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.send_timeout)),
        }
    }

    /// Best effort: each entry is written on its own, so a failing write
    /// loses at most that entry.
    async fn persist(&self, entries: &[NotificationLogEntry]) {
        let mut lost = 0usize;
        for entry in entries {
            if let Err(e) = self.log.append(entry).await {
                lost += 1;
                error!(
                    recipient = %entry.recipient_email,
                    status = %entry.status,
                    error = %e,
                    "Failed to record notification outcome"
                );
            }
        }
        if lost > 0 {
            error!(
                lost,
                recorded = entries.len() - lost,
                "Notification log incomplete for this run"
            );
        }
    }
}

#[async_trait]
impl ScheduledJob for NotificationDispatcher {
    fn name(&self) -> &str {
        "chef_notification"
    }

    async fn run(&self, fired_at: NaiveDateTime) -> anyhow::Result<()> {
        self.dispatch(fired_at.date()).await?;
        Ok(())
    }
}
