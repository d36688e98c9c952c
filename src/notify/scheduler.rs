//! Recurring trigger for the daily notification.
//!
//! The scheduler keeps no durable state. A restart inside the firing minute
//! can fire twice that day, and a restart that spans it misses the day.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::schedule::RecurringSchedule;
use crate::clock::Clock;

/// Work the scheduler triggers. Errors and panics stay inside the run.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, fired_at: NaiveDateTime) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// A slot matched and a run has been claimed but not started.
    Scheduled,
    Firing,
}

#[derive(Debug)]
pub enum TickOutcome {
    NotDue,
    /// This minute's slot was already fired or skipped.
    AlreadyFired,
    /// The previous run is still going; this slot is dropped.
    SkippedBusy,
    Fired(JoinHandle<()>),
}

pub struct NotificationScheduler {
    schedule: RecurringSchedule,
    clock: Arc<dyn Clock>,
    job: Arc<dyn ScheduledJob>,
    tick_interval: Duration,
    state: Arc<Mutex<SchedulerState>>,
    last_slot: Mutex<Option<NaiveDateTime>>,
}

pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop ticking and wait for the loop to exit. A run already in flight
    /// is left to finish on its own.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            error!(error = %e, "Scheduler loop ended abnormally");
        }
        info!("Scheduler stopped");
    }
}

impl NotificationScheduler {
    pub fn new(
        schedule: RecurringSchedule,
        clock: Arc<dyn Clock>,
        job: Arc<dyn ScheduledJob>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            schedule,
            clock,
            job,
            tick_interval,
            state: Arc::new(Mutex::new(SchedulerState::Idle)),
            last_slot: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *lock(&self.state)
    }

    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        info!(
            job = self.job.name(),
            schedule = %self.schedule,
            next = %self.schedule.next_after(self.clock.now()),
            "Scheduler started"
        );
        let join = tokio::spawn(self.run(shutdown_rx));
        SchedulerHandle { shutdown_tx, join }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        debug!("Scheduler loop shutting down");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }
    }

    /// Check the clock once and fire the job if this minute is a slot that
    /// has not been handled yet. The run happens on its own task.
    pub fn tick(&self) -> TickOutcome {
        let now = self.clock.now();
        let Some(slot) = self.schedule.slot(now) else {
            return TickOutcome::NotDue;
        };

        {
            let mut last = lock(&self.last_slot);
            if *last == Some(slot) {
                return TickOutcome::AlreadyFired;
            }
            *last = Some(slot);
        }

        {
            let mut state = lock(&self.state);
            if *state != SchedulerState::Idle {
                warn!(job = self.job.name(), %slot, state = ?*state, "Previous run still in progress, skipping");
                return TickOutcome::SkippedBusy;
            }
            *state = SchedulerState::Scheduled;
        }

        info!(job = self.job.name(), %slot, "Firing scheduled job");
        let job = self.job.clone();
        let state = self.state.clone();
        let next = self.schedule.next_after(slot);
        TickOutcome::Fired(tokio::spawn(async move {
            *lock(&state) = SchedulerState::Firing;

            let name = job.name().to_string();
            let inner = tokio::spawn(async move { job.run(slot).await });
            match inner.await {
                Ok(Ok(())) => info!(job = %name, %next, "Scheduled job finished"),
                Ok(Err(e)) => error!(job = %name, error = ?e, "Scheduled job failed"),
                Err(e) => error!(job = %name, error = %e, "Scheduled job panicked"),
            }

            *lock(&state) = SchedulerState::Idle;
        }))
    }
}

/// The guarded values are plain enums, so a poisoned lock is still usable.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
