use chrono::{Local, NaiveDateTime};

/// Source of local wall-clock time. Cutoff and schedule decisions are made
/// against this, never against `Local::now()` directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
