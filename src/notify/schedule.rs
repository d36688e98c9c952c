use std::collections::HashSet;
use std::fmt;

use anyhow::{Context, bail};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// Fires once per allowed weekday at a fixed local time of day, at minute
/// granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringSchedule {
    at: NaiveTime,
    weekdays: HashSet<Weekday>,
}

impl RecurringSchedule {
    pub fn new(at: NaiveTime, weekdays: impl IntoIterator<Item = Weekday>) -> anyhow::Result<Self> {
        let weekdays: HashSet<_> = weekdays.into_iter().collect();
        if weekdays.is_empty() {
            bail!("schedule needs at least one weekday");
        }
        let at = NaiveTime::from_hms_opt(at.hour(), at.minute(), 0).context("invalid time of day")?;
        Ok(Self { at, weekdays })
    }

    /// Parse `"09:30"` plus a comma separated weekday list such as
    /// `"mon,tue,wed,thu,fri"`.
    pub fn parse(at: &str, weekdays: &str) -> anyhow::Result<Self> {
        let at = NaiveTime::parse_from_str(at.trim(), "%H:%M")
            .with_context(|| format!("invalid time of day {at:?}, expected HH:MM"))?;
        let days = weekdays
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Weekday>()
                    .map_err(|_| anyhow::anyhow!("invalid weekday {s:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Self::new(at, days)
    }

    pub fn allows(&self, day: Weekday) -> bool {
        self.weekdays.contains(&day)
    }

    /// The minute slot `now` falls in, if it is a firing slot.
    pub fn slot(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let due = self.allows(now.weekday())
            && now.hour() == self.at.hour()
            && now.minute() == self.at.minute();
        due.then(|| now.date().and_time(self.at))
    }

    /// First firing slot strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let mut day = now.date();
        loop {
            let candidate = day.and_time(self.at);
            if candidate > now && self.allows(day.weekday()) {
                return candidate;
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => return candidate,
            };
        }
    }
}

impl fmt::Display for RecurringSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut days: Vec<_> = self.weekdays.iter().collect();
        days.sort_by_key(|d| d.num_days_from_monday());
        let days: Vec<_> = days.iter().map(|d| d.to_string()).collect();
        write!(f, "{} on {}", self.at.format("%H:%M"), days.join(","))
    }
}
