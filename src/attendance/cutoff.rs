use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::AttendanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub effective_date: NaiveDate,
    pub rolled_over: bool,
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Decide which date a submission for `requested` lands on.
///
/// A same-day submission made strictly after `cutoff` moves to the next day.
/// Weekend dates are rejected, including a Friday submission that would roll
/// onto Saturday.
pub fn resolve(
    requested: NaiveDate,
    now: NaiveDateTime,
    cutoff: NaiveTime,
) -> Result<Resolution, AttendanceError> {
    if is_weekend(requested) {
        return Err(AttendanceError::WeekendRejected(requested));
    }

    if requested == now.date() && now.time() > cutoff {
        let next = requested
            .succ_opt()
            .ok_or_else(|| AttendanceError::InvalidDateFormat(requested.to_string()))?;
        if is_weekend(next) {
            return Err(AttendanceError::WeekendRejected(next));
        }
        return Ok(Resolution {
            effective_date: next,
            rolled_over: true,
        });
    }

    Ok(Resolution {
        effective_date: requested,
        rolled_over: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::at;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cutoff() -> NaiveTime {
        NaiveTime::from_hms_opt(21, 30, 0).unwrap()
    }

    #[test]
    fn weekend_is_rejected_at_any_time() {
        for day in ["2024-06-08", "2024-06-09", "2024-06-15", "2024-06-16"] {
            for now in [
                at(day, "00:00:00"),
                at(day, "21:30:00"),
                at(day, "23:59:59"),
                at("2024-06-10", "08:00:00"),
            ] {
                assert!(matches!(
                    resolve(date(day), now, cutoff()),
                    Err(AttendanceError::WeekendRejected(d)) if d == date(day)
                ));
            }
        }
    }

    #[test]
    fn same_day_at_or_before_cutoff_keeps_date() {
        for time in ["07:00:00", "21:29:59", "21:30:00"] {
            let r = resolve(date("2024-06-10"), at("2024-06-10", time), cutoff()).unwrap();
            assert_eq!(r.effective_date, date("2024-06-10"));
            assert!(!r.rolled_over);
        }
    }

    #[test]
    fn same_day_after_cutoff_rolls_to_next_day() {
        let r = resolve(date("2024-06-10"), at("2024-06-10", "21:45:00"), cutoff()).unwrap();
        assert_eq!(
            r,
            Resolution {
                effective_date: date("2024-06-11"),
                rolled_over: true
            }
        );

        let r = resolve(date("2024-06-10"), at("2024-06-10", "21:30:01"), cutoff()).unwrap();
        assert!(r.rolled_over);
    }

    #[test]
    fn other_days_ignore_cutoff() {
        let late = at("2024-06-10", "23:00:00");
        let future = resolve(date("2024-06-12"), late, cutoff()).unwrap();
        assert_eq!(future.effective_date, date("2024-06-12"));
        assert!(!future.rolled_over);

        let past = resolve(date("2024-06-07"), late, cutoff()).unwrap();
        assert_eq!(past.effective_date, date("2024-06-07"));
        assert!(!past.rolled_over);
    }

    #[test]
    fn friday_after_cutoff_would_land_on_saturday() {
        let err = resolve(date("2024-06-14"), at("2024-06-14", "22:00:00"), cutoff()).unwrap_err();
        assert!(matches!(err, AttendanceError::WeekendRejected(d) if d == date("2024-06-15")));
    }
}
