//! Decides whether a reminder is due in the current dispatch cycle.
//!
//! Matching is evaluated against a wall-clock reading in the dispatcher's
//! configured zone. The minute comparison is a plain absolute difference
//! within the same hour: a reminder at `:02` does not match a check at `:58`.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::models::reminder::{Reminder, Schedule};

/// Minutes either side of the scheduled time that still count as "now".
pub const MATCH_WINDOW_MINUTES: i64 = 5;

/// Returns true when `reminder` should be dispatched at `now`.
pub fn is_due(reminder: &Reminder, now: &NaiveDateTime) -> bool {
    time_matches(reminder.time, now) && schedule_matches(&reminder.schedule, now.date())
}

/// Same hour and fewer than [`MATCH_WINDOW_MINUTES`] minutes apart.
pub fn time_matches(time: NaiveTime, now: &NaiveDateTime) -> bool {
    if time.hour() != now.hour() {
        return false;
    }
    (i64::from(time.minute()) - i64::from(now.minute())).abs() < MATCH_WINDOW_MINUTES
}

pub fn schedule_matches(schedule: &Schedule, today: NaiveDate) -> bool {
    match schedule {
        Schedule::Daily => true,
        Schedule::Weekly { days_of_week } => days_of_week.contains(&today.weekday()),
        Schedule::SpecificDate { specific_date } => {
            specific_date.year() == today.year()
                && specific_date.month() == today.month()
                && specific_date.day() == today.day()
        }
    }
}
