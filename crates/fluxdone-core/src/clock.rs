//! Wall-clock access and calendar helpers.
//!
//! Every date-window rule in this crate is evaluated against an explicit `now`
//! that carries the user's UTC offset, so calendar-day comparisons happen in
//! local time while instant comparisons stay offset-independent.

use time::macros::format_description;
use time::{Duration, OffsetDateTime, Time, UtcOffset};

/// Length of the "next 7 days" window.
pub const WEEK: Duration = Duration::days(7);

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current instant, expressed in the local offset.
    fn now(&self) -> OffsetDateTime;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<UtcOffset>,
}

impl SystemClock {
    /// Use the system's local offset (UTC when it cannot be determined).
    #[must_use]
    pub const fn local() -> Self {
        Self { offset: None }
    }

    /// Pin the offset instead of asking the OS.
    #[must_use]
    pub const fn with_offset(offset: UtcOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        match self.offset {
            Some(offset) => OffsetDateTime::now_utc().to_offset(offset),
            None => OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()),
        }
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Midnight of `now`'s calendar day, in `now`'s offset.
#[must_use]
pub fn start_of_day(now: OffsetDateTime) -> OffsetDateTime {
    now.replace_time(Time::MIDNIGHT)
}

/// True when `due` falls on the same local calendar date as `now`.
#[must_use]
pub fn is_due_today(due: OffsetDateTime, now: OffsetDateTime) -> bool {
    due.to_offset(now.offset()).date() == now.date()
}

/// True when `now <= due <= now + 7 days`.
#[must_use]
pub fn is_due_within_week(due: OffsetDateTime, now: OffsetDateTime) -> bool {
    due >= now && due <= now + WEEK
}

/// True when `due` is before the start of today.
#[must_use]
pub fn is_overdue(due: OffsetDateTime, now: OffsetDateTime) -> bool {
    due < start_of_day(now)
}

/// Short label for a due date: `Today`, `Tomorrow`, or `Mon D`.
#[must_use]
pub fn due_label(due: OffsetDateTime, now: OffsetDateTime) -> String {
    let date = due.to_offset(now.offset()).date();
    let today = now.date();
    if date == today {
        return "Today".to_owned();
    }
    if today.next_day() == Some(date) {
        return "Tomorrow".to_owned();
    }
    date.format(format_description!("[month repr:short] [day padding:none]"))
        .unwrap_or_else(|_| date.to_string())
}
