// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

/// Calendar-day boundaries evaluated in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub struct AppointmentLifecycleService {
    utc_offset: FixedOffset,
}

impl AppointmentLifecycleService {
    pub fn new(utc_offset: FixedOffset) -> Self {
        Self { utc_offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Midnight to 23:59:59.000 of `now`'s local date.
    pub fn today(&self, now: DateTime<Utc>) -> DayWindow {
        let date = self.local_date(now);
        DayWindow {
            start: self.at_local(date, NaiveTime::MIN),
            end: self.at_local(date, NaiveTime::MIN) + Duration::seconds(86_399),
        }
    }

    /// Midnight of `now`'s local date moved back by `shift_days`.
    pub fn start_of_day(&self, now: DateTime<Utc>, shift_days: u32) -> Option<DateTime<Utc>> {
        let date = self
            .local_date(now)
            .checked_sub_days(Days::new(u64::from(shift_days)))?;
        Some(self.at_local(date, NaiveTime::MIN))
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.utc_offset).date_naive()
    }

    fn at_local(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        (date.and_time(time) - self.utc_offset).and_utc()
    }
}
