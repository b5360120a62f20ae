//! Fixed clock for service tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

pub(crate) struct FixedClock {
    utc_now: DateTime<Utc>,
}

impl FixedClock {
    pub(crate) fn new(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }

    /// Noon UTC on the given day, so the local date matches in any
    /// timezone within twelve hours of UTC.
    pub(crate) fn at_ymd(year: i32, month: u32, day: u32) -> Self {
        let utc_now = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp");
        Self::new(utc_now)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}
