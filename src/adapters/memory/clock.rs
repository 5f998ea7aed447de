//! Pinnable clock for tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};

use crate::ports::Clock;

/// Clock pinned to an explicit instant, advanceable by tests.
#[derive(Debug)]
pub struct FixedClock {
    epoch_secs: AtomicI64,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            epoch_secs: AtomicI64::new(now.timestamp()),
        }
    }

    /// Pins the clock to noon UTC on the given date.
    pub fn on_date(date: NaiveDate) -> Self {
        let noon = chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        Self::at(date.and_time(noon).and_utc())
    }

    /// Moves the clock forward (or back, with a negative count).
    pub fn advance_days(&self, days: i64) {
        self.epoch_secs
            .fetch_add(days * 24 * 60 * 60, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.epoch_secs.load(Ordering::SeqCst), 0)
            .unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_pinned_and_advances() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let clock = FixedClock::on_date(date);
        assert_eq!(clock.today(), date);

        clock.advance_days(3);
        assert_eq!(clock.today(), date + chrono::Duration::days(3));

        clock.advance_days(-1);
        assert_eq!(clock.today(), date + chrono::Duration::days(2));
    }
}
