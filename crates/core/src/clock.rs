//! Clock abstraction for date-dependent decisions.
//!
//! Billing logic depends on "today". The clock is an explicit dependency,
//! never an ambient global, so runs are reproducible in tests.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Clock backed by system time (UTC).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a fixed date.
///
/// Intended for tests/dev.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_pinned_date() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 10).unwrap();
        assert_eq!(FixedClock(date).today(), date);
    }

    #[test]
    fn arc_clock_delegates() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 10).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(date));
        assert_eq!(clock.today(), date);
    }
}
