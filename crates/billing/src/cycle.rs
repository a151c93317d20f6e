//! Billing cycle date arithmetic.

use chrono::{Datelike, Days, NaiveDate};

use billrun_core::Clock;

/// How a generation run was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Scheduled full run; anchors to the first day of the current month.
    Scheduled,
    /// On-demand run for a single subscription; anchors to the current date.
    OnDemand,
}

/// The anchor date of one generation run.
///
/// Resolved once per run and shared across all customers, so a run that
/// straddles a date rollover does not drift between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCycle {
    billing_date: NaiveDate,
}

impl BillingCycle {
    /// Resolve the billing date for a run from the injected clock.
    pub fn resolve(clock: &dyn Clock, mode: RunMode) -> Self {
        let today = clock.today();
        let billing_date = match mode {
            RunMode::Scheduled => first_of_month(today),
            RunMode::OnDemand => today,
        };

        Self { billing_date }
    }

    pub fn billing_date(&self) -> NaiveDate {
        self.billing_date
    }

    /// Due date: billing date plus the customer's payment terms.
    pub fn due_date(&self, payment_due_days: u32) -> NaiveDate {
        self.billing_date + Days::new(u64::from(payment_due_days))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 exists in every month")
}
