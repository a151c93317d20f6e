//! Per-subscription billing decisions.

use chrono::NaiveDate;

use billrun_billing::Subscription;

use crate::collaborators::ChargeSource;

/// Pure decision rules for whether and how a subscription is billed.
pub struct BillingPolicy;

impl BillingPolicy {
    /// Whether the run considers the subscription at all.
    ///
    /// Only active and canceled subscriptions are candidates; anything else
    /// is skipped silently, not reported as an error.
    pub fn considers(subscription: &Subscription) -> bool {
        subscription.in_billable_state()
    }

    /// Whether the subscription must be billed this cycle.
    ///
    /// Delegates to the collaborator predicate; subscriptions outside a
    /// billable state are never eligible.
    pub fn is_eligible(
        charges: &dyn ChargeSource,
        subscription: &Subscription,
        billing_date: NaiveDate,
    ) -> bool {
        Self::considers(subscription) && charges.should_be_billed(subscription, billing_date)
    }

    /// Whether billing this cycle must also end the subscription.
    pub fn requires_termination(subscription: &Subscription) -> bool {
        subscription.is_canceled()
    }
}
