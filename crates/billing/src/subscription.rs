use serde::{Deserialize, Serialize};

use billrun_core::{AggregateId, DomainError, DomainResult, Entity};

use crate::customer::CustomerId;
use crate::provider::ProviderId;

/// Subscription identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub AggregateId);

impl SubscriptionId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Plan identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub AggregateId);

impl PlanId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PlanId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A provider's plan a subscription is attached to.
///
/// The plan carries the subscription → provider edge; pricing lives behind
/// the charge collaborator, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    id: PlanId,
    provider_id: ProviderId,
    name: String,
}

impl Plan {
    pub fn new(id: PlanId, provider_id: ProviderId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("plan name cannot be empty"));
        }

        Ok(Self {
            id,
            provider_id,
            name,
        })
    }

    pub fn id_typed(&self) -> PlanId {
        self.id
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Plan {
    type Id = PlanId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Subscription status lifecycle.
///
/// Only `Active` and `Canceled` subscriptions participate in billing; every
/// other state is skipped by the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    Inactive,
    Active,
    Canceled,
    Ended,
}

/// A customer's subscription to one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    customer_id: CustomerId,
    plan: Plan,
    state: SubscriptionState,
}

impl Subscription {
    pub fn new(
        id: SubscriptionId,
        customer_id: CustomerId,
        plan: Plan,
        state: SubscriptionState,
    ) -> Self {
        Self {
            id,
            customer_id,
            plan,
            state,
        }
    }

    pub fn id_typed(&self) -> SubscriptionId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Provider the subscription bills under, via its plan.
    pub fn provider_id(&self) -> ProviderId {
        self.plan.provider_id()
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Whether the subscription participates in billing at all.
    pub fn in_billable_state(&self) -> bool {
        matches!(
            self.state,
            SubscriptionState::Active | SubscriptionState::Canceled
        )
    }

    pub fn is_canceled(&self) -> bool {
        self.state == SubscriptionState::Canceled
    }

    /// Canceled → Ended transition.
    ///
    /// Only a canceled subscription can end; the run applies this after the
    /// subscription has been billed for its final cycle.
    pub fn end(&mut self) -> DomainResult<()> {
        if self.state != SubscriptionState::Canceled {
            return Err(DomainError::invariant(
                "only a canceled subscription can end",
            ));
        }

        self.state = SubscriptionState::Ended;
        Ok(())
    }
}

impl Entity for Subscription {
    type Id = SubscriptionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_plan() -> Plan {
        Plan::new(
            PlanId::new(AggregateId::new()),
            ProviderId::new(AggregateId::new()),
            "Hosting Monthly",
        )
        .unwrap()
    }

    fn test_subscription(state: SubscriptionState) -> Subscription {
        Subscription::new(
            SubscriptionId::new(AggregateId::new()),
            CustomerId::new(AggregateId::new()),
            test_plan(),
            state,
        )
    }

    #[test]
    fn billable_states_are_active_and_canceled() {
        assert!(test_subscription(SubscriptionState::Active).in_billable_state());
        assert!(test_subscription(SubscriptionState::Canceled).in_billable_state());
        assert!(!test_subscription(SubscriptionState::Inactive).in_billable_state());
        assert!(!test_subscription(SubscriptionState::Ended).in_billable_state());
    }

    #[test]
    fn canceled_subscription_ends() {
        let mut subscription = test_subscription(SubscriptionState::Canceled);
        subscription.end().unwrap();
        assert_eq!(subscription.state(), SubscriptionState::Ended);
    }

    #[test]
    fn active_subscription_cannot_end() {
        let mut subscription = test_subscription(SubscriptionState::Active);
        let err = subscription.end().unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected invariant violation for ending an active subscription"),
        }
        assert_eq!(subscription.state(), SubscriptionState::Active);
    }

    #[test]
    fn provider_id_comes_from_plan() {
        let plan = test_plan();
        let provider_id = plan.provider_id();
        let subscription = Subscription::new(
            SubscriptionId::new(AggregateId::new()),
            CustomerId::new(AggregateId::new()),
            plan,
            SubscriptionState::Active,
        );
        assert_eq!(subscription.provider_id(), provider_id);
    }
}
