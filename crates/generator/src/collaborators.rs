//! Collaborator contracts the generation engine calls into.
//!
//! The engine owns decision logic only. Reading customers, persisting state
//! transitions and computing charge amounts sit behind these traits, so a
//! run can be exercised against in-memory implementations without the real
//! persistence layer.

use chrono::NaiveDate;

use billrun_billing::{
    BillingDocument, Customer, CustomerId, DocumentKind, Provider, ProviderId, Subscription,
    SubscriptionId,
};

use crate::error::StoreError;

/// Read access to customers and their subscriptions.
pub trait CustomerStore: Send + Sync {
    /// All customers considered by a full run.
    fn customers(&self) -> Result<Vec<Customer>, StoreError>;

    fn customer(&self, id: CustomerId) -> Result<Customer, StoreError>;

    /// A customer's subscriptions in a billable state (active or canceled).
    ///
    /// Implementations filter by state only; eligibility within a cycle is
    /// decided by the run.
    fn billable_subscriptions(&self, customer: CustomerId) -> Result<Vec<Subscription>, StoreError>;
}

/// Static billing configuration of providers. Read-only to the engine.
pub trait ProviderDirectory: Send + Sync {
    fn provider(&self, id: ProviderId) -> Result<Provider, StoreError>;
}

/// Persistence of subscription state transitions.
pub trait SubscriptionStore: Send + Sync {
    fn subscription(&self, id: SubscriptionId) -> Result<Subscription, StoreError>;

    /// Persist the subscription's current state.
    fn save(&self, subscription: &Subscription) -> Result<(), StoreError>;
}

/// Persistence of billing documents.
pub trait DocumentStore: Send + Sync {
    /// Create and persist a new draft document.
    fn create(
        &self,
        kind: DocumentKind,
        provider: ProviderId,
        customer: CustomerId,
        due_date: NaiveDate,
    ) -> Result<BillingDocument, StoreError>;

    /// Persist the document's current state (lines, issuance).
    fn save(&self, document: &BillingDocument) -> Result<(), StoreError>;
}

/// Charge computation, owned by the subscription collaborator.
///
/// The engine never computes amounts; it only decides whether a
/// subscription is billed and onto which document its charge lands.
pub trait ChargeSource: Send + Sync {
    /// Whether the subscription must be billed for this cycle.
    ///
    /// Must be a pure function of (subscription state, billing date): the
    /// run may evaluate it repeatedly within one cycle and expects the same
    /// answer every time.
    fn should_be_billed(&self, subscription: &Subscription, billing_date: NaiveDate) -> bool;

    /// Compute the subscription's charge for this cycle and append it to
    /// the document. Amount computation is entirely the implementation's
    /// concern; the document identifies its own kind via
    /// [`BillingDocument::kind`].
    fn add_charge_to_document(
        &self,
        subscription: &Subscription,
        document: &mut BillingDocument,
        billing_date: NaiveDate,
    ) -> Result<(), StoreError>;
}
