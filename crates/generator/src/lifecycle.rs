//! Post-assembly state transitions.
//!
//! Subscription ending is decided per subscription as it is processed;
//! document issuance is decided per document only after every charge
//! destined for it has been appended. Issuing earlier would freeze a
//! document before a later subscription on the same provider contributes
//! its charge.

use billrun_billing::{BillingDocument, Provider, Subscription};

use crate::collaborators::{DocumentStore, SubscriptionStore};
use crate::error::GenerationResult;
use crate::policy::BillingPolicy;

/// Applies the lifecycle transitions a billing pass triggers.
pub struct DocumentLifecycle<'a> {
    subscriptions: &'a dyn SubscriptionStore,
    documents: &'a dyn DocumentStore,
}

impl<'a> DocumentLifecycle<'a> {
    pub fn new(subscriptions: &'a dyn SubscriptionStore, documents: &'a dyn DocumentStore) -> Self {
        Self {
            subscriptions,
            documents,
        }
    }

    /// End a canceled subscription now that it has been billed, and persist
    /// the transition. Returns whether a transition fired.
    ///
    /// Runs immediately after the subscription's charge is assembled,
    /// independent of whether its document is later issued.
    pub fn settle_subscription(&self, subscription: &mut Subscription) -> GenerationResult<bool> {
        if !BillingPolicy::requires_termination(subscription) {
            return Ok(false);
        }

        subscription.end()?;
        self.subscriptions.save(subscription)?;

        Ok(true)
    }

    /// Issue the document if the owning provider's configuration asks for
    /// it; otherwise it stays in draft.
    ///
    /// Must run only once all charges destined for the document are in.
    pub fn finalize_document(
        &self,
        provider: &Provider,
        document: &mut BillingDocument,
    ) -> GenerationResult<()> {
        if provider.issues_immediately() {
            document.issue();
            self.documents.save(document)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use billrun_billing::{
        CustomerId, DocumentId, DocumentKind, DocumentState, Plan, PlanId, ProviderId,
        SubscriptionId, SubscriptionState,
    };
    use billrun_core::AggregateId;

    use super::*;
    use crate::error::StoreError;

    #[derive(Default)]
    struct StubStore {
        subscription_saves: Mutex<Vec<SubscriptionId>>,
        document_saves: Mutex<Vec<DocumentId>>,
    }

    impl SubscriptionStore for StubStore {
        fn subscription(&self, id: SubscriptionId) -> Result<Subscription, StoreError> {
            Err(StoreError::NotFound(format!("subscription {id}")))
        }

        fn save(&self, subscription: &Subscription) -> Result<(), StoreError> {
            self.subscription_saves
                .lock()
                .unwrap()
                .push(subscription.id_typed());
            Ok(())
        }
    }

    impl DocumentStore for StubStore {
        fn create(
            &self,
            kind: DocumentKind,
            provider: ProviderId,
            customer: CustomerId,
            due_date: NaiveDate,
        ) -> Result<BillingDocument, StoreError> {
            Ok(BillingDocument::draft(
                DocumentId::new(AggregateId::new()),
                kind,
                provider,
                customer,
                due_date,
            ))
        }

        fn save(&self, document: &BillingDocument) -> Result<(), StoreError> {
            self.document_saves.lock().unwrap().push(document.id_typed());
            Ok(())
        }
    }

    fn test_subscription(state: SubscriptionState) -> Subscription {
        let plan = Plan::new(
            PlanId::new(AggregateId::new()),
            ProviderId::new(AggregateId::new()),
            "Plan",
        )
        .unwrap();
        Subscription::new(
            SubscriptionId::new(AggregateId::new()),
            CustomerId::new(AggregateId::new()),
            plan,
            state,
        )
    }

    fn test_provider(default_state: DocumentState) -> Provider {
        Provider::new(
            ProviderId::new(AggregateId::new()),
            "Provider",
            DocumentKind::Invoice,
            default_state,
        )
        .unwrap()
    }

    fn test_document(provider: &Provider) -> BillingDocument {
        BillingDocument::draft(
            DocumentId::new(AggregateId::new()),
            provider.flow(),
            provider.id_typed(),
            CustomerId::new(AggregateId::new()),
            NaiveDate::from_ymd_opt(2023, 6, 16).unwrap(),
        )
    }

    #[test]
    fn canceled_subscription_ends_and_persists() {
        let store = StubStore::default();
        let lifecycle = DocumentLifecycle::new(&store, &store);
        let mut subscription = test_subscription(SubscriptionState::Canceled);

        let ended = lifecycle.settle_subscription(&mut subscription).unwrap();

        assert!(ended);
        assert_eq!(subscription.state(), SubscriptionState::Ended);
        assert_eq!(
            store.subscription_saves.lock().unwrap().as_slice(),
            &[subscription.id_typed()]
        );
    }

    #[test]
    fn active_subscription_is_left_alone() {
        let store = StubStore::default();
        let lifecycle = DocumentLifecycle::new(&store, &store);
        let mut subscription = test_subscription(SubscriptionState::Active);

        let ended = lifecycle.settle_subscription(&mut subscription).unwrap();

        assert!(!ended);
        assert_eq!(subscription.state(), SubscriptionState::Active);
        assert!(store.subscription_saves.lock().unwrap().is_empty());
    }

    #[test]
    fn finalize_issues_when_provider_demands_it() {
        let store = StubStore::default();
        let lifecycle = DocumentLifecycle::new(&store, &store);
        let provider = test_provider(DocumentState::Issued);
        let mut document = test_document(&provider);

        lifecycle.finalize_document(&provider, &mut document).unwrap();

        assert!(document.is_issued());
        assert_eq!(store.document_saves.lock().unwrap().len(), 1);
    }

    #[test]
    fn finalize_leaves_draft_when_provider_defaults_to_draft() {
        let store = StubStore::default();
        let lifecycle = DocumentLifecycle::new(&store, &store);
        let provider = test_provider(DocumentState::Draft);
        let mut document = test_document(&provider);

        lifecycle.finalize_document(&provider, &mut document).unwrap();

        assert!(!document.is_issued());
        assert!(store.document_saves.lock().unwrap().is_empty());
    }
}
