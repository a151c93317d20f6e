use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use billrun_billing::{
    BillingDocument, Customer, CustomerId, DocumentId, DocumentKind, Provider, ProviderId,
    Subscription, SubscriptionId,
};
use billrun_core::AggregateId;
use billrun_generator::{
    CustomerStore, DocumentStore, ProviderDirectory, StoreError, SubscriptionStore,
};

fn poisoned() -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}

/// In-memory backing store for the whole billing model.
///
/// Implements every store trait the generation engine depends on.
/// Enumeration follows id order; v7 ids are time-ordered, so iteration
/// tracks creation order. Intended for tests/dev. Not optimized for
/// performance.
#[derive(Debug, Default)]
pub struct InMemoryBillingStore {
    customers: RwLock<BTreeMap<CustomerId, Customer>>,
    providers: RwLock<BTreeMap<ProviderId, Provider>>,
    subscriptions: RwLock<BTreeMap<SubscriptionId, Subscription>>,
    documents: RwLock<BTreeMap<DocumentId, BillingDocument>>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_customer(&self, customer: Customer) -> Result<(), StoreError> {
        let mut customers = self.customers.write().map_err(|_| poisoned())?;
        customers.insert(customer.id_typed(), customer);
        Ok(())
    }

    pub fn upsert_provider(&self, provider: Provider) -> Result<(), StoreError> {
        let mut providers = self.providers.write().map_err(|_| poisoned())?;
        providers.insert(provider.id_typed(), provider);
        Ok(())
    }

    pub fn upsert_subscription(&self, subscription: Subscription) -> Result<(), StoreError> {
        let mut subscriptions = self.subscriptions.write().map_err(|_| poisoned())?;
        subscriptions.insert(subscription.id_typed(), subscription);
        Ok(())
    }

    /// Current persisted state of a document, if it exists.
    pub fn document(&self, id: DocumentId) -> Result<Option<BillingDocument>, StoreError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents.get(&id).cloned())
    }

    /// All persisted documents for a customer, in creation order.
    pub fn documents_for_customer(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<BillingDocument>, StoreError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents
            .values()
            .filter(|d| d.customer_id() == customer)
            .cloned()
            .collect())
    }

    pub fn document_count(&self) -> Result<usize, StoreError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents.len())
    }
}

impl CustomerStore for InMemoryBillingStore {
    fn customers(&self) -> Result<Vec<Customer>, StoreError> {
        let customers = self.customers.read().map_err(|_| poisoned())?;
        Ok(customers.values().cloned().collect())
    }

    fn customer(&self, id: CustomerId) -> Result<Customer, StoreError> {
        let customers = self.customers.read().map_err(|_| poisoned())?;
        customers
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("customer {id}")))
    }

    fn billable_subscriptions(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<Subscription>, StoreError> {
        let subscriptions = self.subscriptions.read().map_err(|_| poisoned())?;
        Ok(subscriptions
            .values()
            .filter(|s| s.customer_id() == customer && s.in_billable_state())
            .cloned()
            .collect())
    }
}

impl ProviderDirectory for InMemoryBillingStore {
    fn provider(&self, id: ProviderId) -> Result<Provider, StoreError> {
        let providers = self.providers.read().map_err(|_| poisoned())?;
        providers
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("provider {id}")))
    }
}

impl SubscriptionStore for InMemoryBillingStore {
    fn subscription(&self, id: SubscriptionId) -> Result<Subscription, StoreError> {
        let subscriptions = self.subscriptions.read().map_err(|_| poisoned())?;
        subscriptions
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("subscription {id}")))
    }

    fn save(&self, subscription: &Subscription) -> Result<(), StoreError> {
        let mut subscriptions = self.subscriptions.write().map_err(|_| poisoned())?;
        subscriptions.insert(subscription.id_typed(), subscription.clone());
        Ok(())
    }
}

impl DocumentStore for InMemoryBillingStore {
    fn create(
        &self,
        kind: DocumentKind,
        provider: ProviderId,
        customer: CustomerId,
        due_date: NaiveDate,
    ) -> Result<BillingDocument, StoreError> {
        let document = BillingDocument::draft(
            DocumentId::new(AggregateId::new()),
            kind,
            provider,
            customer,
            due_date,
        );

        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        documents.insert(document.id_typed(), document.clone());
        Ok(document)
    }

    fn save(&self, document: &BillingDocument) -> Result<(), StoreError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        documents.insert(document.id_typed(), document.clone());
        Ok(())
    }
}
