//! Groups subscription charges onto billing documents.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use billrun_billing::{BillingCycle, BillingDocument, Customer, Provider, ProviderId, Subscription};

use crate::collaborators::{ChargeSource, DocumentStore};
use crate::error::GenerationResult;

/// Documents opened so far within one customer's consolidated run, keyed by
/// provider.
///
/// Scoped strictly to that customer's processing: created empty per
/// customer, handed over for finalization afterwards, never shared across
/// customers or runs.
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: HashMap<ProviderId, BillingDocument>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing document for the provider, or open one through `open` and
    /// cache it.
    pub fn get_or_open<E>(
        &mut self,
        provider: ProviderId,
        open: impl FnOnce() -> Result<BillingDocument, E>,
    ) -> Result<&mut BillingDocument, E> {
        match self.documents.entry(provider) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(open()?)),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Hand the cached documents over for finalization.
    pub fn into_documents(self) -> impl Iterator<Item = (ProviderId, BillingDocument)> {
        self.documents.into_iter()
    }
}

/// Creates documents and appends subscription charges to them.
///
/// Owns the consolidation rule: one document per provider per customer per
/// cycle when the customer consolidates, one document per subscription
/// otherwise.
pub struct DocumentAssembler<'a> {
    documents: &'a dyn DocumentStore,
    charges: &'a dyn ChargeSource,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(documents: &'a dyn DocumentStore, charges: &'a dyn ChargeSource) -> Self {
        Self { documents, charges }
    }

    /// Append the subscription's charge to the customer's per-provider
    /// document, opening it on first use.
    pub fn assemble_consolidated(
        &self,
        provider: &Provider,
        customer: &Customer,
        subscription: &Subscription,
        cycle: BillingCycle,
        cache: &mut DocumentCache,
    ) -> GenerationResult<()> {
        let document = cache.get_or_open(provider.id_typed(), || {
            self.open_document(provider, customer, cycle)
        })?;

        self.charges
            .add_charge_to_document(subscription, document, cycle.billing_date())?;
        self.documents.save(document)?;

        Ok(())
    }

    /// Create a fresh document scoped to this single subscription and
    /// append its charge.
    pub fn assemble_standalone(
        &self,
        provider: &Provider,
        customer: &Customer,
        subscription: &Subscription,
        cycle: BillingCycle,
    ) -> GenerationResult<BillingDocument> {
        let mut document = self.open_document(provider, customer, cycle)?;

        self.charges
            .add_charge_to_document(subscription, &mut document, cycle.billing_date())?;
        self.documents.save(&document)?;

        Ok(document)
    }

    /// Create a draft document for (provider, customer) with the due date
    /// derived from the cycle and the customer's payment terms.
    fn open_document(
        &self,
        provider: &Provider,
        customer: &Customer,
        cycle: BillingCycle,
    ) -> GenerationResult<BillingDocument> {
        let due_date = cycle.due_date(customer.payment_due_days());
        let document = self.documents.create(
            provider.flow(),
            provider.id_typed(),
            customer.id_typed(),
            due_date,
        )?;

        Ok(document)
    }
}
