//! Entry point: one billing document generation run.

use serde::Serialize;
use tracing::{debug, info};

use billrun_billing::{BillingCycle, Customer, Provider, ProviderId, RunMode, SubscriptionId};
use billrun_core::Clock;

use crate::assembler::{DocumentAssembler, DocumentCache};
use crate::collaborators::{
    ChargeSource, CustomerStore, DocumentStore, ProviderDirectory, SubscriptionStore,
};
use crate::error::{GenerationError, GenerationResult, StoreError};
use crate::lifecycle::DocumentLifecycle;
use crate::policy::BillingPolicy;

/// Counters reported by a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub customers_processed: usize,
    pub subscriptions_billed: usize,
    pub subscriptions_ended: usize,
    pub documents_created: usize,
    pub documents_issued: usize,
}

/// Orchestrates billing document generation across customers.
///
/// A run is not transactional across customers: a fatal error aborts the
/// remaining customers but leaves documents already persisted for earlier
/// ones intact.
pub struct GenerationRun<'a> {
    clock: &'a dyn Clock,
    customers: &'a dyn CustomerStore,
    providers: &'a dyn ProviderDirectory,
    subscriptions: &'a dyn SubscriptionStore,
    documents: &'a dyn DocumentStore,
    charges: &'a dyn ChargeSource,
}

impl<'a> GenerationRun<'a> {
    pub fn new(
        clock: &'a dyn Clock,
        customers: &'a dyn CustomerStore,
        providers: &'a dyn ProviderDirectory,
        subscriptions: &'a dyn SubscriptionStore,
        documents: &'a dyn DocumentStore,
        charges: &'a dyn ChargeSource,
    ) -> Self {
        Self {
            clock,
            customers,
            providers,
            subscriptions,
            documents,
            charges,
        }
    }

    /// Generate billing documents.
    ///
    /// With no subscription given, bills every customer for the current
    /// cycle; with one, bills exactly that subscription, dated today.
    pub fn generate(&self, subscription: Option<SubscriptionId>) -> GenerationResult<RunSummary> {
        match subscription {
            None => self.generate_all(),
            Some(id) => self.generate_for_subscription(id),
        }
    }

    /// Full run over every customer, anchored to the first of the month.
    pub fn generate_all(&self) -> GenerationResult<RunSummary> {
        let cycle = BillingCycle::resolve(self.clock, RunMode::Scheduled);
        info!(billing_date = %cycle.billing_date(), "starting full generation run");

        let mut summary = RunSummary::default();
        for customer in self.customers.customers()? {
            debug!(
                customer = %customer.id_typed(),
                consolidated = customer.consolidated_billing(),
                "billing customer"
            );

            if customer.consolidated_billing() {
                self.bill_consolidated(&customer, cycle, &mut summary)?;
            } else {
                self.bill_per_subscription(&customer, cycle, &mut summary)?;
            }
            summary.customers_processed += 1;
        }

        info!(
            customers = summary.customers_processed,
            documents = summary.documents_created,
            issued = summary.documents_issued,
            "generation run finished"
        );
        Ok(summary)
    }

    /// On-demand run for one subscription (e.g. ended with "now"), anchored
    /// to the current date.
    ///
    /// Always produces a document scoped to this subscription alone, no
    /// matter how the owning customer is configured to consolidate.
    pub fn generate_for_subscription(&self, id: SubscriptionId) -> GenerationResult<RunSummary> {
        let cycle = BillingCycle::resolve(self.clock, RunMode::OnDemand);
        info!(subscription = %id, billing_date = %cycle.billing_date(), "starting single-subscription run");

        let mut subscription = self.subscriptions.subscription(id)?;
        let customer = self.customers.customer(subscription.customer_id())?;
        let provider = self.provider_config(subscription.provider_id())?;

        let assembler = DocumentAssembler::new(self.documents, self.charges);
        let lifecycle = DocumentLifecycle::new(self.subscriptions, self.documents);

        let mut summary = RunSummary::default();
        let mut document =
            assembler.assemble_standalone(&provider, &customer, &subscription, cycle)?;
        summary.documents_created += 1;
        summary.subscriptions_billed += 1;

        if lifecycle.settle_subscription(&mut subscription)? {
            summary.subscriptions_ended += 1;
        }
        lifecycle.finalize_document(&provider, &mut document)?;
        if document.is_issued() {
            summary.documents_issued += 1;
        }
        summary.customers_processed = 1;

        Ok(summary)
    }

    /// Consolidated path: all eligible subscriptions of the customer merge
    /// onto one document per provider; documents finalize only after the
    /// whole subscription loop completes.
    fn bill_consolidated(
        &self,
        customer: &Customer,
        cycle: BillingCycle,
        summary: &mut RunSummary,
    ) -> GenerationResult<()> {
        let assembler = DocumentAssembler::new(self.documents, self.charges);
        let lifecycle = DocumentLifecycle::new(self.subscriptions, self.documents);

        let mut cache = DocumentCache::new();
        for mut subscription in self.customers.billable_subscriptions(customer.id_typed())? {
            if !BillingPolicy::is_eligible(self.charges, &subscription, cycle.billing_date()) {
                continue;
            }

            let provider = self.provider_config(subscription.provider_id())?;
            assembler.assemble_consolidated(&provider, customer, &subscription, cycle, &mut cache)?;
            summary.subscriptions_billed += 1;

            if lifecycle.settle_subscription(&mut subscription)? {
                summary.subscriptions_ended += 1;
            }
        }

        summary.documents_created += cache.len();
        for (provider_id, mut document) in cache.into_documents() {
            let provider = self.provider_config(provider_id)?;
            lifecycle.finalize_document(&provider, &mut document)?;
            if document.is_issued() {
                summary.documents_issued += 1;
            }
        }

        Ok(())
    }

    /// Non-consolidated path: each eligible subscription gets its own
    /// document, finalized immediately.
    fn bill_per_subscription(
        &self,
        customer: &Customer,
        cycle: BillingCycle,
        summary: &mut RunSummary,
    ) -> GenerationResult<()> {
        let assembler = DocumentAssembler::new(self.documents, self.charges);
        let lifecycle = DocumentLifecycle::new(self.subscriptions, self.documents);

        for mut subscription in self.customers.billable_subscriptions(customer.id_typed())? {
            if !BillingPolicy::is_eligible(self.charges, &subscription, cycle.billing_date()) {
                continue;
            }

            let provider = self.provider_config(subscription.provider_id())?;
            let mut document =
                assembler.assemble_standalone(&provider, customer, &subscription, cycle)?;
            summary.documents_created += 1;
            summary.subscriptions_billed += 1;

            if lifecycle.settle_subscription(&mut subscription)? {
                summary.subscriptions_ended += 1;
            }
            lifecycle.finalize_document(&provider, &mut document)?;
            if document.is_issued() {
                summary.documents_issued += 1;
            }
        }

        Ok(())
    }

    /// Provider billing configuration; a plan pointing at a provider the
    /// directory does not know is a configuration error, not a missing row.
    fn provider_config(&self, provider_id: ProviderId) -> GenerationResult<Provider> {
        self.providers.provider(provider_id).map_err(|err| match err {
            StoreError::NotFound(_) => GenerationError::Configuration(format!(
                "no provider configuration for {provider_id}"
            )),
            other => GenerationError::Store(other),
        })
    }
}
