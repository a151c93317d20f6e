use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use chrono::NaiveDate;

use billrun_billing::{BillingDocument, DocumentLine, Subscription, SubscriptionId};
use billrun_generator::{ChargeSource, StoreError};

fn poisoned() -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}

#[derive(Debug, Clone)]
struct ChargeRate {
    description: String,
    amount: u64,
}

/// Flat-rate charge source backed by an explicit billing schedule.
///
/// Each subscription carries one rate (description + amount in smallest
/// currency unit) and is billed in a cycle only when marked due. Real
/// deployments put pricing and cycle alignment behind the [`ChargeSource`]
/// trait; this implementation backs tests and local development, where the
/// schedule must be controlled precisely.
#[derive(Debug, Default)]
pub struct FlatRateCharges {
    rates: RwLock<BTreeMap<SubscriptionId, ChargeRate>>,
    due: RwLock<BTreeSet<SubscriptionId>>,
}

impl FlatRateCharges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription's flat rate.
    pub fn set_rate(
        &self,
        subscription: SubscriptionId,
        description: impl Into<String>,
        amount: u64,
    ) -> Result<(), StoreError> {
        let mut rates = self.rates.write().map_err(|_| poisoned())?;
        rates.insert(
            subscription,
            ChargeRate {
                description: description.into(),
                amount,
            },
        );
        Ok(())
    }

    /// Mark the subscription as due for the next cycle.
    pub fn mark_due(&self, subscription: SubscriptionId) -> Result<(), StoreError> {
        let mut due = self.due.write().map_err(|_| poisoned())?;
        due.insert(subscription);
        Ok(())
    }
}

impl ChargeSource for FlatRateCharges {
    fn should_be_billed(&self, subscription: &Subscription, _billing_date: NaiveDate) -> bool {
        self.due
            .read()
            .map(|due| due.contains(&subscription.id_typed()))
            .unwrap_or(false)
    }

    fn add_charge_to_document(
        &self,
        subscription: &Subscription,
        document: &mut BillingDocument,
        _billing_date: NaiveDate,
    ) -> Result<(), StoreError> {
        let rate = {
            let rates = self.rates.read().map_err(|_| poisoned())?;
            rates.get(&subscription.id_typed()).cloned().ok_or_else(|| {
                StoreError::NotFound(format!(
                    "no rate for subscription {}",
                    subscription.id_typed()
                ))
            })?
        };

        document
            .push_line(DocumentLine {
                subscription_id: subscription.id_typed(),
                description: rate.description,
                amount: rate.amount,
            })
            .map_err(|err| StoreError::Storage(err.to_string()))
    }
}
