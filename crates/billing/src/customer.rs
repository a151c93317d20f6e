use serde::{Deserialize, Serialize};

use billrun_core::{AggregateId, DomainError, DomainResult, Entity};

/// Customer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub AggregateId);

impl CustomerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A billed customer.
///
/// `consolidated_billing` merges all of the customer's subscriptions under
/// the same provider onto one document per cycle; otherwise each
/// subscription gets its own document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    name: String,
    consolidated_billing: bool,
    payment_due_days: u32,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        consolidated_billing: bool,
        payment_due_days: u32,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            consolidated_billing,
            payment_due_days,
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn consolidated_billing(&self) -> bool {
        self.consolidated_billing
    }

    /// Days after the billing date at which the customer's documents fall due.
    pub fn payment_due_days(&self) -> u32 {
        self.payment_due_days
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
