use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billrun_core::{AggregateId, DomainError, DomainResult, Entity};

use crate::customer::CustomerId;
use crate::provider::ProviderId;
use crate::subscription::SubscriptionId;

/// Billing document identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub AggregateId);

impl DocumentId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Kind of billing document a provider's subscriptions are billed onto.
///
/// Doubles as the provider's flow selection: the kind of document created
/// and the label a charge is attached under always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Proforma,
}

impl DocumentKind {
    /// Label identifying which document role a charge targets.
    pub fn charge_label(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Proforma => "proforma",
        }
    }
}

/// Document status lifecycle. Issuance is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    Draft,
    Issued,
}

/// A single subscription charge on a billing document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub subscription_id: SubscriptionId,
    pub description: String,
    /// Amount in smallest currency unit (e.g., cents).
    pub amount: u64,
}

/// A billing document (invoice or proforma) for one customer and provider.
///
/// Created in draft, accumulates charges from one or more subscriptions,
/// and is frozen once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingDocument {
    id: DocumentId,
    kind: DocumentKind,
    provider_id: ProviderId,
    customer_id: CustomerId,
    due_date: NaiveDate,
    state: DocumentState,
    lines: Vec<DocumentLine>,
}

impl BillingDocument {
    /// Create a new draft document with no lines.
    pub fn draft(
        id: DocumentId,
        kind: DocumentKind,
        provider_id: ProviderId,
        customer_id: CustomerId,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            kind,
            provider_id,
            customer_id,
            due_date,
            state: DocumentState::Draft,
            lines: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> DocumentId {
        self.id
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider_id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn is_issued(&self) -> bool {
        self.state == DocumentState::Issued
    }

    pub fn lines(&self) -> &[DocumentLine] {
        &self.lines
    }

    /// Total of all line amounts, in smallest currency unit.
    pub fn total(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, line| acc.saturating_add(line.amount))
    }

    /// Append a charge line.
    ///
    /// Invariant: a document accepts lines only while in draft. Issuance
    /// freezes it.
    pub fn push_line(&mut self, line: DocumentLine) -> DomainResult<()> {
        if self.state != DocumentState::Draft {
            return Err(DomainError::invariant(
                "cannot add lines to an issued document",
            ));
        }

        self.lines.push(line);
        Ok(())
    }

    /// Draft → Issued transition.
    ///
    /// Issuing an already-issued document is a no-op, not an error.
    pub fn issue(&mut self) {
        self.state = DocumentState::Issued;
    }
}

impl Entity for BillingDocument {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
