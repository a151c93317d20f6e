use serde::{Deserialize, Serialize};

use billrun_core::{AggregateId, DomainError, DomainResult, Entity};

use crate::document::{DocumentKind, DocumentState};

/// Provider identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub AggregateId);

impl ProviderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A service provider whose plans customers subscribe to.
///
/// Carries the static billing configuration the generation run reads:
/// which document kind subscriptions are billed onto (`flow`) and whether
/// new documents are issued immediately or left in draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    id: ProviderId,
    name: String,
    flow: DocumentKind,
    default_document_state: DocumentState,
}

impl Provider {
    pub fn new(
        id: ProviderId,
        name: impl Into<String>,
        flow: DocumentKind,
        default_document_state: DocumentState,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("provider name cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            flow,
            default_document_state,
        })
    }

    pub fn id_typed(&self) -> ProviderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flow(&self) -> DocumentKind {
        self.flow
    }

    pub fn default_document_state(&self) -> DocumentState {
        self.default_document_state
    }

    /// Whether documents under this provider are issued as soon as all
    /// their charges are in, instead of being left in draft.
    pub fn issues_immediately(&self) -> bool {
        self.default_document_state == DocumentState::Issued
    }
}

impl Entity for Provider {
    type Id = ProviderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
