//! # SCA Processors
//!
//! A processor advances one authorisation by one protocol step. Which
//! processor runs is decided by the [`DispatchTable`] from the
//! authorisation's approach, current status and type; the processor itself
//! talks to the bank adapter.
//!
//! Processors never write the authorisation's SCA status or the business
//! object's status. They report both in their [`AuthorisationResponse`];
//! the orchestrator persists the SCA status through the status writer and
//! applies the object status only once that write has succeeded.

pub mod dispatch;
mod steps;

use serde::Serialize;

use obsca_core::{AuthorisationId, AuthorisationType, ErrorHolder, ScaApproach, TppMessage};
use obsca_state::{
    Authorisation, BusinessObject, ConsentStatus, ObjectStatus, ScaMethod, ScaStatus, TransactionStatus,
};

use crate::adapter::{BankAdapter, ChallengeData};
use crate::config::AspspProfile;
use crate::context::RequestContext;
use crate::registry::AuthorisationRegistry;
use crate::request::UpdateAuthorisationRequest;

pub use dispatch::{DispatchKey, DispatchTable, Processor, ProcessorFn};

// ─── Inputs ──────────────────────────────────────────────────────────

/// What the processor is asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorPayload {
    /// First step for a freshly created authorisation.
    Start,
    /// A TPP update carrying credentials, a method choice or a TAN.
    Update(UpdateAuthorisationRequest),
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessorRequest<'a> {
    pub context: &'a RequestContext,
    pub authorisation: &'a Authorisation,
    pub object: &'a BusinessObject,
    pub payload: &'a ProcessorPayload,
}

impl ProcessorRequest<'_> {
    pub fn approach(&self) -> ScaApproach {
        self.authorisation.chosen_approach()
    }

    pub fn current_status(&self) -> ScaStatus {
        self.authorisation.sca_status()
    }

    pub fn authorisation_type(&self) -> AuthorisationType {
        self.authorisation.authorisation_type()
    }

    pub fn key(&self) -> DispatchKey {
        DispatchKey {
            approach: self.approach(),
            status: self.current_status(),
            authorisation_type: self.authorisation_type(),
        }
    }
}

/// Collaborators a processor may call.
#[derive(Clone, Copy)]
pub struct ProcessorServices<'a> {
    pub registry: &'a dyn AuthorisationRegistry,
    pub bank: &'a dyn BankAdapter,
    pub profile: &'a AspspProfile,
}

// ─── Outputs ─────────────────────────────────────────────────────────

/// Fields common to consent and payment authorisation responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaProgress {
    pub authorisation_id: AuthorisationId,
    pub sca_status: ScaStatus,
    /// Echo of the authorisation's approach. Never changes.
    pub approach: ScaApproach,
    pub psu_message: Option<String>,
    pub messages: Vec<TppMessage>,
    pub available_methods: Vec<ScaMethod>,
    pub chosen_method: Option<ScaMethod>,
    pub challenge_data: Option<ChallengeData>,
    pub redirect_link: Option<String>,
    /// Set on failure. Only a FAILED status is persisted alongside it.
    pub error: Option<ErrorHolder>,
}

impl ScaProgress {
    pub fn new(authorisation_id: AuthorisationId, sca_status: ScaStatus, approach: ScaApproach) -> Self {
        Self {
            authorisation_id,
            sca_status,
            approach,
            psu_message: None,
            messages: Vec::new(),
            available_methods: Vec::new(),
            chosen_method: None,
            challenge_data: None,
            redirect_link: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsentAuthorisationResponse {
    #[serde(flatten)]
    pub progress: ScaProgress,
    pub consent_status: Option<ConsentStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentAuthorisationResponse {
    #[serde(flatten)]
    pub progress: ScaProgress,
    pub transaction_status: Option<TransactionStatus>,
}

/// Result of one SCA step, by business-object family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum AuthorisationResponse {
    Consent(ConsentAuthorisationResponse),
    Payment(PaymentAuthorisationResponse),
}

impl AuthorisationResponse {
    pub fn new(
        authorisation_type: AuthorisationType,
        progress: ScaProgress,
        object_status: Option<ObjectStatus>,
    ) -> Self {
        match authorisation_type {
            AuthorisationType::Consent => Self::Consent(ConsentAuthorisationResponse {
                progress,
                consent_status: object_status.and_then(|s| s.consent()),
            }),
            AuthorisationType::PaymentCreation | AuthorisationType::PaymentCancellation => {
                Self::Payment(PaymentAuthorisationResponse {
                    progress,
                    transaction_status: object_status.and_then(|s| s.payment()),
                })
            }
        }
    }

    pub fn progress(&self) -> &ScaProgress {
        match self {
            Self::Consent(r) => &r.progress,
            Self::Payment(r) => &r.progress,
        }
    }

    pub fn progress_mut(&mut self) -> &mut ScaProgress {
        match self {
            Self::Consent(r) => &mut r.progress,
            Self::Payment(r) => &mut r.progress,
        }
    }

    pub fn authorisation_id(&self) -> AuthorisationId {
        self.progress().authorisation_id
    }

    pub fn sca_status(&self) -> ScaStatus {
        self.progress().sca_status
    }

    pub fn approach(&self) -> ScaApproach {
        self.progress().approach
    }

    pub fn error(&self) -> Option<&ErrorHolder> {
        self.progress().error.as_ref()
    }

    /// Business-object status this step reached, if it changed one.
    pub fn object_status(&self) -> Option<ObjectStatus> {
        match self {
            Self::Consent(r) => r.consent_status.map(ObjectStatus::Consent),
            Self::Payment(r) => r.transaction_status.map(ObjectStatus::Payment),
        }
    }
}
