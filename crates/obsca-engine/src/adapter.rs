//! # Bank Adapter Interface
//!
//! The seam between the engine and the bank's own backend. Processors call
//! these per-step operations; the adapter performs the actual credential
//! checks, challenge generation and payment execution.
//!
//! ## Operations
//!
//! | Step | Method |
//! |------|--------|
//! | authorisation created | [`BankAdapter::start_authorisation`] |
//! | password supplied | [`BankAdapter::authorise_psu`] |
//! | list SCA methods | [`BankAdapter::request_available_methods`] |
//! | method chosen (embedded) | [`BankAdapter::request_authorisation_code`] |
//! | method chosen (decoupled) | [`BankAdapter::start_decoupled`] |
//! | TAN supplied | [`BankAdapter::verify_sca`] |
//! | redirect code, bank-side check | [`BankAdapter::check_confirmation_code`] |
//! | redirect code, local check | [`BankAdapter::notify_confirmation_code_validation`] |
//!
//! Methods are synchronous: the engine treats adapter calls as blocking
//! I/O and places no timeout or retry around them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use obsca_core::{MessageErrorCode, PsuIdData, ScaApproach, TppMessage};
use obsca_state::{Authorisation, BusinessObject, ObjectStatus, ScaMethod, ScaStatus};

use crate::context::RequestContext;

// ─── Error ───────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The bank refused the step with a specific code.
    #[error("bank rejected request: {code}")]
    Rejected {
        code: MessageErrorCode,
        detail: Option<String>,
    },

    #[error("bank unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected response from bank: {0}")]
    UnexpectedResponse(String),
}

impl AdapterError {
    pub fn rejected(code: MessageErrorCode) -> Self {
        Self::Rejected { code, detail: None }
    }

    pub fn message_code(&self) -> MessageErrorCode {
        match self {
            Self::Rejected { code, .. } => *code,
            Self::Unavailable(_) | Self::UnexpectedResponse(_) => MessageErrorCode::InternalServerError,
        }
    }

    pub fn to_tpp_message(&self) -> TppMessage {
        let message = TppMessage::error(self.message_code());
        match self {
            Self::Rejected { detail: Some(detail), .. } => message.with_text(detail.clone()),
            _ => message,
        }
    }
}

// ─── Step payloads ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedAuthorisation {
    pub sca_status: ScaStatus,
    pub psu_message: Option<String>,
    pub messages: Vec<TppMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsuAuthorisationStatus {
    Success,
    /// Credentials accepted and no further SCA is required.
    Exempted,
    /// Wrong credentials, no retries left.
    Failure,
    /// Wrong credentials, the PSU may try again.
    AttemptFailure,
}

/// Challenge presented to the PSU for the chosen method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeData {
    pub otp_format: Option<String>,
    pub otp_max_length: Option<u32>,
    pub additional_information: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorisationCode {
    pub chosen_method: ScaMethod,
    pub challenge_data: Option<ChallengeData>,
    pub psu_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoupledStarted {
    pub sca_status: ScaStatus,
    pub psu_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaVerification {
    /// Object status after the verified step: the consent's new status, the
    /// executed payment's status, or `CANC` for a cancellation.
    pub object_status: ObjectStatus,
    /// Wrong TAN, retries remain.
    pub attempt_failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationResult {
    pub sca_status: ScaStatus,
    pub object_status: Option<ObjectStatus>,
}

// ─── Trait ───────────────────────────────────────────────────────────

pub trait BankAdapter: Send + Sync {
    /// Human-readable adapter name for logs.
    fn name(&self) -> &str;

    fn start_authorisation(
        &self,
        ctx: &RequestContext,
        approach: ScaApproach,
        authorisation: &Authorisation,
        object: &BusinessObject,
    ) -> Result<StartedAuthorisation, AdapterError>;

    fn authorise_psu(
        &self,
        ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        psu: &PsuIdData,
        password: &str,
    ) -> Result<PsuAuthorisationStatus, AdapterError>;

    fn request_available_methods(
        &self,
        ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
    ) -> Result<Vec<ScaMethod>, AdapterError>;

    fn request_authorisation_code(
        &self,
        ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        method_id: &str,
    ) -> Result<AuthorisationCode, AdapterError>;

    fn start_decoupled(
        &self,
        ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        method_id: Option<&str>,
    ) -> Result<DecoupledStarted, AdapterError>;

    fn verify_sca(
        &self,
        ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        authentication_data: &str,
    ) -> Result<ScaVerification, AdapterError>;

    fn check_confirmation_code(
        &self,
        ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        confirmation_code: &str,
    ) -> Result<ConfirmationResult, AdapterError>;

    fn notify_confirmation_code_validation(
        &self,
        ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        code_correct: bool,
    ) -> Result<ConfirmationResult, AdapterError>;
}
