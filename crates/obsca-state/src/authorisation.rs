//! # Authorisation Record
//!
//! One PSU's tracked attempt to complete SCA for one business object.
//!
//! ## Invariants
//!
//! - `chosen_approach` is fixed by [`Authorisation::new`]; there is no
//!   setter, so an authorisation never changes approach mid-flight.
//! - `sca_status` changes only through [`Authorisation::transition_to`],
//!   which consults [`ScaStatus::allowed_next`]. A terminal status rejects
//!   every transition.
//! - Records are never deleted. The transition log is the audit trail.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use obsca_core::{AuthorisationId, AuthorisationType, BusinessObjectId, PsuIdData, ScaApproach, Timestamp};

use crate::sca::ScaStatus;

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorisationError {
    /// The target status is not reachable from the current one.
    #[error("invalid SCA transition: {from} -> {to}")]
    InvalidTransition { from: ScaStatus, to: ScaStatus },

    /// The authorisation has already reached a terminal status.
    #[error("authorisation is in terminal state {state}")]
    TerminalState { state: ScaStatus },
}

// ─── Supporting types ────────────────────────────────────────────────

/// An SCA method offered by the bank (SMS OTP, push TAN, chipTAN, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaMethod {
    pub method_id: String,
    pub name: String,
    /// Completed out of band on the PSU's device.
    pub decoupled: bool,
}

impl ScaMethod {
    pub fn new(method_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            method_id: method_id.into(),
            name: name.into(),
            decoupled: false,
        }
    }

    pub fn decoupled(method_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            decoupled: true,
            ..Self::new(method_id, name)
        }
    }
}

/// Record of an accepted status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaTransitionRecord {
    pub from_state: ScaStatus,
    pub to_state: ScaStatus,
    pub timestamp: Timestamp,
    pub reason: String,
}

// ─── Authorisation ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorisation {
    id: AuthorisationId,
    parent_id: BusinessObjectId,
    authorisation_type: AuthorisationType,
    chosen_approach: ScaApproach,
    sca_status: ScaStatus,
    /// Identity of the authorising party. Empty until supplied.
    pub psu: PsuIdData,
    /// Hex SHA-256 of the redirect confirmation code, once issued.
    pub confirmation_code_digest: Option<String>,
    /// Methods offered after PSU authentication.
    pub available_methods: Vec<ScaMethod>,
    pub chosen_method_id: Option<String>,
    /// Deadline for completing a redirect SCA.
    pub sca_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub transitions: Vec<ScaTransitionRecord>,
}

impl Authorisation {
    /// Create an authorisation. The approach is fixed for its lifetime.
    pub fn new(
        parent_id: BusinessObjectId,
        authorisation_type: AuthorisationType,
        psu: PsuIdData,
        chosen_approach: ScaApproach,
        initial_status: ScaStatus,
    ) -> Self {
        Self::with_id(
            AuthorisationId::new(),
            parent_id,
            authorisation_type,
            psu,
            chosen_approach,
            initial_status,
        )
    }

    /// Create an authorisation under a pre-generated id.
    pub fn with_id(
        id: AuthorisationId,
        parent_id: BusinessObjectId,
        authorisation_type: AuthorisationType,
        psu: PsuIdData,
        chosen_approach: ScaApproach,
        initial_status: ScaStatus,
    ) -> Self {
        Self {
            id,
            parent_id,
            authorisation_type,
            chosen_approach,
            sca_status: initial_status,
            psu,
            confirmation_code_digest: None,
            available_methods: Vec::new(),
            chosen_method_id: None,
            sca_expires_at: None,
            created_at: Timestamp::now(),
            transitions: Vec::new(),
        }
    }

    pub fn id(&self) -> AuthorisationId {
        self.id
    }

    pub fn parent_id(&self) -> &BusinessObjectId {
        &self.parent_id
    }

    pub fn authorisation_type(&self) -> AuthorisationType {
        self.authorisation_type
    }

    pub fn chosen_approach(&self) -> ScaApproach {
        self.chosen_approach
    }

    pub fn sca_status(&self) -> ScaStatus {
        self.sca_status
    }

    pub fn is_terminal(&self) -> bool {
        self.sca_status.is_terminal()
    }

    /// Whether this authorisation advances `object_id`.
    pub fn belongs_to(&self, object_id: &BusinessObjectId) -> bool {
        &self.parent_id == object_id
    }

    /// Move to `to`. Returns `Ok(false)` for a same-status write.
    pub fn transition_to(&mut self, to: ScaStatus, reason: &str) -> Result<bool, AuthorisationError> {
        if self.sca_status == to {
            return Ok(false);
        }
        if self.sca_status.is_terminal() {
            return Err(AuthorisationError::TerminalState {
                state: self.sca_status,
            });
        }
        if !self.sca_status.can_transition_to(to) {
            return Err(AuthorisationError::InvalidTransition {
                from: self.sca_status,
                to,
            });
        }
        self.transitions.push(ScaTransitionRecord {
            from_state: self.sca_status,
            to_state: to,
            timestamp: Timestamp::now(),
            reason: reason.to_string(),
        });
        self.sca_status = to;
        Ok(true)
    }

    /// Whether the redirect deadline has passed.
    pub fn is_sca_expired(&self, now: Timestamp) -> bool {
        self.sca_expires_at.map(|deadline| deadline < now).unwrap_or(false)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
