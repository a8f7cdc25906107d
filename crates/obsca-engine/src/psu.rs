//! # PSU-Side Status Reports
//!
//! The bank's redirect page and decoupled app report how the PSU finished
//! SCA. A successful redirect outcome is parked in UNCONFIRMED when the
//! profile mandates a confirmation request, and the TPP must then complete
//! it with the code the PSU brought back. Only the code's digest is kept.

use thiserror::Error;
use tracing::info;

use obsca_core::{AuthorisationId, ScaApproach};
use obsca_state::{ObjectStatus, ScaStatus};

use crate::config::AspspProfile;
use crate::confirmation::digest_confirmation_code;
use crate::error::EngineError;
use crate::registry::{AuthorisationRegistry, AuthorisationUpdate};
use crate::status::{StatusWriter, TransitionOutcome};

#[derive(Error, Debug)]
pub enum PsuReportError {
    #[error("authorisation {0} not found")]
    UnknownAuthorisation(AuthorisationId),

    /// Confirmation is mandated but the report carried no code.
    #[error("authorisation {0} requires a confirmation code")]
    MissingConfirmationCode(AuthorisationId),

    #[error("authorisation {id} is {current}, cannot report {reported}")]
    TransitionRefused {
        id: AuthorisationId,
        current: ScaStatus,
        reported: ScaStatus,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// What the bank observed on its side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsuStatusReport {
    pub sca_status: ScaStatus,
    pub confirmation_code: Option<String>,
    /// Object status to record alongside the SCA outcome.
    pub object_status: Option<ObjectStatus>,
}

impl PsuStatusReport {
    pub fn new(sca_status: ScaStatus) -> Self {
        Self {
            sca_status,
            confirmation_code: None,
            object_status: None,
        }
    }

    pub fn with_confirmation_code(mut self, code: impl Into<String>) -> Self {
        self.confirmation_code = Some(code.into());
        self
    }

    pub fn with_object_status(mut self, status: ObjectStatus) -> Self {
        self.object_status = Some(status);
        self
    }
}

pub struct PsuStatusReporter<'a> {
    registry: &'a dyn AuthorisationRegistry,
    profile: &'a AspspProfile,
}

impl<'a> PsuStatusReporter<'a> {
    pub fn new(registry: &'a dyn AuthorisationRegistry, profile: &'a AspspProfile) -> Self {
        Self { registry, profile }
    }

    /// Record the reported outcome. Returns the stored SCA status.
    pub fn report(&self, id: AuthorisationId, report: &PsuStatusReport) -> Result<ScaStatus, PsuReportError> {
        let authorisation = self
            .registry
            .get_authorisation_by_id(id)
            .map_err(EngineError::from)?
            .ok_or(PsuReportError::UnknownAuthorisation(id))?;

        let parks = authorisation.chosen_approach() == ScaApproach::Redirect
            && report.sca_status == ScaStatus::Finalised
            && self.profile.authorisation_confirmation_request_mandated;
        let code = if parks {
            let code = report
                .confirmation_code
                .as_deref()
                .filter(|code| !code.is_empty())
                .ok_or(PsuReportError::MissingConfirmationCode(id))?;
            Some(code)
        } else {
            None
        };
        let target = if parks { ScaStatus::Unconfirmed } else { report.sca_status };

        let outcome = StatusWriter::new(self.registry)
            .write(id, target)
            .map_err(EngineError::from)?;
        if let TransitionOutcome::Rejected { current } = outcome {
            return Err(PsuReportError::TransitionRefused {
                id,
                current,
                reported: target,
            });
        }

        // Stored only once the authorisation is actually parked.
        if let Some(code) = code {
            self.registry
                .update_authorisation(
                    id,
                    AuthorisationUpdate {
                        confirmation_code_digest: Some(digest_confirmation_code(code)),
                        ..AuthorisationUpdate::default()
                    },
                )
                .map_err(EngineError::from)?;
        }

        // A parked redirect records the object status at confirmation.
        match report.object_status {
            Some(object_status) if !parks => self
                .registry
                .update_object_status(authorisation.parent_id(), object_status)
                .map_err(EngineError::from)?,
            _ => {}
        }
        info!(
            authorisation_id = %id,
            reported = %report.sca_status,
            stored = %target,
            "PSU status report recorded"
        );
        Ok(target)
    }
}
