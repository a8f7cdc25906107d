//! # Status Writer
//!
//! Every SCA status write in the engine goes through [`StatusWriter`]. It
//! re-reads the record from the registry, so a stale copy held by the
//! caller can never resurrect a failed authorisation, and consults the
//! central transition table before writing.
//!
//! ```text
//!   write(id, to)
//!     │
//!     ├── record missing ─────────────► RegistryError::NotFound
//!     ├── current == to ──────────────► Unchanged
//!     ├── current → to not in table ──► Rejected { current }   (warn!)
//!     ├── registry refuses the write ─► Rejected { re-read }   (warn!)
//!     └── registry.update_status ─────► Applied                (info!)
//! ```
//!
//! The business object's status is written with [`apply_object_status`],
//! and only after the SCA status write it belongs to was not rejected.

use tracing::{info, warn};

use obsca_core::AuthorisationId;
use obsca_state::{BusinessObject, ConsentStatus, ObjectStatus, ScaStatus, TransactionStatus};

use crate::registry::{AuthorisationRegistry, RegistryError};

/// Result of a status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    Unchanged,
    /// The table refused the move. The stored status is `current`.
    Rejected { current: ScaStatus },
}

impl TransitionOutcome {
    /// Status stored after the write, given the requested target.
    pub fn resulting_status(&self, requested: ScaStatus) -> ScaStatus {
        match self {
            TransitionOutcome::Applied | TransitionOutcome::Unchanged => requested,
            TransitionOutcome::Rejected { current } => *current,
        }
    }
}

pub struct StatusWriter<'a> {
    registry: &'a dyn AuthorisationRegistry,
}

impl<'a> StatusWriter<'a> {
    pub fn new(registry: &'a dyn AuthorisationRegistry) -> Self {
        Self { registry }
    }

    pub fn write(&self, id: AuthorisationId, to: ScaStatus) -> Result<TransitionOutcome, RegistryError> {
        let current = self.current(id)?;

        if current == to {
            return Ok(TransitionOutcome::Unchanged);
        }
        if !current.can_transition_to(to) {
            warn!(
                authorisation_id = %id,
                from = %current,
                to = %to,
                "refused SCA status transition"
            );
            return Ok(TransitionOutcome::Rejected { current });
        }

        match self.registry.update_status(id, to) {
            Ok(()) => {}
            Err(RegistryError::Rejected(reason)) => {
                // The record moved between our read and the write.
                let current = self.current(id)?;
                warn!(
                    authorisation_id = %id,
                    current = %current,
                    to = %to,
                    reason = %reason,
                    "registry refused SCA status write"
                );
                return Ok(TransitionOutcome::Rejected { current });
            }
            Err(err) => return Err(err),
        }
        info!(authorisation_id = %id, from = %current, to = %to, "SCA status updated");
        Ok(TransitionOutcome::Applied)
    }

    fn current(&self, id: AuthorisationId) -> Result<ScaStatus, RegistryError> {
        Ok(self
            .registry
            .get_authorisation_by_id(id)?
            .ok_or_else(|| RegistryError::NotFound {
                kind: "authorisation",
                id: id.to_string(),
            })?
            .sca_status())
    }
}

/// Write the object status an SCA step reached and flag partially
/// authorised objects as multilevel. `object` is the copy the step ran
/// against.
pub fn apply_object_status(
    registry: &dyn AuthorisationRegistry,
    object: &BusinessObject,
    status: ObjectStatus,
) -> Result<(), RegistryError> {
    let partial = matches!(
        status,
        ObjectStatus::Consent(ConsentStatus::PartiallyAuthorised) | ObjectStatus::Payment(TransactionStatus::Patc)
    );
    if partial && !object.multilevel_sca_required {
        registry.update_multilevel_sca_required(&object.id, true)?;
    }
    if object.status != status {
        registry.update_object_status(&object.id, status)?;
        info!(object_id = %object.id, from = %object.status, to = %status, "business object status updated");
    }
    Ok(())
}
