//! # Party Resolution
//!
//! Decides whose identity governs an authorisation when the request does
//! not carry one. For multilevel objects the engine cannot tell which of
//! the registered parties is calling, so it falls back to the first one.

use obsca_core::{AuthorisationId, PsuIdData};
use obsca_state::BusinessObject;

use crate::registry::{AuthorisationRegistry, RegistryError};

/// PSU to record on a new authorisation.
///
/// A non-empty request PSU always wins. Multilevel objects keep the request
/// PSU as-is, even when empty, so the party can identify itself later.
/// Otherwise the first registered party is used.
pub fn resolve_create_psu(request_psu: &PsuIdData, object: &BusinessObject, parties: &[PsuIdData]) -> PsuIdData {
    if !request_psu.is_empty() || object.multilevel_sca_required {
        return request_psu.clone();
    }
    parties.first().cloned().unwrap_or_else(|| request_psu.clone())
}

pub struct PartyResolver<'a> {
    registry: &'a dyn AuthorisationRegistry,
}

impl<'a> PartyResolver<'a> {
    pub fn new(registry: &'a dyn AuthorisationRegistry) -> Self {
        Self { registry }
    }

    /// The PSU recorded on the authorisation, else the first candidate,
    /// else an empty identity.
    pub fn resolve(&self, id: AuthorisationId, candidates: &[PsuIdData]) -> Result<PsuIdData, RegistryError> {
        let recorded = self
            .registry
            .get_authorisation_by_id(id)?
            .map(|auth| auth.psu)
            .filter(|psu| !psu.is_empty());
        Ok(recorded
            .or_else(|| candidates.first().cloned())
            .unwrap_or_else(PsuIdData::empty))
    }
}
