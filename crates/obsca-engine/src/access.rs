//! # Endpoint Access
//!
//! Some authorisation states block ordinary update calls. A redirect
//! authorisation only accepts a confirmation code, a decoupled one is
//! locked while the PSU confirms on their device, and anything waiting in
//! UNCONFIRMED must be finished by a code exchange.

use obsca_core::{AuthorisationId, ScaApproach};
use obsca_state::{Authorisation, ScaStatus};

use crate::registry::{AuthorisationRegistry, RegistryError};

/// Whether an update may proceed for `authorisation`.
pub fn is_endpoint_accessible(authorisation: &Authorisation, confirmation_code_received: bool) -> bool {
    let approach = authorisation.chosen_approach();
    if confirmation_code_received {
        return approach == ScaApproach::Redirect;
    }
    let status = authorisation.sca_status();
    match approach {
        ScaApproach::Redirect => false,
        ScaApproach::Decoupled if status == ScaStatus::ScaMethodSelected => false,
        _ => status != ScaStatus::Unconfirmed,
    }
}

pub struct EndpointAccessChecker<'a> {
    registry: &'a dyn AuthorisationRegistry,
}

impl<'a> EndpointAccessChecker<'a> {
    pub fn new(registry: &'a dyn AuthorisationRegistry) -> Self {
        Self { registry }
    }

    /// Unknown authorisations are reported accessible; the caller's lookup
    /// produces the not-found error.
    pub fn is_accessible(&self, id: AuthorisationId, confirmation_code_received: bool) -> Result<bool, RegistryError> {
        Ok(self
            .registry
            .get_authorisation_by_id(id)?
            .map(|auth| is_endpoint_accessible(&auth, confirmation_code_received))
            .unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsca_core::{AuthorisationType, BusinessObjectId, PsuIdData};

    use crate::memory::InMemoryRegistry;

    fn auth(approach: ScaApproach, status: ScaStatus) -> Authorisation {
        Authorisation::new(
            BusinessObjectId::new("c-1").unwrap(),
            AuthorisationType::Consent,
            PsuIdData::new("alice"),
            approach,
            status,
        )
    }

    #[test]
    fn test_code_only_accepted_for_redirect() {
        assert!(is_endpoint_accessible(&auth(ScaApproach::Redirect, ScaStatus::Unconfirmed), true));
        assert!(!is_endpoint_accessible(&auth(ScaApproach::Embedded, ScaStatus::Started), true));
        assert!(!is_endpoint_accessible(&auth(ScaApproach::Decoupled, ScaStatus::Started), true));
    }

    #[test]
    fn test_redirect_blocks_plain_updates() {
        assert!(!is_endpoint_accessible(&auth(ScaApproach::Redirect, ScaStatus::Started), false));
    }

    #[test]
    fn test_decoupled_blocked_while_in_progress() {
        assert!(is_endpoint_accessible(&auth(ScaApproach::Decoupled, ScaStatus::Started), false));
        assert!(!is_endpoint_accessible(
            &auth(ScaApproach::Decoupled, ScaStatus::ScaMethodSelected),
            false
        ));
    }

    #[test]
    fn test_unconfirmed_blocks_plain_updates() {
        assert!(!is_endpoint_accessible(&auth(ScaApproach::Embedded, ScaStatus::Unconfirmed), false));
        assert!(is_endpoint_accessible(
            &auth(ScaApproach::Embedded, ScaStatus::ScaMethodSelected),
            false
        ));
    }

    #[test]
    fn test_checker_by_id() {
        let registry = InMemoryRegistry::new();
        let record = auth(ScaApproach::Redirect, ScaStatus::Started);
        let id = record.id();
        registry.put_authorisation(record);

        let checker = EndpointAccessChecker::new(&registry);
        assert!(!checker.is_accessible(id, false).unwrap());
        assert!(checker.is_accessible(id, true).unwrap());
        assert!(checker.is_accessible(AuthorisationId::new(), false).unwrap());
    }
}
