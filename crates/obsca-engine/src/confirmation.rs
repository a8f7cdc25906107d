//! # Redirect Confirmation
//!
//! Finishes a redirect authorisation by exchanging the confirmation code
//! the PSU brought back from the bank. This path never goes through the
//! dispatch table.
//!
//! ```text
//!   status != UNCONFIRMED ──► SCA_INVALID, nothing written
//!   sca_expires_at passed ──► FAILED + RESOURCE_EXPIRED_403
//!   code checked locally  ──► digest compare, then notify the bank
//!   code checked by bank  ──► bank decides
//!   match                 ──► FINALISED + object status from the bank
//!   mismatch              ──► FAILED + SCA_INVALID
//! ```
//!
//! The handler writes nothing. The orchestrator persists the reported SCA
//! status and, once that write succeeds, the object status.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use obsca_core::{ErrorHolder, MessageErrorCode, Timestamp};
use obsca_state::{Authorisation, BusinessObject, ScaStatus};

use crate::context::RequestContext;
use crate::error::EngineError;
use crate::processor::{AuthorisationResponse, ProcessorServices, ScaProgress};

/// Hex-encoded SHA-256 of a confirmation code. Only digests are stored.
pub fn digest_confirmation_code(code: &str) -> String {
    Sha256::digest(code.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn digest_matches(stored: Option<&str>, code: &str) -> bool {
    match stored {
        Some(stored) => bool::from(stored.as_bytes().ct_eq(digest_confirmation_code(code).as_bytes())),
        None => false,
    }
}

pub struct ConfirmationHandler<'a> {
    services: ProcessorServices<'a>,
}

impl<'a> ConfirmationHandler<'a> {
    pub fn new(services: ProcessorServices<'a>) -> Self {
        Self { services }
    }

    /// Exchange `code` for a final SCA outcome. The response carries the
    /// status to persist; the caller writes it.
    pub fn process(
        &self,
        context: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        code: &str,
    ) -> Result<AuthorisationResponse, EngineError> {
        let id = authorisation.id();
        let svc = &self.services;

        if authorisation.sca_status() != ScaStatus::Unconfirmed {
            warn!(
                authorisation_id = %id,
                status = %authorisation.sca_status(),
                "confirmation code sent before the PSU finished SCA"
            );
            return Ok(failure(authorisation, object, authorisation.sca_status(), MessageErrorCode::ScaInvalid));
        }
        if authorisation.is_sca_expired(Timestamp::now()) {
            warn!(authorisation_id = %id, "redirect SCA window expired");
            return Ok(failure(authorisation, object, ScaStatus::Failed, MessageErrorCode::ResourceExpired403));
        }

        let checked = if svc.profile.confirmation_code_checked_locally {
            let correct = digest_matches(authorisation.confirmation_code_digest.as_deref(), code);
            svc.bank
                .notify_confirmation_code_validation(context, authorisation, object, correct)
                .map(|result| (correct && result.sca_status == ScaStatus::Finalised, result))
        } else {
            svc.bank
                .check_confirmation_code(context, authorisation, object, code)
                .map(|result| (result.sca_status == ScaStatus::Finalised, result))
        };

        let (confirmed, result) = match checked {
            Ok(checked) => checked,
            Err(err) => {
                warn!(authorisation_id = %id, error = %err, "bank failed to check confirmation code");
                let holder = ErrorHolder::from_messages(object.service_type, vec![err.to_tpp_message()]);
                let mut progress = ScaProgress::new(id, authorisation.sca_status(), authorisation.chosen_approach());
                progress.error = Some(holder);
                return Ok(AuthorisationResponse::new(authorisation.authorisation_type(), progress, None));
            }
        };

        if !confirmed {
            info!(authorisation_id = %id, "confirmation code rejected");
            let mut progress = ScaProgress::new(id, ScaStatus::Failed, authorisation.chosen_approach());
            progress.error = Some(ErrorHolder::new(object.service_type, MessageErrorCode::ScaInvalid));
            return Ok(AuthorisationResponse::new(
                authorisation.authorisation_type(),
                progress,
                result.object_status,
            ));
        }

        info!(authorisation_id = %id, "confirmation code accepted");
        let progress = ScaProgress::new(id, ScaStatus::Finalised, authorisation.chosen_approach());
        Ok(AuthorisationResponse::new(
            authorisation.authorisation_type(),
            progress,
            result.object_status,
        ))
    }
}

fn failure(
    authorisation: &Authorisation,
    object: &BusinessObject,
    status: ScaStatus,
    code: MessageErrorCode,
) -> AuthorisationResponse {
    let mut progress = ScaProgress::new(authorisation.id(), status, authorisation.chosen_approach());
    progress.error = Some(ErrorHolder::new(object.service_type, code));
    AuthorisationResponse::new(authorisation.authorisation_type(), progress, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsca_core::{AuthorisationType, BusinessObjectId, PsuIdData, ScaApproach};
    use obsca_state::{ConsentStatus, ObjectStatus};

    use crate::config::AspspProfile;
    use crate::memory::InMemoryRegistry;
    use crate::registry::AuthorisationRegistry;
    use crate::sandbox::{AdapterCall, SandboxBank, SandboxConfig};

    struct Fixture {
        registry: InMemoryRegistry,
        bank: SandboxBank,
        profile: AspspProfile,
        object: BusinessObject,
    }

    impl Fixture {
        fn new(checked_locally: bool) -> Self {
            let registry = InMemoryRegistry::new();
            let object = BusinessObject::ais_consent(BusinessObjectId::new("c-1").unwrap(), PsuIdData::new("alice"));
            registry.insert_object(object.clone());
            Self {
                registry,
                bank: SandboxBank::new(SandboxConfig::default()),
                profile: AspspProfile {
                    confirmation_code_checked_locally: checked_locally,
                    ..AspspProfile::default()
                },
                object,
            }
        }

        fn handler(&self) -> ConfirmationHandler<'_> {
            ConfirmationHandler::new(ProcessorServices {
                registry: &self.registry,
                bank: &self.bank,
                profile: &self.profile,
            })
        }

        fn authorisation(&self, status: ScaStatus) -> Authorisation {
            let mut auth = Authorisation::new(
                self.object.id.clone(),
                AuthorisationType::Consent,
                PsuIdData::new("alice"),
                ScaApproach::Redirect,
                status,
            );
            auth.confirmation_code_digest = Some(digest_confirmation_code("a1b2c3"));
            auth
        }
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        let digest = digest_confirmation_code("a1b2c3");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(digest_matches(Some(&digest), "a1b2c3"));
        assert!(!digest_matches(Some(&digest), "a1b2c4"));
        assert!(!digest_matches(None, "a1b2c3"));
    }

    #[test]
    fn test_bank_checked_code_finalises() {
        let fx = Fixture::new(false);
        let auth = fx.authorisation(ScaStatus::Unconfirmed);
        let response = fx
            .handler()
            .process(&RequestContext::new(), &auth, &fx.object, "a1b2c3")
            .unwrap();
        assert_eq!(response.sca_status(), ScaStatus::Finalised);
        assert!(response.error().is_none());
        assert_eq!(fx.bank.calls(), vec![AdapterCall::CheckConfirmationCode]);
        assert_eq!(response.object_status(), Some(ObjectStatus::Consent(ConsentStatus::Valid)));
        let stored = fx.registry.get_business_object_by_id(&fx.object.id).unwrap().unwrap();
        assert_eq!(stored.status, ObjectStatus::Consent(ConsentStatus::Received));
    }

    #[test]
    fn test_locally_checked_code_notifies_bank() {
        let fx = Fixture::new(true);
        let auth = fx.authorisation(ScaStatus::Unconfirmed);
        let response = fx
            .handler()
            .process(&RequestContext::new(), &auth, &fx.object, "a1b2c3")
            .unwrap();
        assert_eq!(response.sca_status(), ScaStatus::Finalised);
        assert_eq!(fx.bank.calls(), vec![AdapterCall::NotifyConfirmationCodeValidation]);
    }

    #[test]
    fn test_wrong_code_fails() {
        for locally in [true, false] {
            let fx = Fixture::new(locally);
            let auth = fx.authorisation(ScaStatus::Unconfirmed);
            let response = fx
                .handler()
                .process(&RequestContext::new(), &auth, &fx.object, "zzzzzz")
                .unwrap();
            assert_eq!(response.sca_status(), ScaStatus::Failed);
            assert!(response.error().unwrap().has_code(MessageErrorCode::ScaInvalid));
        }
    }

    #[test]
    fn test_code_before_unconfirmed_is_invalid() {
        let fx = Fixture::new(false);
        let auth = fx.authorisation(ScaStatus::Started);
        let response = fx
            .handler()
            .process(&RequestContext::new(), &auth, &fx.object, "a1b2c3")
            .unwrap();
        assert_eq!(response.sca_status(), ScaStatus::Started);
        assert!(response.error().unwrap().has_code(MessageErrorCode::ScaInvalid));
        assert!(fx.bank.calls().is_empty());
    }

    #[test]
    fn test_expired_window_fails() {
        let fx = Fixture::new(false);
        let mut auth = fx.authorisation(ScaStatus::Unconfirmed);
        auth.sca_expires_at = Some(Timestamp::now().plus_secs(-60));
        let response = fx
            .handler()
            .process(&RequestContext::new(), &auth, &fx.object, "a1b2c3")
            .unwrap();
        assert_eq!(response.sca_status(), ScaStatus::Failed);
        assert!(response.error().unwrap().has_code(MessageErrorCode::ResourceExpired403));
        assert!(fx.bank.calls().is_empty());
    }
}
