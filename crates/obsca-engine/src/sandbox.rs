//! # Sandbox Bank
//!
//! Deterministic [`BankAdapter`] for tests and the CLI simulator. Accepts a
//! fixed password, TAN and confirmation code, offers a configurable method
//! list, and records every call so callers can assert which steps ran.

use parking_lot::Mutex;

use obsca_core::{AuthorisationType, MessageErrorCode, PsuIdData, ScaApproach};
use obsca_state::{
    Authorisation, BusinessObject, ConsentStatus, ObjectStatus, ScaMethod, ScaStatus, TransactionStatus,
};

use crate::adapter::{
    AdapterError, AuthorisationCode, BankAdapter, ChallengeData, ConfirmationResult, DecoupledStarted,
    PsuAuthorisationStatus, ScaVerification, StartedAuthorisation,
};
use crate::context::RequestContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    pub password: String,
    /// Password that yields an attempt failure instead of a hard failure.
    pub retry_password: Option<String>,
    pub tan: String,
    /// Code the bank issues at the end of a redirect SCA.
    pub confirmation_code: String,
    pub methods: Vec<ScaMethod>,
    /// PSU ids for which the bank waives SCA after the password step.
    pub exempt_psus: Vec<String>,
    /// Make `start_authorisation` fail.
    pub fail_start: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            password: "12345".to_string(),
            retry_password: None,
            tan: "123456".to_string(),
            confirmation_code: "a1b2c3".to_string(),
            methods: vec![
                ScaMethod::new("sms", "SMS OTP"),
                ScaMethod::new("chip", "chipTAN"),
            ],
            exempt_psus: Vec::new(),
            fail_start: false,
        }
    }
}

/// One recorded adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterCall {
    StartAuthorisation,
    AuthorisePsu,
    RequestAvailableMethods,
    RequestAuthorisationCode,
    StartDecoupled,
    VerifySca,
    CheckConfirmationCode,
    NotifyConfirmationCodeValidation,
}

#[derive(Debug, Default)]
pub struct SandboxBank {
    config: SandboxConfig,
    calls: Mutex<Vec<AdapterCall>>,
}

impl SandboxBank {
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            config,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn calls(&self) -> Vec<AdapterCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: AdapterCall) {
        self.calls.lock().push(call);
    }

    /// Status the object reaches once `psu` has authorised it.
    ///
    /// Multilevel objects stay partially authorised until the last
    /// registered party signs.
    fn authorised_status(authorisation: &Authorisation, object: &BusinessObject) -> ObjectStatus {
        let last_party = object
            .psu_list
            .last()
            .map(|last| last.same_party(&authorisation.psu))
            .unwrap_or(true);
        let partial = object.multilevel_sca_required && object.psu_list.len() > 1 && !last_party;
        match authorisation.authorisation_type() {
            AuthorisationType::Consent if partial => ObjectStatus::Consent(ConsentStatus::PartiallyAuthorised),
            AuthorisationType::Consent => ObjectStatus::Consent(ConsentStatus::Valid),
            AuthorisationType::PaymentCreation if partial => ObjectStatus::Payment(TransactionStatus::Patc),
            AuthorisationType::PaymentCreation => ObjectStatus::Payment(TransactionStatus::Acsp),
            AuthorisationType::PaymentCancellation => ObjectStatus::Payment(TransactionStatus::Canc),
        }
    }
}

impl BankAdapter for SandboxBank {
    fn name(&self) -> &str {
        "sandbox"
    }

    fn start_authorisation(
        &self,
        _ctx: &RequestContext,
        approach: ScaApproach,
        _authorisation: &Authorisation,
        _object: &BusinessObject,
    ) -> Result<StartedAuthorisation, AdapterError> {
        self.record(AdapterCall::StartAuthorisation);
        if self.config.fail_start {
            return Err(AdapterError::Unavailable("sandbox configured to fail start".into()));
        }
        let psu_message = match approach {
            ScaApproach::Redirect => Some("Please continue in your online banking".to_string()),
            ScaApproach::Embedded | ScaApproach::Decoupled => None,
        };
        Ok(StartedAuthorisation {
            sca_status: ScaStatus::Started,
            psu_message,
            messages: Vec::new(),
        })
    }

    fn authorise_psu(
        &self,
        _ctx: &RequestContext,
        _authorisation: &Authorisation,
        _object: &BusinessObject,
        psu: &PsuIdData,
        password: &str,
    ) -> Result<PsuAuthorisationStatus, AdapterError> {
        self.record(AdapterCall::AuthorisePsu);
        if password == self.config.password {
            let exempt = psu
                .psu_id
                .as_deref()
                .map(|id| self.config.exempt_psus.iter().any(|e| e == id))
                .unwrap_or(false);
            return Ok(if exempt {
                PsuAuthorisationStatus::Exempted
            } else {
                PsuAuthorisationStatus::Success
            });
        }
        if self.config.retry_password.as_deref() == Some(password) {
            return Ok(PsuAuthorisationStatus::AttemptFailure);
        }
        Ok(PsuAuthorisationStatus::Failure)
    }

    fn request_available_methods(
        &self,
        _ctx: &RequestContext,
        _authorisation: &Authorisation,
        _object: &BusinessObject,
    ) -> Result<Vec<ScaMethod>, AdapterError> {
        self.record(AdapterCall::RequestAvailableMethods);
        Ok(self.config.methods.clone())
    }

    fn request_authorisation_code(
        &self,
        _ctx: &RequestContext,
        _authorisation: &Authorisation,
        _object: &BusinessObject,
        method_id: &str,
    ) -> Result<AuthorisationCode, AdapterError> {
        self.record(AdapterCall::RequestAuthorisationCode);
        let method = self
            .config
            .methods
            .iter()
            .find(|m| m.method_id == method_id)
            .cloned()
            .ok_or(AdapterError::rejected(MessageErrorCode::ScaMethodUnknown))?;
        Ok(AuthorisationCode {
            psu_message: Some(format!("A TAN has been sent via {}", method.name)),
            chosen_method: method,
            challenge_data: Some(ChallengeData {
                otp_format: Some("integer".to_string()),
                otp_max_length: u32::try_from(self.config.tan.len()).ok(),
                additional_information: None,
            }),
        })
    }

    fn start_decoupled(
        &self,
        _ctx: &RequestContext,
        _authorisation: &Authorisation,
        _object: &BusinessObject,
        _method_id: Option<&str>,
    ) -> Result<DecoupledStarted, AdapterError> {
        self.record(AdapterCall::StartDecoupled);
        Ok(DecoupledStarted {
            sca_status: ScaStatus::ScaMethodSelected,
            psu_message: Some("Please confirm the request in your banking app".to_string()),
        })
    }

    fn verify_sca(
        &self,
        _ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        authentication_data: &str,
    ) -> Result<ScaVerification, AdapterError> {
        self.record(AdapterCall::VerifySca);
        if authentication_data != self.config.tan {
            return Err(AdapterError::Rejected {
                code: MessageErrorCode::PsuCredentialsInvalid,
                detail: Some("TAN rejected".to_string()),
            });
        }
        Ok(ScaVerification {
            object_status: Self::authorised_status(authorisation, object),
            attempt_failure: false,
        })
    }

    fn check_confirmation_code(
        &self,
        _ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        confirmation_code: &str,
    ) -> Result<ConfirmationResult, AdapterError> {
        self.record(AdapterCall::CheckConfirmationCode);
        Ok(if confirmation_code == self.config.confirmation_code {
            ConfirmationResult {
                sca_status: ScaStatus::Finalised,
                object_status: Some(Self::authorised_status(authorisation, object)),
            }
        } else {
            ConfirmationResult {
                sca_status: ScaStatus::Failed,
                object_status: None,
            }
        })
    }

    fn notify_confirmation_code_validation(
        &self,
        _ctx: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        code_correct: bool,
    ) -> Result<ConfirmationResult, AdapterError> {
        self.record(AdapterCall::NotifyConfirmationCodeValidation);
        Ok(if code_correct {
            ConfirmationResult {
                sca_status: ScaStatus::Finalised,
                object_status: Some(Self::authorised_status(authorisation, object)),
            }
        } else {
            ConfirmationResult {
                sca_status: ScaStatus::Failed,
                object_status: None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsca_core::BusinessObjectId;

    fn fixtures(authorisation_type: AuthorisationType) -> (Authorisation, BusinessObject) {
        let object = BusinessObject::ais_consent(BusinessObjectId::new("c-1").unwrap(), PsuIdData::new("alice"));
        let auth = Authorisation::new(
            object.id.clone(),
            authorisation_type,
            PsuIdData::new("alice"),
            ScaApproach::Embedded,
            ScaStatus::Started,
        );
        (auth, object)
    }

    #[test]
    fn test_password_outcomes() {
        let bank = SandboxBank::new(SandboxConfig {
            retry_password: Some("retry".into()),
            exempt_psus: vec!["vip".into()],
            ..SandboxConfig::default()
        });
        let ctx = RequestContext::new();
        let (auth, object) = fixtures(AuthorisationType::Consent);
        let alice = PsuIdData::new("alice");
        assert_eq!(
            bank.authorise_psu(&ctx, &auth, &object, &alice, "12345").unwrap(),
            PsuAuthorisationStatus::Success
        );
        assert_eq!(
            bank.authorise_psu(&ctx, &auth, &object, &alice, "retry").unwrap(),
            PsuAuthorisationStatus::AttemptFailure
        );
        assert_eq!(
            bank.authorise_psu(&ctx, &auth, &object, &alice, "nope").unwrap(),
            PsuAuthorisationStatus::Failure
        );
        assert_eq!(
            bank.authorise_psu(&ctx, &auth, &object, &PsuIdData::new("vip"), "12345").unwrap(),
            PsuAuthorisationStatus::Exempted
        );
        assert_eq!(bank.calls().len(), 4);
    }

    #[test]
    fn test_unknown_method_rejected() {
        let bank = SandboxBank::default();
        let (auth, object) = fixtures(AuthorisationType::Consent);
        let err = bank
            .request_authorisation_code(&RequestContext::new(), &auth, &object, "carrier-pigeon")
            .unwrap_err();
        assert_eq!(err.message_code(), MessageErrorCode::ScaMethodUnknown);
    }

    #[test]
    fn test_verify_per_authorisation_type() {
        let bank = SandboxBank::default();
        let ctx = RequestContext::new();
        let (auth, object) = fixtures(AuthorisationType::Consent);
        let v = bank.verify_sca(&ctx, &auth, &object, "123456").unwrap();
        assert_eq!(v.object_status, ObjectStatus::Consent(ConsentStatus::Valid));

        let (auth, object) = fixtures(AuthorisationType::PaymentCancellation);
        let v = bank.verify_sca(&ctx, &auth, &object, "123456").unwrap();
        assert_eq!(v.object_status, ObjectStatus::Payment(TransactionStatus::Canc));

        let err = bank.verify_sca(&ctx, &auth, &object, "000000").unwrap_err();
        assert_eq!(err.message_code(), MessageErrorCode::PsuCredentialsInvalid);
    }

    #[test]
    fn test_multilevel_partial_authorisation() {
        let bank = SandboxBank::default();
        let (auth, object) = fixtures(AuthorisationType::Consent);
        let object = object.with_multilevel(vec![PsuIdData::new("alice"), PsuIdData::new("bob")]);
        let v = bank.verify_sca(&RequestContext::new(), &auth, &object, "123456").unwrap();
        assert_eq!(v.object_status, ObjectStatus::Consent(ConsentStatus::PartiallyAuthorised));
    }

    #[test]
    fn test_fail_start() {
        let bank = SandboxBank::new(SandboxConfig {
            fail_start: true,
            ..SandboxConfig::default()
        });
        let (auth, object) = fixtures(AuthorisationType::Consent);
        assert!(bank
            .start_authorisation(&RequestContext::new(), ScaApproach::Embedded, &auth, &object)
            .is_err());
        assert_eq!(bank.calls(), vec![AdapterCall::StartAuthorisation]);
    }
}
