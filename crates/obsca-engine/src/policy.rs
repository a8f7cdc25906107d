//! # Authorisation Policies
//!
//! The four business-object types share one orchestrator and differ only
//! in the rules captured here: which objects they accept, how a create
//! request is validated, when the object counts as expired, and where the
//! party list comes from.
//!
//! | Policy                      | Type                 | Service | Not found            | Expired               |
//! |-----------------------------|----------------------|---------|----------------------|-----------------------|
//! | [`AisConsentPolicy`]        | CONSENT              | AIS     | CONSENT_UNKNOWN_403  | CONSENT_EXPIRED       |
//! | [`PiisConsentPolicy`]       | CONSENT              | PIIS    | CONSENT_UNKNOWN_403  | CONSENT_EXPIRED       |
//! | [`PaymentPolicy`]           | PAYMENT_CREATION     | PIS     | RESOURCE_UNKNOWN_403 | RESOURCE_EXPIRED_403  |
//! | [`PaymentCancellationPolicy`] | PAYMENT_CANCELLATION | PIS   | RESOURCE_UNKNOWN_403 | RESOURCE_EXPIRED_403  |

use obsca_core::{AuthorisationType, MessageErrorCode, PsuIdData, ServiceType, Timestamp};
use obsca_state::{BusinessObject, ObjectStatus};

use crate::registry::{AuthorisationRegistry, RegistryError};

pub trait AuthorisationPolicy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn authorisation_type(&self) -> AuthorisationType;

    fn service_type(&self) -> ServiceType;

    fn not_found_code(&self) -> MessageErrorCode;

    fn expired_code(&self) -> MessageErrorCode;

    /// Whether this policy governs `object`. Objects of another service are
    /// reported as not found.
    fn accepts(&self, object: &BusinessObject) -> bool {
        object.service_type == self.service_type()
    }

    /// Type-specific create checks on the object's current status.
    fn validate_create(&self, object: &BusinessObject) -> Result<(), MessageErrorCode>;

    fn is_expired(&self, object: &BusinessObject, now: Timestamp) -> bool {
        object.is_expired(now)
    }

    fn party_list(
        &self,
        registry: &dyn AuthorisationRegistry,
        object: &BusinessObject,
    ) -> Result<Vec<PsuIdData>, RegistryError> {
        registry.get_party_list(&object.id)
    }
}

/// Consents in a terminal status other than EXPIRED cannot be authorised.
/// Expired ones fall through to the expiry check.
fn validate_consent(object: &BusinessObject) -> Result<(), MessageErrorCode> {
    match object.status {
        ObjectStatus::Consent(status) if status.is_terminal() && !object.is_expired(Timestamp::now()) => {
            Err(MessageErrorCode::ConsentInvalid)
        }
        ObjectStatus::Consent(_) => Ok(()),
        ObjectStatus::Payment(_) => Err(MessageErrorCode::ConsentUnknown403),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AisConsentPolicy;

impl AuthorisationPolicy for AisConsentPolicy {
    fn name(&self) -> &'static str {
        "ais-consent"
    }

    fn authorisation_type(&self) -> AuthorisationType {
        AuthorisationType::Consent
    }

    fn service_type(&self) -> ServiceType {
        ServiceType::Ais
    }

    fn not_found_code(&self) -> MessageErrorCode {
        MessageErrorCode::ConsentUnknown403
    }

    fn expired_code(&self) -> MessageErrorCode {
        MessageErrorCode::ConsentExpired
    }

    fn validate_create(&self, object: &BusinessObject) -> Result<(), MessageErrorCode> {
        validate_consent(object)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PiisConsentPolicy;

impl AuthorisationPolicy for PiisConsentPolicy {
    fn name(&self) -> &'static str {
        "piis-consent"
    }

    fn authorisation_type(&self) -> AuthorisationType {
        AuthorisationType::Consent
    }

    fn service_type(&self) -> ServiceType {
        ServiceType::Piis
    }

    fn not_found_code(&self) -> MessageErrorCode {
        MessageErrorCode::ConsentUnknown403
    }

    fn expired_code(&self) -> MessageErrorCode {
        MessageErrorCode::ConsentExpired
    }

    fn validate_create(&self, object: &BusinessObject) -> Result<(), MessageErrorCode> {
        validate_consent(object)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentPolicy;

impl AuthorisationPolicy for PaymentPolicy {
    fn name(&self) -> &'static str {
        "payment"
    }

    fn authorisation_type(&self) -> AuthorisationType {
        AuthorisationType::PaymentCreation
    }

    fn service_type(&self) -> ServiceType {
        ServiceType::Pis
    }

    fn not_found_code(&self) -> MessageErrorCode {
        MessageErrorCode::ResourceUnknown403
    }

    fn expired_code(&self) -> MessageErrorCode {
        MessageErrorCode::ResourceExpired403
    }

    fn validate_create(&self, object: &BusinessObject) -> Result<(), MessageErrorCode> {
        match object.status.payment() {
            Some(status) if status.is_finalised() => Err(MessageErrorCode::StatusInvalid),
            Some(_) => Ok(()),
            None => Err(MessageErrorCode::ResourceUnknown403),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentCancellationPolicy;

impl AuthorisationPolicy for PaymentCancellationPolicy {
    fn name(&self) -> &'static str {
        "payment-cancellation"
    }

    fn authorisation_type(&self) -> AuthorisationType {
        AuthorisationType::PaymentCancellation
    }

    fn service_type(&self) -> ServiceType {
        ServiceType::Pis
    }

    fn not_found_code(&self) -> MessageErrorCode {
        MessageErrorCode::ResourceUnknown403
    }

    fn expired_code(&self) -> MessageErrorCode {
        MessageErrorCode::ResourceExpired403
    }

    fn validate_create(&self, object: &BusinessObject) -> Result<(), MessageErrorCode> {
        match object.status.payment() {
            Some(status) if !status.is_cancellable() => Err(MessageErrorCode::StatusInvalid),
            Some(_) => Ok(()),
            None => Err(MessageErrorCode::ResourceUnknown403),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsca_core::BusinessObjectId;
    use obsca_state::{ConsentStatus, TransactionStatus};

    fn consent(status: ConsentStatus) -> BusinessObject {
        let mut object = BusinessObject::ais_consent(BusinessObjectId::new("c-1").unwrap(), PsuIdData::new("alice"));
        object.status = ObjectStatus::Consent(status);
        object
    }

    fn payment(status: TransactionStatus) -> BusinessObject {
        let mut object = BusinessObject::payment(BusinessObjectId::new("p-1").unwrap(), PsuIdData::new("alice"));
        object.status = ObjectStatus::Payment(status);
        object
    }

    #[test]
    fn test_policies_accept_their_service() {
        let ais = consent(ConsentStatus::Received);
        let pis = payment(TransactionStatus::Rcvd);
        assert!(AisConsentPolicy.accepts(&ais));
        assert!(!PiisConsentPolicy.accepts(&ais));
        assert!(!AisConsentPolicy.accepts(&pis));
        assert!(PaymentPolicy.accepts(&pis));
        assert!(PaymentCancellationPolicy.accepts(&pis));
    }

    #[test]
    fn test_terminal_consent_is_invalid() {
        assert_eq!(
            AisConsentPolicy.validate_create(&consent(ConsentStatus::RevokedByPsu)),
            Err(MessageErrorCode::ConsentInvalid)
        );
        assert_eq!(
            AisConsentPolicy.validate_create(&consent(ConsentStatus::Rejected)),
            Err(MessageErrorCode::ConsentInvalid)
        );
        assert_eq!(AisConsentPolicy.validate_create(&consent(ConsentStatus::Received)), Ok(()));
    }

    #[test]
    fn test_expired_consent_reaches_expiry_check() {
        let object = consent(ConsentStatus::Expired);
        assert_eq!(AisConsentPolicy.validate_create(&object), Ok(()));
        assert!(AisConsentPolicy.is_expired(&object, Timestamp::now()));
        assert_eq!(AisConsentPolicy.expired_code(), MessageErrorCode::ConsentExpired);
    }

    #[test]
    fn test_finalised_payment_cannot_be_authorised() {
        assert_eq!(
            PaymentPolicy.validate_create(&payment(TransactionStatus::Acsc)),
            Err(MessageErrorCode::StatusInvalid)
        );
        assert_eq!(PaymentPolicy.validate_create(&payment(TransactionStatus::Rcvd)), Ok(()));
    }

    #[test]
    fn test_cancelled_payment_cannot_be_cancelled() {
        assert_eq!(
            PaymentCancellationPolicy.validate_create(&payment(TransactionStatus::Canc)),
            Err(MessageErrorCode::StatusInvalid)
        );
        assert_eq!(
            PaymentCancellationPolicy.validate_create(&payment(TransactionStatus::Rjct)),
            Err(MessageErrorCode::StatusInvalid)
        );
        assert_eq!(PaymentCancellationPolicy.validate_create(&payment(TransactionStatus::Acsp)), Ok(()));
    }

    #[test]
    fn test_error_codes_by_family() {
        assert_eq!(PiisConsentPolicy.not_found_code(), MessageErrorCode::ConsentUnknown403);
        assert_eq!(PaymentPolicy.not_found_code(), MessageErrorCode::ResourceUnknown403);
        assert_eq!(PaymentCancellationPolicy.expired_code(), MessageErrorCode::ResourceExpired403);
        assert_eq!(PaymentCancellationPolicy.authorisation_type(), AuthorisationType::PaymentCancellation);
    }
}
