//! # Request Validation
//!
//! Checks shared by every business-object type. Failures are returned as
//! a [`MessageErrorCode`]; the orchestrator wraps them in an
//! [`ErrorHolder`](obsca_core::ErrorHolder) and, for credential codes,
//! fails the authorisation as a side effect.
//!
//! ## Update checks, in order
//!
//! 1. The authorisation belongs to the object and has the expected type.
//! 2. The authorisation has not already failed.
//! 3. Some PSU identity is known, on the request or on the record.
//! 4. A request PSU matches the recorded one.
//! 5. The request carries what the current stage needs. Skipped when a
//!    confirmation code is supplied.

use obsca_core::{AuthorisationType, MessageErrorCode, PsuIdData};
use obsca_state::{Authorisation, BusinessObject, ScaStatus};

use crate::request::UpdateAuthorisationRequest;

pub fn validate_update(
    request: &UpdateAuthorisationRequest,
    authorisation: &Authorisation,
    authorisation_type: AuthorisationType,
) -> Result<(), MessageErrorCode> {
    if !authorisation.belongs_to(&request.business_object_id) || authorisation.authorisation_type() != authorisation_type
    {
        return Err(MessageErrorCode::ResourceUnknown403);
    }
    if authorisation.sca_status() == ScaStatus::Failed {
        return Err(MessageErrorCode::StatusInvalid);
    }
    if request.psu.is_empty() && authorisation.psu.is_empty() {
        return Err(MessageErrorCode::FormatErrorNoPsu);
    }
    if !request.psu.is_empty() && !authorisation.psu.is_empty() && !request.psu.same_party(&authorisation.psu) {
        return Err(MessageErrorCode::PsuCredentialsInvalid);
    }
    if !request.has_confirmation_code() && !stage_satisfied(request, authorisation.sca_status()) {
        return Err(MessageErrorCode::ServiceInvalid400);
    }
    Ok(())
}

/// Whether the request carries the data the current SCA stage consumes.
fn stage_satisfied(request: &UpdateAuthorisationRequest, status: ScaStatus) -> bool {
    match status {
        ScaStatus::Received | ScaStatus::Started => !request.psu.is_empty(),
        ScaStatus::PsuIdentified => request.password.is_some(),
        ScaStatus::PsuAuthenticated => request.authentication_method_id.is_some(),
        ScaStatus::ScaMethodSelected => request.sca_authentication_data.is_some(),
        _ => true,
    }
}

/// Checks on a create request that apply to every object type.
///
/// `existing` are the object's authorisations of the same type.
pub fn validate_create_common(
    request_psu: &PsuIdData,
    object: &BusinessObject,
    existing: &[Authorisation],
) -> Result<(), MessageErrorCode> {
    if request_psu.is_empty() {
        return Ok(());
    }
    if !object.multilevel_sca_required && !object.psu_list.is_empty() && !object.has_party(request_psu) {
        return Err(MessageErrorCode::PsuCredentialsInvalid);
    }
    let already_finalised = existing
        .iter()
        .any(|auth| auth.sca_status() == ScaStatus::Finalised && auth.psu.same_party(request_psu));
    if already_finalised {
        return Err(MessageErrorCode::StatusInvalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsca_core::{BusinessObjectId, ScaApproach};

    fn object_id() -> BusinessObjectId {
        BusinessObjectId::new("c-1").unwrap()
    }

    fn auth(psu: PsuIdData, status: ScaStatus) -> Authorisation {
        Authorisation::new(object_id(), AuthorisationType::Consent, psu, ScaApproach::Embedded, status)
    }

    fn update(auth: &Authorisation, psu: PsuIdData) -> UpdateAuthorisationRequest {
        UpdateAuthorisationRequest::new(object_id(), auth.id(), psu)
    }

    #[test]
    fn test_wrong_object_is_unknown() {
        let record = auth(PsuIdData::new("alice"), ScaStatus::Started);
        let request = UpdateAuthorisationRequest::new(
            BusinessObjectId::new("other").unwrap(),
            record.id(),
            PsuIdData::new("alice"),
        );
        assert_eq!(
            validate_update(&request, &record, AuthorisationType::Consent),
            Err(MessageErrorCode::ResourceUnknown403)
        );
    }

    #[test]
    fn test_wrong_type_is_unknown() {
        let record = auth(PsuIdData::new("alice"), ScaStatus::Started);
        let request = update(&record, PsuIdData::new("alice"));
        assert_eq!(
            validate_update(&request, &record, AuthorisationType::PaymentCreation),
            Err(MessageErrorCode::ResourceUnknown403)
        );
    }

    #[test]
    fn test_failed_authorisation_is_status_invalid() {
        let record = auth(PsuIdData::new("alice"), ScaStatus::Failed);
        let request = update(&record, PsuIdData::new("alice")).with_password("12345");
        assert_eq!(
            validate_update(&request, &record, AuthorisationType::Consent),
            Err(MessageErrorCode::StatusInvalid)
        );
    }

    #[test]
    fn test_missing_psu() {
        let record = auth(PsuIdData::empty(), ScaStatus::Started);
        let request = update(&record, PsuIdData::empty()).with_password("12345");
        let code = validate_update(&request, &record, AuthorisationType::Consent).unwrap_err();
        assert_eq!(code, MessageErrorCode::FormatErrorNoPsu);
        assert!(code.fails_authorisation());
    }

    #[test]
    fn test_psu_mismatch() {
        let record = auth(PsuIdData::new("alice"), ScaStatus::Started);
        let request = update(&record, PsuIdData::new("mallory")).with_password("12345");
        let code = validate_update(&request, &record, AuthorisationType::Consent).unwrap_err();
        assert_eq!(code, MessageErrorCode::PsuCredentialsInvalid);
        assert!(code.fails_authorisation());
    }

    #[test]
    fn test_stage_requirements() {
        let identified = auth(PsuIdData::new("alice"), ScaStatus::PsuIdentified);
        assert_eq!(
            validate_update(&update(&identified, PsuIdData::new("alice")), &identified, AuthorisationType::Consent),
            Err(MessageErrorCode::ServiceInvalid400)
        );

        let authenticated = auth(PsuIdData::new("alice"), ScaStatus::PsuAuthenticated);
        let with_method = update(&authenticated, PsuIdData::empty()).with_method("sms");
        assert_eq!(validate_update(&with_method, &authenticated, AuthorisationType::Consent), Ok(()));

        let selected = auth(PsuIdData::new("alice"), ScaStatus::ScaMethodSelected);
        let without_tan = update(&selected, PsuIdData::empty()).with_password("12345");
        assert_eq!(
            validate_update(&without_tan, &selected, AuthorisationType::Consent),
            Err(MessageErrorCode::ServiceInvalid400)
        );
    }

    #[test]
    fn test_started_needs_request_psu() {
        let record = auth(PsuIdData::new("alice"), ScaStatus::Started);
        let anonymous = update(&record, PsuIdData::empty()).with_password("12345");
        assert_eq!(
            validate_update(&anonymous, &record, AuthorisationType::Consent),
            Err(MessageErrorCode::ServiceInvalid400)
        );
    }

    #[test]
    fn test_confirmation_code_skips_stage_check() {
        let record = auth(PsuIdData::new("alice"), ScaStatus::PsuIdentified);
        let request = update(&record, PsuIdData::empty()).with_confirmation_code("a1b2c3");
        assert_eq!(validate_update(&request, &record, AuthorisationType::Consent), Ok(()));
    }

    #[test]
    fn test_create_rejects_foreign_psu() {
        let object = BusinessObject::ais_consent(object_id(), PsuIdData::new("alice"));
        assert_eq!(
            validate_create_common(&PsuIdData::new("mallory"), &object, &[]),
            Err(MessageErrorCode::PsuCredentialsInvalid)
        );
        assert_eq!(validate_create_common(&PsuIdData::new("alice"), &object, &[]), Ok(()));
        assert_eq!(validate_create_common(&PsuIdData::empty(), &object, &[]), Ok(()));
    }

    #[test]
    fn test_create_accepts_new_party_on_multilevel() {
        let object = BusinessObject::ais_consent(object_id(), PsuIdData::new("alice"))
            .with_multilevel(vec![PsuIdData::new("alice")]);
        assert_eq!(validate_create_common(&PsuIdData::new("bob"), &object, &[]), Ok(()));
    }

    #[test]
    fn test_create_rejects_second_finalised_for_same_psu() {
        let object = BusinessObject::ais_consent(object_id(), PsuIdData::new("alice"));
        let done = auth(PsuIdData::new("alice"), ScaStatus::Finalised);
        let pending = auth(PsuIdData::new("alice"), ScaStatus::Started);
        assert_eq!(
            validate_create_common(&PsuIdData::new("alice"), &object, &[done]),
            Err(MessageErrorCode::StatusInvalid)
        );
        assert_eq!(validate_create_common(&PsuIdData::new("alice"), &object, &[pending]), Ok(()));
    }
}
