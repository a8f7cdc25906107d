//! Step handlers registered in the standard dispatch table.

use tracing::warn;

use obsca_core::{AuthorisationType, ErrorHolder, MessageErrorCode, ScaApproach, Timestamp};
use obsca_state::{ConsentStatus, ObjectStatus, ScaMethod, ScaStatus, TransactionStatus};

use super::dispatch::Processor;
use super::{AuthorisationResponse, ProcessorPayload, ProcessorRequest, ProcessorServices, ScaProgress};
use crate::adapter::{AdapterError, PsuAuthorisationStatus};
use crate::error::EngineError;
use crate::registry::AuthorisationUpdate;
use crate::request::UpdateAuthorisationRequest;

type StepResult = Result<AuthorisationResponse, EngineError>;

pub(crate) const REDIRECT_START: Processor = Processor::new("redirect-start", redirect_start);
pub(crate) const RECEIVED: Processor = Processor::new("received", received);
pub(crate) const PSU_IDENTIFIED: Processor = Processor::new("psu-identified", psu_identified);
pub(crate) const PSU_AUTHENTICATED: Processor = Processor::new("psu-authenticated", psu_authenticated);
pub(crate) const VERIFY_SCA: Processor = Processor::new("verify-sca", verify_sca);
pub(crate) const DECOUPLED_IN_PROGRESS: Processor = Processor::new("decoupled-in-progress", decoupled_in_progress);
pub(crate) const AWAITING_CONFIRMATION: Processor = Processor::new("awaiting-confirmation", awaiting_confirmation);
pub(crate) const FINALISED: Processor = Processor::new("finalised", finalised);
pub(crate) const FAILED: Processor = Processor::new("failed", failed);

// ─── Handlers ────────────────────────────────────────────────────────

fn redirect_start(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    match req.payload {
        ProcessorPayload::Start => start(svc, req),
        ProcessorPayload::Update(_) => Ok(error_response(
            req,
            req.current_status(),
            holder(req, MessageErrorCode::ServiceBlocked).with_text("redirect SCA is completed with a confirmation code"),
            None,
        )),
    }
}

fn received(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    match req.payload {
        ProcessorPayload::Start => start(svc, req),
        ProcessorPayload::Update(update) => identify_or_authenticate(svc, req, update),
    }
}

fn psu_identified(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    match req.payload {
        ProcessorPayload::Start => Ok(echo(req)),
        ProcessorPayload::Update(update) => identify_or_authenticate(svc, req, update),
    }
}

fn psu_authenticated(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    let ProcessorPayload::Update(update) = req.payload else {
        return Ok(echo(req));
    };
    match update.authentication_method_id.as_deref() {
        Some(method_id) => select_method(svc, req, method_id, &req.authorisation.available_methods),
        None => Ok(error_response(
            req,
            req.current_status(),
            holder(req, MessageErrorCode::ServiceInvalid400).with_text("authentication method id required"),
            None,
        )),
    }
}

fn verify_sca(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    let ProcessorPayload::Update(update) = req.payload else {
        return Ok(echo(req));
    };
    let Some(data) = update.sca_authentication_data.as_deref() else {
        return Ok(error_response(
            req,
            req.current_status(),
            holder(req, MessageErrorCode::ServiceInvalid400).with_text("SCA authentication data required"),
            None,
        ));
    };
    match svc.bank.verify_sca(req.context, req.authorisation, req.object, data) {
        Err(err) => Ok(adapter_failure(req, &err)),
        Ok(verification) if verification.attempt_failure => Ok(error_response(
            req,
            req.current_status(),
            holder(req, MessageErrorCode::PsuCredentialsInvalid).with_text("authentication data rejected, retry allowed"),
            None,
        )),
        Ok(verification) => Ok(respond(
            req,
            progress(req, ScaStatus::Finalised),
            Some(verification.object_status),
        )),
    }
}

fn decoupled_in_progress(_svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    match req.payload {
        ProcessorPayload::Start => Ok(echo(req)),
        ProcessorPayload::Update(_) => Ok(error_response(
            req,
            req.current_status(),
            holder(req, MessageErrorCode::ServiceBlocked).with_text("awaiting confirmation on the PSU's device"),
            None,
        )),
    }
}

fn awaiting_confirmation(_svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    Ok(error_response(
        req,
        req.current_status(),
        holder(req, MessageErrorCode::ServiceBlocked).with_text("awaiting confirmation code"),
        None,
    ))
}

fn finalised(_svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    Ok(echo(req))
}

fn failed(_svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    Ok(error_response(req, ScaStatus::Failed, holder(req, MessageErrorCode::StatusInvalid), None))
}

// ─── Shared steps ────────────────────────────────────────────────────

fn start(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    let auth = req.authorisation;
    let started = match svc.bank.start_authorisation(req.context, req.approach(), auth, req.object) {
        Ok(started) => started,
        Err(err) => {
            warn!(
                authorisation_id = %auth.id(),
                bank = svc.bank.name(),
                error = %err,
                "bank failed to start SCA"
            );
            let object_status = rejected_status(req.authorisation_type());
            let holder = ErrorHolder::from_messages(req.object.service_type, vec![err.to_tpp_message()]);
            return Ok(error_response(req, ScaStatus::Failed, holder, object_status));
        }
    };

    let mut progress = progress(req, started.sca_status);
    progress.psu_message = started.psu_message;
    progress.messages = started.messages;

    if req.approach() == ScaApproach::Redirect {
        let redirect_id = req
            .context
            .redirect_id
            .clone()
            .unwrap_or_else(|| auth.id().to_string());
        progress.redirect_link = Some(svc.profile.redirect_link(&redirect_id, req.object.id.as_str()));
        let lifetime = i64::try_from(svc.profile.redirect_url_expiration_secs).unwrap_or(i64::MAX);
        svc.registry.update_authorisation(
            auth.id(),
            AuthorisationUpdate {
                sca_expires_at: Some(Timestamp::now().plus_secs(lifetime)),
                ..AuthorisationUpdate::default()
            },
        )?;
    }
    Ok(respond(req, progress, None))
}

fn identify_or_authenticate(
    svc: &ProcessorServices<'_>,
    req: &ProcessorRequest<'_>,
    update: &UpdateAuthorisationRequest,
) -> StepResult {
    if update.is_identification_only() {
        return Ok(respond(req, progress(req, ScaStatus::PsuIdentified), None));
    }
    let Some(password) = update.password.as_deref() else {
        return Ok(error_response(
            req,
            req.current_status(),
            holder(req, MessageErrorCode::ServiceInvalid400).with_text("password required"),
            None,
        ));
    };
    let psu = if update.psu.is_empty() {
        &req.authorisation.psu
    } else {
        &update.psu
    };

    let outcome = match svc.bank.authorise_psu(req.context, req.authorisation, req.object, psu, password) {
        Ok(outcome) => outcome,
        Err(err) => return Ok(adapter_failure(req, &err)),
    };

    match outcome {
        PsuAuthorisationStatus::Failure => Ok(error_response(
            req,
            ScaStatus::Failed,
            holder(req, MessageErrorCode::PsuCredentialsInvalid),
            None,
        )),
        PsuAuthorisationStatus::AttemptFailure => Ok(error_response(
            req,
            req.current_status(),
            holder(req, MessageErrorCode::PsuCredentialsInvalid).with_text("invalid credentials, retry allowed"),
            None,
        )),
        PsuAuthorisationStatus::Exempted => Ok(respond(
            req,
            progress(req, ScaStatus::Exempted),
            Some(authorised_status(req.authorisation_type())),
        )),
        PsuAuthorisationStatus::Success if is_one_factor(svc, req) => Ok(respond(
            req,
            progress(req, ScaStatus::Finalised),
            Some(ObjectStatus::Consent(ConsentStatus::Valid)),
        )),
        PsuAuthorisationStatus::Success if req.approach() == ScaApproach::Decoupled => {
            start_decoupled(svc, req, None)
        }
        PsuAuthorisationStatus::Success => offer_methods(svc, req),
    }
}

fn offer_methods(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> StepResult {
    let methods = match svc.bank.request_available_methods(req.context, req.authorisation, req.object) {
        Ok(methods) => methods,
        Err(err) => return Ok(adapter_failure(req, &err)),
    };
    svc.registry.update_authorisation(
        req.authorisation.id(),
        AuthorisationUpdate {
            available_methods: Some(methods.clone()),
            ..AuthorisationUpdate::default()
        },
    )?;

    match methods.as_slice() {
        [] => {
            warn!(authorisation_id = %req.authorisation.id(), "bank offered no SCA methods");
            let object_status = rejected_status(req.authorisation_type());
            Ok(error_response(
                req,
                ScaStatus::Failed,
                holder(req, MessageErrorCode::ScaMethodUnknown),
                object_status,
            ))
        }
        [only] => select_method(svc, req, &only.method_id, &methods),
        _ => {
            let mut progress = progress(req, ScaStatus::PsuAuthenticated);
            progress.available_methods = methods;
            Ok(respond(req, progress, None))
        }
    }
}

fn select_method(
    svc: &ProcessorServices<'_>,
    req: &ProcessorRequest<'_>,
    method_id: &str,
    offered: &[ScaMethod],
) -> StepResult {
    if !offered.is_empty() && !offered.iter().any(|m| m.method_id == method_id) {
        return Ok(error_response(
            req,
            req.current_status(),
            holder(req, MessageErrorCode::ScaMethodUnknown),
            None,
        ));
    }
    if req.approach() == ScaApproach::Decoupled {
        return start_decoupled(svc, req, Some(method_id));
    }

    let code = match svc
        .bank
        .request_authorisation_code(req.context, req.authorisation, req.object, method_id)
    {
        Ok(code) => code,
        Err(err) => return Ok(adapter_failure(req, &err)),
    };
    svc.registry.update_authorisation(
        req.authorisation.id(),
        AuthorisationUpdate {
            chosen_method_id: Some(code.chosen_method.method_id.clone()),
            ..AuthorisationUpdate::default()
        },
    )?;

    let mut progress = progress(req, ScaStatus::ScaMethodSelected);
    progress.psu_message = code.psu_message;
    progress.challenge_data = code.challenge_data;
    progress.chosen_method = Some(code.chosen_method);
    Ok(respond(req, progress, None))
}

fn start_decoupled(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>, method_id: Option<&str>) -> StepResult {
    let started = match svc
        .bank
        .start_decoupled(req.context, req.authorisation, req.object, method_id)
    {
        Ok(started) => started,
        Err(err) => return Ok(adapter_failure(req, &err)),
    };
    if let Some(method_id) = method_id {
        svc.registry.update_authorisation(
            req.authorisation.id(),
            AuthorisationUpdate {
                chosen_method_id: Some(method_id.to_string()),
                ..AuthorisationUpdate::default()
            },
        )?;
    }
    let mut progress = progress(req, started.sca_status);
    progress.psu_message = started.psu_message;
    Ok(respond(req, progress, None))
}

// ─── Object consequences ─────────────────────────────────────────────

fn is_one_factor(svc: &ProcessorServices<'_>, req: &ProcessorRequest<'_>) -> bool {
    req.authorisation_type() == AuthorisationType::Consent
        && req.object.one_time_available_accounts
        && !svc.profile.sca_by_one_time_available_accounts_consent_required
}

/// Object status once SCA is waived.
fn authorised_status(authorisation_type: AuthorisationType) -> ObjectStatus {
    match authorisation_type {
        AuthorisationType::Consent => ObjectStatus::Consent(ConsentStatus::Valid),
        AuthorisationType::PaymentCreation => ObjectStatus::Payment(TransactionStatus::Acsp),
        AuthorisationType::PaymentCancellation => ObjectStatus::Payment(TransactionStatus::Canc),
    }
}

/// Object status after SCA could not proceed. Cancellations leave the
/// payment untouched.
fn rejected_status(authorisation_type: AuthorisationType) -> Option<ObjectStatus> {
    match authorisation_type {
        AuthorisationType::Consent => Some(ObjectStatus::Consent(ConsentStatus::Rejected)),
        AuthorisationType::PaymentCreation => Some(ObjectStatus::Payment(TransactionStatus::Rjct)),
        AuthorisationType::PaymentCancellation => None,
    }
}

// ─── Response helpers ────────────────────────────────────────────────

fn progress(req: &ProcessorRequest<'_>, status: ScaStatus) -> ScaProgress {
    ScaProgress::new(req.authorisation.id(), status, req.approach())
}

fn holder(req: &ProcessorRequest<'_>, code: MessageErrorCode) -> ErrorHolder {
    ErrorHolder::new(req.object.service_type, code)
}

fn respond(req: &ProcessorRequest<'_>, progress: ScaProgress, object_status: Option<ObjectStatus>) -> AuthorisationResponse {
    AuthorisationResponse::new(req.authorisation_type(), progress, object_status)
}

fn echo(req: &ProcessorRequest<'_>) -> AuthorisationResponse {
    respond(req, progress(req, req.current_status()), None)
}

fn error_response(
    req: &ProcessorRequest<'_>,
    status: ScaStatus,
    error: ErrorHolder,
    object_status: Option<ObjectStatus>,
) -> AuthorisationResponse {
    let mut progress = progress(req, status);
    progress.error = Some(error);
    respond(req, progress, object_status)
}

/// Adapter error: fail the authorisation only for credential errors.
fn adapter_failure(req: &ProcessorRequest<'_>, err: &AdapterError) -> AuthorisationResponse {
    let code = err.message_code();
    let status = if code.fails_authorisation() {
        ScaStatus::Failed
    } else {
        req.current_status()
    };
    warn!(
        authorisation_id = %req.authorisation.id(),
        code = %code,
        error = %err,
        "bank adapter reported failure"
    );
    let holder = ErrorHolder::from_messages(req.object.service_type, vec![err.to_tpp_message()]);
    error_response(req, status, holder, None)
}
