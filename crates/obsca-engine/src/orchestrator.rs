//! # Authorisation Orchestrator
//!
//! One orchestrator implementation serves consents, funds-confirmation
//! consents, payments and payment cancellations. The differences live in
//! the injected [`AuthorisationPolicy`].
//!
//! ## Create
//!
//! ```text
//!   object exists? ── no ──► NOT_FOUND
//!   validate create ─ fail ► VALIDATION / CREDENTIALS (nothing created)
//!   expired? ──────── yes ─► EXPIRED
//!   resolve PSU + approach, insert record in STARTED
//!   dispatch start step, persist resulting status, then object status
//!   inline password? ─ yes ► continue into update with the same id
//! ```
//!
//! ## Update
//!
//! ```text
//!   object exists? → authorisation exists and belongs to it?
//!   → endpoint accessible?
//!   → validate (credential failures fail the authorisation) → expired?
//!   → REDIRECT: confirmation handler │ otherwise: dispatch
//!   → persist resulting status → object status, unless the write was refused
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use obsca_core::{
    AuthorisationId, BusinessObjectId, ErrorHolder, MessageErrorCode, Outcome, PsuIdData, ScaApproach, Timestamp,
};
use obsca_state::{Authorisation, BusinessObject, ScaStatus};

use crate::access::is_endpoint_accessible;
use crate::adapter::BankAdapter;
use crate::config::AspspProfile;
use crate::confirmation::ConfirmationHandler;
use crate::context::RequestContext;
use crate::error::EngineError;
use crate::party::{resolve_create_psu, PartyResolver};
use crate::policy::AuthorisationPolicy;
use crate::processor::{AuthorisationResponse, DispatchTable, ProcessorPayload, ProcessorRequest, ProcessorServices};
use crate::registry::{AuthorisationRegistry, AuthorisationUpdate};
use crate::request::{CreateAuthorisationRequest, UpdateAuthorisationRequest};
use crate::resolver;
use crate::status::{apply_object_status, StatusWriter, TransitionOutcome};
use crate::validation::{validate_create_common, validate_update};

/// Collaborators shared by every orchestrator.
#[derive(Clone)]
pub struct EngineServices {
    pub registry: Arc<dyn AuthorisationRegistry>,
    pub bank: Arc<dyn BankAdapter>,
    pub profile: Arc<AspspProfile>,
    pub dispatch: Arc<DispatchTable>,
}

impl EngineServices {
    pub fn processor_services(&self) -> ProcessorServices<'_> {
        ProcessorServices {
            registry: self.registry.as_ref(),
            bank: self.bank.as_ref(),
            profile: self.profile.as_ref(),
        }
    }
}

impl std::fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineServices")
            .field("bank", &self.bank.name())
            .field("profile", &self.profile)
            .field("processors", &self.dispatch.len())
            .finish()
    }
}

/// Answer to a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaStatusResponse {
    pub sca_status: ScaStatus,
    pub psu: PsuIdData,
    pub approach: ScaApproach,
}

pub struct Orchestrator<P> {
    services: EngineServices,
    policy: P,
}

impl<P: AuthorisationPolicy> Orchestrator<P> {
    /// Orchestrator over `services` for the object family `policy` serves.
    pub fn new(services: EngineServices, policy: P) -> Self {
        Self { services, policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    // ─── Create ──────────────────────────────────────────────────────

    pub fn create(
        &self,
        context: &RequestContext,
        request: &CreateAuthorisationRequest,
    ) -> Result<Outcome<AuthorisationResponse>, EngineError> {
        let registry = self.services.registry.as_ref();
        let Some(object) = self.load_object(&request.business_object_id)? else {
            return Ok(self.failure(self.policy.not_found_code()));
        };

        let existing = registry.list_authorisations(&object.id, self.policy.authorisation_type())?;
        let validated = self
            .policy
            .validate_create(&object)
            .and_then(|()| validate_create_common(&request.psu, &object, &existing));
        if let Err(code) = validated {
            warn!(
                policy = self.policy.name(),
                object_id = %object.id,
                code = %code,
                "create authorisation rejected"
            );
            return Ok(self.failure(code));
        }
        if self.policy.is_expired(&object, Timestamp::now()) {
            return Ok(self.failure(self.policy.expired_code()));
        }

        let parties = self.policy.party_list(registry, &object)?;
        let psu = resolve_create_psu(&request.psu, &object, &parties);
        let profile = &self.services.profile;
        let approach = resolver::resolve(
            &profile.sca_approaches,
            context.redirect_preferred,
            context.decoupled_preferred,
        )
        .ok_or_else(|| EngineError::Configuration("profile enables no SCA approach".to_string()))?;

        let record = Authorisation::new(
            object.id.clone(),
            self.policy.authorisation_type(),
            psu.clone(),
            approach,
            ScaStatus::Started,
        );
        let id = record.id();
        registry.create_authorisation(record.clone())?;
        info!(
            policy = self.policy.name(),
            authorisation_id = %id,
            object_id = %object.id,
            approach = %approach,
            psu = %psu,
            request_id = %context.request_id,
            "authorisation created"
        );

        let response = self.dispatch(context, &record, &object, &ProcessorPayload::Start)?;
        let response = self.persist(id, &object, response)?;
        if let Some(error) = response.error() {
            return Ok(Outcome::Failure(error.clone()));
        }

        let chains = matches!(approach, ScaApproach::Embedded | ScaApproach::Decoupled) && !psu.is_empty();
        match request.password.as_deref() {
            Some(password) if chains => {
                let update = UpdateAuthorisationRequest::new(object.id.clone(), id, psu).with_password(password);
                self.update(context, &update)
            }
            _ => Ok(Outcome::Success(response)),
        }
    }

    // ─── Update ──────────────────────────────────────────────────────

    pub fn update(
        &self,
        context: &RequestContext,
        request: &UpdateAuthorisationRequest,
    ) -> Result<Outcome<AuthorisationResponse>, EngineError> {
        let registry = self.services.registry.as_ref();
        let Some(object) = self.load_object(&request.business_object_id)? else {
            return Ok(self.failure(self.policy.not_found_code()));
        };
        let authorisation = registry
            .get_authorisation_by_id(request.authorisation_id)?
            .filter(|auth| auth.belongs_to(&object.id) && auth.authorisation_type() == self.policy.authorisation_type());
        let Some(mut authorisation) = authorisation else {
            return Ok(self.failure(MessageErrorCode::ResourceUnknown403));
        };
        let id = authorisation.id();

        if !is_endpoint_accessible(&authorisation, request.has_confirmation_code()) {
            warn!(
                authorisation_id = %id,
                approach = %authorisation.chosen_approach(),
                status = %authorisation.sca_status(),
                "update blocked in current state"
            );
            return Ok(self.failure(MessageErrorCode::ServiceBlocked));
        }

        if let Err(code) = validate_update(request, &authorisation, self.policy.authorisation_type()) {
            warn!(authorisation_id = %id, code = %code, "update authorisation rejected");
            if code.fails_authorisation() {
                StatusWriter::new(registry).write(id, ScaStatus::Failed)?;
            }
            return Ok(self.failure(code));
        }
        if self.policy.is_expired(&object, Timestamp::now()) {
            return Ok(self.failure(self.policy.expired_code()));
        }

        if authorisation.psu.is_empty() && !request.psu.is_empty() {
            registry.update_authorisation(
                id,
                AuthorisationUpdate {
                    psu: Some(request.psu.clone()),
                    ..AuthorisationUpdate::default()
                },
            )?;
            authorisation.psu = request.psu.clone();
        }

        let response = match (authorisation.chosen_approach(), request.confirmation_code.as_deref()) {
            (ScaApproach::Redirect, Some(code)) => ConfirmationHandler::new(self.services.processor_services())
                .process(context, &authorisation, &object, code)?,
            (ScaApproach::Redirect, None) => return Ok(self.failure(MessageErrorCode::ServiceBlocked)),
            _ => {
                let payload = ProcessorPayload::Update(request.clone());
                self.dispatch(context, &authorisation, &object, &payload)?
            }
        };

        let response = self.persist(id, &object, response)?;
        Ok(match response.error() {
            Some(error) => Outcome::Failure(error.clone()),
            None => Outcome::Success(response),
        })
    }

    // ─── Queries ─────────────────────────────────────────────────────

    pub fn get_sca_status(
        &self,
        object_id: &BusinessObjectId,
        authorisation_id: AuthorisationId,
    ) -> Result<Outcome<ScaStatusResponse>, EngineError> {
        let registry = self.services.registry.as_ref();
        let Some(object) = self.load_object(object_id)? else {
            return Ok(self.failure(self.policy.not_found_code()));
        };
        let authorisation = registry
            .get_authorisation_by_id(authorisation_id)?
            .filter(|auth| auth.belongs_to(object_id) && auth.authorisation_type() == self.policy.authorisation_type());
        let Some(authorisation) = authorisation else {
            return Ok(self.failure(MessageErrorCode::ResourceUnknown403));
        };

        let parties = self.policy.party_list(registry, &object)?;
        let psu = PartyResolver::new(registry).resolve(authorisation_id, &parties)?;
        Ok(Outcome::Success(ScaStatusResponse {
            sca_status: authorisation.sca_status(),
            psu,
            approach: authorisation.chosen_approach(),
        }))
    }

    /// Ids of the object's authorisations of this orchestrator's type,
    /// oldest first.
    pub fn list_authorisations(
        &self,
        object_id: &BusinessObjectId,
    ) -> Result<Outcome<Vec<AuthorisationId>>, EngineError> {
        if self.load_object(object_id)?.is_none() {
            return Ok(self.failure(self.policy.not_found_code()));
        }
        let ids: Vec<AuthorisationId> = self
            .services
            .registry
            .list_authorisations(object_id, self.policy.authorisation_type())?
            .iter()
            .map(Authorisation::id)
            .collect();
        if ids.is_empty() {
            return Ok(self.failure(MessageErrorCode::ResourceUnknown404));
        }
        Ok(Outcome::Success(ids))
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn load_object(&self, id: &BusinessObjectId) -> Result<Option<BusinessObject>, EngineError> {
        Ok(self
            .services
            .registry
            .get_business_object_by_id(id)?
            .filter(|object| self.policy.accepts(object)))
    }

    fn dispatch(
        &self,
        context: &RequestContext,
        authorisation: &Authorisation,
        object: &BusinessObject,
        payload: &ProcessorPayload,
    ) -> Result<AuthorisationResponse, EngineError> {
        let request = ProcessorRequest {
            context,
            authorisation,
            object,
            payload,
        };
        self.services
            .dispatch
            .dispatch(&self.services.processor_services(), &request)
    }

    /// Write the status a step produced, then the object status it
    /// reached. A response carrying an error is persisted only when it
    /// fails the authorisation. If the SCA write is refused the object is
    /// left alone and the response reports the stored status.
    fn persist(
        &self,
        id: AuthorisationId,
        object: &BusinessObject,
        mut response: AuthorisationResponse,
    ) -> Result<AuthorisationResponse, EngineError> {
        let status = response.sca_status();
        if response.error().is_some() && status != ScaStatus::Failed {
            return Ok(response);
        }
        let registry = self.services.registry.as_ref();
        match StatusWriter::new(registry).write(id, status)? {
            TransitionOutcome::Rejected { current } => {
                warn!(
                    authorisation_id = %id,
                    object_id = %object.id,
                    stored = %current,
                    "SCA status write refused, object status left unchanged"
                );
                let mut progress = response.progress().clone();
                progress.sca_status = current;
                response = AuthorisationResponse::new(self.policy.authorisation_type(), progress, None);
            }
            TransitionOutcome::Applied | TransitionOutcome::Unchanged => {
                if let Some(object_status) = response.object_status() {
                    apply_object_status(registry, object, object_status)?;
                }
            }
        }
        Ok(response)
    }

    fn failure<T>(&self, code: MessageErrorCode) -> Outcome<T> {
        Outcome::Failure(ErrorHolder::new(self.policy.service_type(), code))
    }
}
