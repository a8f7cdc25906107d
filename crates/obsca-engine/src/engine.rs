//! # SCA Engine
//!
//! Wires the registry, bank adapter, profile and dispatch table into the
//! four orchestrators. Construction validates the profile and the dispatch
//! table, so a gap in the table stops the engine from starting instead of
//! surfacing on the first request that hits it.

use std::sync::Arc;

use tracing::info;

use obsca_core::{AuthorisationId, ScaApproach};
use obsca_state::ScaStatus;

use crate::access::EndpointAccessChecker;
use crate::adapter::BankAdapter;
use crate::config::AspspProfile;
use crate::context::RequestContext;
use crate::error::EngineError;
use crate::orchestrator::{EngineServices, Orchestrator};
use crate::policy::{AisConsentPolicy, PaymentCancellationPolicy, PaymentPolicy, PiisConsentPolicy};
use crate::processor::DispatchTable;
use crate::psu::{PsuReportError, PsuStatusReport, PsuStatusReporter};
use crate::registry::AuthorisationRegistry;
use crate::resolver;

pub struct ScaEngine {
    services: EngineServices,
    ais: Orchestrator<AisConsentPolicy>,
    piis: Orchestrator<PiisConsentPolicy>,
    payments: Orchestrator<PaymentPolicy>,
    cancellations: Orchestrator<PaymentCancellationPolicy>,
}

impl ScaEngine {
    /// Engine with the standard dispatch table.
    pub fn new(
        registry: Arc<dyn AuthorisationRegistry>,
        bank: Arc<dyn BankAdapter>,
        profile: AspspProfile,
    ) -> Result<Self, EngineError> {
        Self::with_dispatch(registry, bank, profile, DispatchTable::standard()?)
    }

    pub fn with_dispatch(
        registry: Arc<dyn AuthorisationRegistry>,
        bank: Arc<dyn BankAdapter>,
        profile: AspspProfile,
        dispatch: DispatchTable,
    ) -> Result<Self, EngineError> {
        profile.validate()?;
        dispatch.validate()?;
        info!(
            bank = bank.name(),
            approaches = ?profile.sca_approaches,
            processors = dispatch.len(),
            "SCA engine ready"
        );
        let services = EngineServices {
            registry,
            bank,
            profile: Arc::new(profile),
            dispatch: Arc::new(dispatch),
        };
        Ok(Self {
            ais: Orchestrator::new(services.clone(), AisConsentPolicy),
            piis: Orchestrator::new(services.clone(), PiisConsentPolicy),
            payments: Orchestrator::new(services.clone(), PaymentPolicy),
            cancellations: Orchestrator::new(services.clone(), PaymentCancellationPolicy),
            services,
        })
    }

    /// Account-information consents.
    pub fn ais(&self) -> &Orchestrator<AisConsentPolicy> {
        &self.ais
    }

    /// Funds-confirmation consents.
    pub fn piis(&self) -> &Orchestrator<PiisConsentPolicy> {
        &self.piis
    }

    pub fn payments(&self) -> &Orchestrator<PaymentPolicy> {
        &self.payments
    }

    pub fn cancellations(&self) -> &Orchestrator<PaymentCancellationPolicy> {
        &self.cancellations
    }

    pub fn profile(&self) -> &AspspProfile {
        &self.services.profile
    }

    /// Approach a new authorisation would get under `context`.
    pub fn resolve_approach(&self, context: &RequestContext) -> Option<ScaApproach> {
        resolver::resolve(
            &self.services.profile.sca_approaches,
            context.redirect_preferred,
            context.decoupled_preferred,
        )
    }

    /// Approach recorded on an existing authorisation.
    pub fn authorisation_approach(&self, id: AuthorisationId) -> Result<Option<ScaApproach>, EngineError> {
        Ok(self
            .services
            .registry
            .get_authorisation_by_id(id)?
            .map(|auth| auth.chosen_approach()))
    }

    pub fn is_endpoint_accessible(&self, id: AuthorisationId, confirmation_code_received: bool) -> Result<bool, EngineError> {
        Ok(EndpointAccessChecker::new(self.services.registry.as_ref()).is_accessible(id, confirmation_code_received)?)
    }

    /// Record the outcome the bank observed on the PSU's side.
    pub fn report_psu_status(&self, id: AuthorisationId, report: &PsuStatusReport) -> Result<ScaStatus, PsuReportError> {
        PsuStatusReporter::new(self.services.registry.as_ref(), &self.services.profile).report(id, report)
    }
}

impl std::fmt::Debug for ScaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaEngine").field("services", &self.services).finish()
    }
}
