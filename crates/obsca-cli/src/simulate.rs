//! # Simulate Subcommand
//!
//! Runs one SCA scenario end to end against an in-memory registry and the
//! sandbox bank, printing every step as JSON. Useful for checking a
//! profile before pointing the engine at a real bank connector.
//!
//! ```text
//!   embedded:   create ─► password ─► method ─► TAN
//!   redirect:   create ─► PSU report ─► confirmation code
//!   decoupled:  create + password ─► PSU report
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use obsca_core::{AuthorisationId, BusinessObjectId, Outcome, PsuIdData, ScaApproach};
use obsca_engine::{
    AuthorisationPolicy, AuthorisationRegistry, AuthorisationResponse, CreateAuthorisationRequest, InMemoryRegistry,
    Orchestrator, PsuStatusReport, RequestContext, SandboxBank, SandboxConfig, ScaEngine, UpdateAuthorisationRequest,
};
use obsca_state::{BusinessObject, ConsentStatus, ObjectStatus, ScaStatus, TransactionStatus};

/// Upper bound on embedded update calls; the happy path needs three.
const MAX_EMBEDDED_UPDATES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Embedded,
    Redirect,
    Decoupled,
}

impl Scenario {
    pub fn approach(self) -> ScaApproach {
        match self {
            Self::Embedded => ScaApproach::Embedded,
            Self::Redirect => ScaApproach::Redirect,
            Self::Decoupled => ScaApproach::Decoupled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Account-information consent.
    #[default]
    Ais,
    /// Funds-confirmation consent.
    Piis,
    Payment,
}

/// Arguments for the `obsca simulate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(value_enum)]
    pub scenario: Scenario,

    #[arg(long, value_enum, default_value_t = ObjectKind::Ais)]
    pub object: ObjectKind,

    /// Profile file. The scenario's approach replaces its approach list.
    #[arg(long)]
    pub profile: Option<PathBuf>,

    #[arg(long, default_value = "alice")]
    pub psu: String,

    /// Password the TPP forwards. The sandbox accepts `12345`.
    #[arg(long, default_value = "12345")]
    pub password: String,

    #[arg(long, default_value = "sms")]
    pub method: String,

    /// TAN the TPP forwards. The sandbox accepts `123456`.
    #[arg(long, default_value = "123456")]
    pub tan: String,

    /// Code the TPP sends back after a redirect. The sandbox bank issues
    /// `a1b2c3`.
    #[arg(long, default_value = "a1b2c3")]
    pub confirmation_code: String,
}

/// One engine call and what it returned.
#[derive(Debug, Serialize)]
pub struct Step {
    pub name: &'static str,
    pub sca_status: Option<ScaStatus>,
    pub result: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct Transcript {
    pub scenario: Scenario,
    pub object: ObjectKind,
    pub authorisation_id: Option<AuthorisationId>,
    pub steps: Vec<Step>,
    pub final_status: Option<ScaStatus>,
    pub object_status: Option<ObjectStatus>,
}

impl Transcript {
    fn new(scenario: Scenario, object: ObjectKind) -> Self {
        Self {
            scenario,
            object,
            authorisation_id: None,
            steps: Vec::new(),
            final_status: None,
            object_status: None,
        }
    }

    /// Record an orchestrator outcome. Returns the new status on success.
    fn record(&mut self, name: &'static str, outcome: &Outcome<AuthorisationResponse>) -> Result<Option<ScaStatus>> {
        let status = outcome.success().map(AuthorisationResponse::sca_status);
        if let Some(response) = outcome.success() {
            self.authorisation_id.get_or_insert(response.authorisation_id());
        }
        self.steps.push(Step {
            name,
            sca_status: status,
            result: serde_json::to_value(outcome)?,
        });
        Ok(status)
    }

    /// Whether the authorisation ended in a successful terminal status.
    pub fn succeeded(&self) -> bool {
        self.final_status.is_some_and(|status| status.is_finalised())
    }
}

/// Execute the simulate subcommand.
///
/// Returns exit code: 0 when the authorisation finalised, 1 otherwise.
pub fn run_simulate(args: &SimulateArgs) -> Result<u8> {
    let transcript = simulate(args)?;
    println!("{}", serde_json::to_string_pretty(&transcript)?);
    Ok(if transcript.succeeded() { 0 } else { 1 })
}

/// Run the scenario against a fresh registry and sandbox bank.
pub fn simulate(args: &SimulateArgs) -> Result<Transcript> {
    let mut profile = crate::load_profile(args.profile.as_deref())?;
    profile.sca_approaches = vec![args.scenario.approach()];

    let registry = Arc::new(InMemoryRegistry::new());
    let bank = Arc::new(SandboxBank::new(SandboxConfig::default()));
    let engine = ScaEngine::new(registry.clone(), bank.clone(), profile).context("engine failed to start")?;

    let psu = PsuIdData::new(args.psu.as_str());
    let object_id = BusinessObjectId::generate();
    let object = match args.object {
        ObjectKind::Ais => BusinessObject::ais_consent(object_id.clone(), psu.clone()),
        ObjectKind::Piis => BusinessObject::piis_consent(object_id.clone(), psu.clone()),
        ObjectKind::Payment => BusinessObject::payment(object_id.clone(), psu.clone()),
    };
    registry.insert_object(object);
    tracing::info!(
        scenario = ?args.scenario,
        object = ?args.object,
        object_id = %object_id,
        "simulation started"
    );

    let mut transcript = Transcript::new(args.scenario, args.object);
    let run = Run {
        engine: &engine,
        bank: &bank,
        args,
        object_id: &object_id,
        psu: &psu,
    };
    match args.object {
        ObjectKind::Ais => run.drive(engine.ais(), &mut transcript)?,
        ObjectKind::Piis => run.drive(engine.piis(), &mut transcript)?,
        ObjectKind::Payment => run.drive(engine.payments(), &mut transcript)?,
    }

    if let Some(id) = transcript.authorisation_id {
        transcript.final_status = registry.get_authorisation_by_id(id)?.map(|auth| auth.sca_status());
    }
    transcript.object_status = registry.get_business_object_by_id(&object_id)?.map(|object| object.status);
    Ok(transcript)
}

struct Run<'a> {
    engine: &'a ScaEngine,
    bank: &'a SandboxBank,
    args: &'a SimulateArgs,
    object_id: &'a BusinessObjectId,
    psu: &'a PsuIdData,
}

impl Run<'_> {
    fn drive<P: AuthorisationPolicy>(&self, orchestrator: &Orchestrator<P>, transcript: &mut Transcript) -> Result<()> {
        let ctx = RequestContext::new();
        let mut create = CreateAuthorisationRequest::new(self.object_id.clone(), self.psu.clone());
        if self.args.scenario == Scenario::Decoupled {
            create = create.with_password(self.args.password.as_str());
        }
        let outcome = orchestrator.create(&ctx, &create)?;
        let Some(status) = transcript.record("create", &outcome)? else {
            return Ok(());
        };
        let Some(id) = transcript.authorisation_id else {
            return Ok(());
        };

        match self.args.scenario {
            Scenario::Embedded => self.embedded(orchestrator, &ctx, id, status, transcript),
            Scenario::Redirect => {
                let stored = self.report(id, transcript, Some(self.bank.config().confirmation_code.clone()))?;
                if stored == ScaStatus::Unconfirmed {
                    let request = self.update(id).with_confirmation_code(self.args.confirmation_code.as_str());
                    transcript.record("confirm", &orchestrator.update(&ctx, &request)?)?;
                }
                Ok(())
            }
            Scenario::Decoupled => {
                if status == ScaStatus::ScaMethodSelected {
                    self.report(id, transcript, None)?;
                }
                Ok(())
            }
        }
    }

    fn embedded<P: AuthorisationPolicy>(
        &self,
        orchestrator: &Orchestrator<P>,
        ctx: &RequestContext,
        id: AuthorisationId,
        mut status: ScaStatus,
        transcript: &mut Transcript,
    ) -> Result<()> {
        for _ in 0..MAX_EMBEDDED_UPDATES {
            let (name, request) = match status {
                ScaStatus::Received | ScaStatus::Started | ScaStatus::PsuIdentified => {
                    ("authenticate", self.update(id).with_password(self.args.password.as_str()))
                }
                ScaStatus::PsuAuthenticated => ("select_method", self.update(id).with_method(self.args.method.as_str())),
                ScaStatus::ScaMethodSelected => ("verify_sca", self.update(id).with_sca_data(self.args.tan.as_str())),
                _ => break,
            };
            match transcript.record(name, &orchestrator.update(ctx, &request)?)? {
                Some(next) => status = next,
                None => break,
            }
        }
        Ok(())
    }

    /// Report a successful SCA from the bank's side.
    fn report(&self, id: AuthorisationId, transcript: &mut Transcript, code: Option<String>) -> Result<ScaStatus> {
        let authorised = match self.args.object {
            ObjectKind::Ais | ObjectKind::Piis => ObjectStatus::Consent(ConsentStatus::Valid),
            ObjectKind::Payment => ObjectStatus::Payment(TransactionStatus::Acsp),
        };
        let mut report = PsuStatusReport::new(ScaStatus::Finalised).with_object_status(authorised);
        if let Some(code) = code {
            report = report.with_confirmation_code(code);
        }
        let stored = self.engine.report_psu_status(id, &report)?;
        transcript.steps.push(Step {
            name: "psu_report",
            sca_status: Some(stored),
            result: serde_json::to_value(stored)?,
        });
        Ok(stored)
    }

    fn update(&self, id: AuthorisationId) -> UpdateAuthorisationRequest {
        UpdateAuthorisationRequest::new(self.object_id.clone(), id, self.psu.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(scenario: Scenario, object: ObjectKind) -> SimulateArgs {
        SimulateArgs {
            scenario,
            object,
            profile: None,
            psu: "alice".to_string(),
            password: "12345".to_string(),
            method: "sms".to_string(),
            tan: "123456".to_string(),
            confirmation_code: "a1b2c3".to_string(),
        }
    }

    fn step_names(transcript: &Transcript) -> Vec<&'static str> {
        transcript.steps.iter().map(|step| step.name).collect()
    }

    #[test]
    fn test_embedded_consent_finalises() {
        let transcript = simulate(&args(Scenario::Embedded, ObjectKind::Ais)).unwrap();
        assert_eq!(
            step_names(&transcript),
            vec!["create", "authenticate", "select_method", "verify_sca"]
        );
        assert_eq!(transcript.final_status, Some(ScaStatus::Finalised));
        assert_eq!(transcript.object_status, Some(ObjectStatus::Consent(ConsentStatus::Valid)));
        assert!(transcript.succeeded());
    }

    #[test]
    fn test_embedded_wrong_password_fails() {
        let mut a = args(Scenario::Embedded, ObjectKind::Payment);
        a.password = "wrong".to_string();
        let transcript = simulate(&a).unwrap();
        assert_eq!(step_names(&transcript), vec!["create", "authenticate"]);
        assert_eq!(transcript.final_status, Some(ScaStatus::Failed));
        assert!(!transcript.succeeded());
    }

    #[test]
    fn test_decoupled_payment_settles_on_report() {
        let transcript = simulate(&args(Scenario::Decoupled, ObjectKind::Payment)).unwrap();
        assert_eq!(step_names(&transcript), vec!["create", "psu_report"]);
        assert_eq!(transcript.final_status, Some(ScaStatus::Finalised));
        assert_eq!(
            transcript.object_status,
            Some(ObjectStatus::Payment(TransactionStatus::Acsp))
        );
    }

    #[test]
    fn test_redirect_without_mandated_confirmation() {
        let transcript = simulate(&args(Scenario::Redirect, ObjectKind::Piis)).unwrap();
        assert_eq!(step_names(&transcript), vec!["create", "psu_report"]);
        assert!(transcript.steps[0].result.to_string().contains("redirect_link"));
        assert!(transcript.succeeded());
    }

    #[test]
    fn test_transcript_serializes() {
        let transcript = simulate(&args(Scenario::Embedded, ObjectKind::Piis)).unwrap();
        let json = serde_json::to_value(&transcript).unwrap();
        assert_eq!(json["scenario"], "embedded");
        assert_eq!(json["final_status"], "finalised");
    }
}
