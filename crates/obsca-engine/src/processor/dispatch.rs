//! # Dispatch Table
//!
//! Static mapping from `(approach, status, authorisation type)` to the
//! processor that handles that step. Built once at engine start-up and
//! checked for completeness against every reachable combination, so a
//! wiring gap fails the start-up rather than a customer's request.
//!
//! ## Reachable combinations
//!
//! | Approach | Statuses dispatched |
//! |----------|---------------------|
//! | REDIRECT | STARTED (creation only; updates go to the confirmation handler) |
//! | EMBEDDED | every status |
//! | DECOUPLED | every status |

use std::collections::HashMap;

use tracing::{debug, error};

use obsca_core::{AuthorisationType, ScaApproach};
use obsca_state::ScaStatus;

use super::steps;
use super::{AuthorisationResponse, ProcessorRequest, ProcessorServices};
use crate::error::EngineError;

pub type ProcessorFn =
    fn(&ProcessorServices<'_>, &ProcessorRequest<'_>) -> Result<AuthorisationResponse, EngineError>;

/// A named step handler.
#[derive(Clone, Copy)]
pub struct Processor {
    pub name: &'static str,
    handle: ProcessorFn,
}

impl Processor {
    pub const fn new(name: &'static str, handle: ProcessorFn) -> Self {
        Self { name, handle }
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchKey {
    pub approach: ScaApproach,
    pub status: ScaStatus,
    pub authorisation_type: AuthorisationType,
}

impl DispatchKey {
    pub fn new(approach: ScaApproach, status: ScaStatus, authorisation_type: AuthorisationType) -> Self {
        Self {
            approach,
            status,
            authorisation_type,
        }
    }
}

impl std::fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.approach, self.status, self.authorisation_type)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    processors: HashMap<DispatchKey, Processor>,
}

impl DispatchTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The production table, validated.
    pub fn standard() -> Result<Self, EngineError> {
        let mut table = Self::empty();
        for &authorisation_type in AuthorisationType::all() {
            table.register(
                DispatchKey::new(ScaApproach::Redirect, ScaStatus::Started, authorisation_type),
                steps::REDIRECT_START,
            );
            table.register(
                DispatchKey::new(ScaApproach::Redirect, ScaStatus::Received, authorisation_type),
                steps::REDIRECT_START,
            );
            for approach in [ScaApproach::Embedded, ScaApproach::Decoupled] {
                for &status in ScaStatus::all() {
                    let processor = match (approach, status) {
                        (_, ScaStatus::Received | ScaStatus::Started) => steps::RECEIVED,
                        (_, ScaStatus::PsuIdentified) => steps::PSU_IDENTIFIED,
                        (_, ScaStatus::PsuAuthenticated) => steps::PSU_AUTHENTICATED,
                        (ScaApproach::Decoupled, ScaStatus::ScaMethodSelected) => steps::DECOUPLED_IN_PROGRESS,
                        (_, ScaStatus::ScaMethodSelected) => steps::VERIFY_SCA,
                        (_, ScaStatus::Unconfirmed) => steps::AWAITING_CONFIRMATION,
                        (_, ScaStatus::Finalised | ScaStatus::Exempted) => steps::FINALISED,
                        (_, ScaStatus::Failed) => steps::FAILED,
                    };
                    table.register(DispatchKey::new(approach, status, authorisation_type), processor);
                }
            }
        }
        table.validate()?;
        Ok(table)
    }

    /// Add or replace a processor. Returns the one it replaced.
    pub fn register(&mut self, key: DispatchKey, processor: Processor) -> Option<Processor> {
        self.processors.insert(key, processor)
    }

    /// Remove a processor.
    pub fn unregister(&mut self, key: &DispatchKey) -> Option<Processor> {
        self.processors.remove(key)
    }

    /// Every combination the orchestrators can dispatch.
    pub fn reachable_keys() -> Vec<DispatchKey> {
        let mut keys = Vec::new();
        for &authorisation_type in AuthorisationType::all() {
            keys.push(DispatchKey::new(ScaApproach::Redirect, ScaStatus::Started, authorisation_type));
            for approach in [ScaApproach::Embedded, ScaApproach::Decoupled] {
                for &status in ScaStatus::all() {
                    keys.push(DispatchKey::new(approach, status, authorisation_type));
                }
            }
        }
        keys
    }

    /// Fail on the first reachable combination without a processor.
    pub fn validate(&self) -> Result<(), EngineError> {
        for key in Self::reachable_keys() {
            if !self.processors.contains_key(&key) {
                error!(key = %key, "dispatch table incomplete");
                return Err(EngineError::DispatchGap {
                    approach: key.approach,
                    status: key.status,
                    authorisation_type: key.authorisation_type,
                });
            }
        }
        Ok(())
    }

    pub fn processor_for(&self, key: &DispatchKey) -> Option<&Processor> {
        self.processors.get(key)
    }

    /// Number of registered processors.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Route the request to its processor.
    pub fn dispatch(
        &self,
        services: &ProcessorServices<'_>,
        request: &ProcessorRequest<'_>,
    ) -> Result<AuthorisationResponse, EngineError> {
        let key = request.key();
        let Some(processor) = self.processors.get(&key) else {
            error!(
                key = %key,
                authorisation_id = %request.authorisation.id(),
                "no SCA processor for reachable step"
            );
            return Err(EngineError::DispatchGap {
                approach: key.approach,
                status: key.status,
                authorisation_type: key.authorisation_type,
            });
        };
        debug!(
            processor = processor.name,
            key = %key,
            authorisation_id = %request.authorisation.id(),
            "dispatching SCA step"
        );
        (processor.handle)(services, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_complete() {
        let table = DispatchTable::standard().unwrap();
        for key in DispatchTable::reachable_keys() {
            assert!(table.processor_for(&key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_gap_is_reported() {
        let mut table = DispatchTable::standard().unwrap();
        let key = DispatchKey::new(
            ScaApproach::Embedded,
            ScaStatus::PsuAuthenticated,
            AuthorisationType::PaymentCancellation,
        );
        table.unregister(&key);
        match table.validate() {
            Err(EngineError::DispatchGap {
                approach,
                status,
                authorisation_type,
            }) => {
                assert_eq!(approach, ScaApproach::Embedded);
                assert_eq!(status, ScaStatus::PsuAuthenticated);
                assert_eq!(authorisation_type, AuthorisationType::PaymentCancellation);
            }
            other => panic!("expected dispatch gap, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_table_fails_validation() {
        assert!(DispatchTable::empty().validate().is_err());
    }

    #[test]
    fn test_decoupled_method_selected_does_not_verify() {
        let table = DispatchTable::standard().unwrap();
        let embedded = table
            .processor_for(&DispatchKey::new(
                ScaApproach::Embedded,
                ScaStatus::ScaMethodSelected,
                AuthorisationType::Consent,
            ))
            .unwrap();
        let decoupled = table
            .processor_for(&DispatchKey::new(
                ScaApproach::Decoupled,
                ScaStatus::ScaMethodSelected,
                AuthorisationType::Consent,
            ))
            .unwrap();
        assert_eq!(embedded.name, steps::VERIFY_SCA.name);
        assert_eq!(decoupled.name, steps::DECOUPLED_IN_PROGRESS.name);
    }

    #[test]
    fn test_redirect_only_handles_start() {
        let table = DispatchTable::standard().unwrap();
        assert!(table
            .processor_for(&DispatchKey::new(
                ScaApproach::Redirect,
                ScaStatus::ScaMethodSelected,
                AuthorisationType::Consent,
            ))
            .is_none());
    }
}
