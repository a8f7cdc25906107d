//! # Engine Faults
//!
//! `EngineError` is for defects and infrastructure failures only. Expected
//! outcomes such as an unknown consent or a wrong password are returned as
//! [`Outcome::Failure`](obsca_core::Outcome) values instead.

use thiserror::Error;

use obsca_core::{AuthorisationType, ScaApproach};
use obsca_state::ScaStatus;

use crate::config::ConfigError;
use crate::registry::RegistryError;

#[derive(Error, Debug)]
pub enum EngineError {
    /// No processor is registered for a reachable combination. This is a
    /// wiring defect, never a caller error.
    #[error("no SCA processor registered for {approach}/{status}/{authorisation_type}")]
    DispatchGap {
        approach: ScaApproach,
        status: ScaStatus,
        authorisation_type: AuthorisationType,
    },

    /// Engine wiring or profile is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("profile error: {0}")]
    Profile(#[from] ConfigError),

    /// The registry failed to answer.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}
