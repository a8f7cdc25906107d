//! # obsca-engine — SCA Authorisation Engine
//!
//! Creates, advances and finalises authorisations for AIS consents,
//! funds-confirmation consents, payments and payment cancellations.
//!
//! ```text
//!   TPP call ──► Orchestrator<Policy> ──► validation, expiry, party
//!                    │
//!                    ├── REDIRECT + code ──► ConfirmationHandler
//!                    └── otherwise ────────► DispatchTable ──► processor ──► BankAdapter
//!                    │
//!                    └── StatusWriter ──► AuthorisationRegistry
//! ```
//!
//! - **Resolver** ([`resolver`]): picks the approach from the profile and
//!   the TPP's preference headers.
//! - **Dispatch** ([`processor`]): static table from (approach, status,
//!   type) to a step handler, checked for completeness at startup.
//! - **Orchestrator** ([`orchestrator`]): one implementation, four
//!   [`policy`] instances.
//! - **Confirmation** ([`confirmation`]): redirect code exchange.
//! - **PSU reports** ([`psu`]): outcomes reported from the bank's side.
//! - **Seams** ([`registry`], [`adapter`]): synchronous traits for the
//!   external store and bank connector, with [`memory`] and [`sandbox`]
//!   implementations for tests and simulation.

pub mod access;
pub mod adapter;
pub mod config;
pub mod confirmation;
pub mod context;
pub mod engine;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod party;
pub mod policy;
pub mod processor;
pub mod psu;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod sandbox;
pub mod status;
pub mod validation;

pub use adapter::{AdapterError, BankAdapter};
pub use config::{AspspProfile, ConfigError};
pub use context::RequestContext;
pub use engine::ScaEngine;
pub use error::EngineError;
pub use memory::InMemoryRegistry;
pub use orchestrator::{EngineServices, Orchestrator, ScaStatusResponse};
pub use policy::{AisConsentPolicy, AuthorisationPolicy, PaymentCancellationPolicy, PaymentPolicy, PiisConsentPolicy};
pub use processor::{AuthorisationResponse, DispatchKey, DispatchTable, ScaProgress};
pub use psu::{PsuReportError, PsuStatusReport};
pub use registry::{AuthorisationRegistry, RegistryError};
pub use request::{CreateAuthorisationRequest, UpdateAuthorisationRequest};
pub use sandbox::{AdapterCall, SandboxBank, SandboxConfig};
