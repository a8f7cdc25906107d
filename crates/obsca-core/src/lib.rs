#![deny(missing_docs)]

//! # obsca-core — Foundational Types for the SCA Authorisation Engine
//!
//! Leaf crate of the workspace. Defines the vocabulary every other crate
//! speaks: identifiers, PSU identity, the three SCA approaches, the
//! business-object families, the caller-facing message taxonomy, and
//! UTC timestamps.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `AuthorisationId` and `BusinessObjectId` are
//!    distinct types; an authorisation handle cannot be passed where a
//!    consent or payment id is expected.
//!
//! 2. **Expected failures are values.** [`Outcome`] distinguishes success
//!    from an [`ErrorHolder`] carrying machine-readable [`TppMessage`]s.
//!    Rust errors (`Result::Err`) are reserved for faults.
//!
//! 3. **One error-code table.** Every [`MessageErrorCode`] maps to exactly
//!    one [`ErrorClass`] and one HTTP status. Callers match on the class,
//!    the excluded REST layer renders the status.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `obsca-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod domain;
pub mod error;
pub mod identity;
pub mod message;
pub mod outcome;
pub mod temporal;

pub use domain::{AuthorisationType, ScaApproach, ServiceType};
pub use error::CoreError;
pub use identity::{AuthorisationId, BusinessObjectId, PsuIdData};
pub use message::{ErrorClass, ErrorHolder, MessageCategory, MessageErrorCode, TppMessage};
pub use outcome::Outcome;
pub use temporal::Timestamp;
