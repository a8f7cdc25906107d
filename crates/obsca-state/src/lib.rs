//! # obsca-state — SCA State Machines
//!
//! ## State Machines
//!
//! - **SCA status** (`sca.rs`): closed enumeration of authorisation states
//!   with one central table of allowed next states. FINALISED, EXEMPTED and
//!   FAILED are terminal and absorb every transition attempt.
//!
//! - **Authorisation** (`authorisation.rs`): the tracked attempt by one PSU
//!   to complete SCA for one business object. Status changes only through
//!   [`Authorisation::transition_to`], which consults the table and logs
//!   every accepted transition. The chosen approach is fixed at
//!   construction and has no setter.
//!
//! - **Consent / payment status** (`consent.rs`, `payment.rs`): the business
//!   object vocabularies the engine writes as consequences of SCA outcomes.
//!
//! - **Business object** (`business_object.rs`): the read model of a consent
//!   or payment as the engine sees it through the registry.

pub mod authorisation;
pub mod business_object;
pub mod consent;
pub mod payment;
pub mod sca;

// ─── Authorisation re-exports ───────────────────────────────────────

pub use authorisation::{Authorisation, AuthorisationError, ScaMethod, ScaTransitionRecord};

// ─── Status re-exports ──────────────────────────────────────────────

pub use business_object::{BusinessObject, ObjectStatus};
pub use consent::ConsentStatus;
pub use payment::TransactionStatus;
pub use sca::ScaStatus;
