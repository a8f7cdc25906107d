//! # Error Types
//!
//! Parse and construction failures for the foundational types. These are
//! programmer- or configuration-facing; caller-facing failures travel as
//! [`ErrorHolder`](crate::ErrorHolder) values instead.

use thiserror::Error;

/// Failure to construct or parse a core type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The string does not name a known SCA approach.
    #[error("unknown SCA approach: {0:?}")]
    UnknownApproach(String),

    /// The string does not name a known authorisation type.
    #[error("unknown authorisation type: {0:?}")]
    UnknownAuthorisationType(String),

    /// An identifier failed validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A timestamp could not be parsed or constructed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
