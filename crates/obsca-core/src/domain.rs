//! # SCA Domain Vocabulary
//!
//! The three mutually exclusive SCA approaches, the three kinds of
//! authorisation the engine advances, and the service families used to
//! tag error responses.
//!
//! Every `match` on these enums must be exhaustive. Adding an approach
//! forces the resolver, the dispatch table, and the endpoint access
//! checker to handle it at compile time.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// Protocol used to complete Strong Customer Authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaApproach {
    /// The PSU is handed to a bank-hosted page and the TPP later exchanges
    /// a confirmation code.
    Redirect,
    /// SCA completes inline through successive TPP update calls.
    Embedded,
    /// The bank pushes an out-of-band action to the PSU's device.
    Decoupled,
}

impl ScaApproach {
    /// All approaches in declaration order.
    pub fn all() -> &'static [ScaApproach] {
        &[Self::Redirect, Self::Embedded, Self::Decoupled]
    }

    /// Wire name of the approach.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redirect => "REDIRECT",
            Self::Embedded => "EMBEDDED",
            Self::Decoupled => "DECOUPLED",
        }
    }
}

impl std::fmt::Display for ScaApproach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaApproach {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REDIRECT" => Ok(Self::Redirect),
            "EMBEDDED" => Ok(Self::Embedded),
            "DECOUPLED" => Ok(Self::Decoupled),
            _ => Err(CoreError::UnknownApproach(s.to_string())),
        }
    }
}

/// What an authorisation advances. Selects the processor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorisationType {
    /// An account-information or funds-confirmation consent.
    Consent,
    /// Initiation of a payment.
    PaymentCreation,
    /// Cancellation of a previously initiated payment.
    PaymentCancellation,
}

impl AuthorisationType {
    /// All authorisation types in declaration order.
    pub fn all() -> &'static [AuthorisationType] {
        &[Self::Consent, Self::PaymentCreation, Self::PaymentCancellation]
    }

    /// Wire name of the authorisation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consent => "CONSENT",
            Self::PaymentCreation => "PAYMENT_CREATION",
            Self::PaymentCancellation => "PAYMENT_CANCELLATION",
        }
    }

    /// True for the two payment authorisation types.
    pub fn is_payment(&self) -> bool {
        matches!(self, Self::PaymentCreation | Self::PaymentCancellation)
    }
}

impl std::fmt::Display for AuthorisationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorisationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONSENT" => Ok(Self::Consent),
            "PIS_CREATION" | "PAYMENT_CREATION" => Ok(Self::PaymentCreation),
            "PIS_CANCELLATION" | "PAYMENT_CANCELLATION" => Ok(Self::PaymentCancellation),
            _ => Err(CoreError::UnknownAuthorisationType(s.to_string())),
        }
    }
}

/// Service family an error response is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    /// Account information.
    Ais,
    /// Funds confirmation (payment instrument issuing).
    Piis,
    /// Payment initiation, including cancellation.
    Pis,
}

impl ServiceType {
    /// Wire name of the service family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ais => "AIS",
            Self::Piis => "PIIS",
            Self::Pis => "PIS",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
