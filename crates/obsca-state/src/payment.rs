//! # Payment Transaction Status
//!
//! ISO 20022 transaction status codes for a payment initiation. The engine
//! writes the status returned by the bank adapter after SCA verification,
//! `RJCT` when SCA cannot start, and `CANC` after a cancellation is
//! authorised.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Received.
    Rcvd,
    /// Partially accepted technical correct: more authorisations needed.
    Patc,
    /// Accepted technical validation.
    Actc,
    /// Accepted settlement in process.
    Acsp,
    /// Accepted customer profile.
    Accp,
    /// Accepted settlement completed.
    Acsc,
    /// Rejected.
    Rjct,
    /// Cancelled.
    Canc,
    /// Pending.
    Pdng,
}

impl TransactionStatus {
    /// Settled, rejected or cancelled: nothing more can happen.
    pub fn is_finalised(&self) -> bool {
        matches!(self, Self::Acsc | Self::Rjct | Self::Canc)
    }

    pub fn is_cancellable(&self) -> bool {
        !self.is_finalised()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rcvd => "RCVD",
            Self::Patc => "PATC",
            Self::Actc => "ACTC",
            Self::Acsp => "ACSP",
            Self::Accp => "ACCP",
            Self::Acsc => "ACSC",
            Self::Rjct => "RJCT",
            Self::Canc => "CANC",
            Self::Pdng => "PDNG",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalised_statuses_are_not_cancellable() {
        for status in [TransactionStatus::Acsc, TransactionStatus::Rjct, TransactionStatus::Canc] {
            assert!(status.is_finalised());
            assert!(!status.is_cancellable());
        }
        assert!(TransactionStatus::Patc.is_cancellable());
        assert!(TransactionStatus::Rcvd.is_cancellable());
    }

    #[test]
    fn test_serde_matches_display() {
        let json = serde_json::to_string(&TransactionStatus::Acsp).unwrap();
        assert_eq!(json, "\"ACSP\"");
    }
}
