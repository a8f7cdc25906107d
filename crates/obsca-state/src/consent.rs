//! # Consent Status
//!
//! Lifecycle of an account-information or funds-confirmation consent as
//! stored by the registry. The engine writes it only as a consequence of
//! an SCA outcome:
//!
//! ```text
//! Received ──▶ Valid                  (SCA finalised)
//!    │    └──▶ PartiallyAuthorised ──▶ Valid   (multilevel)
//!    └──▶ Rejected                    (SCA failed to start, no methods,
//!                                      bank rejected confirmation)
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsentStatus {
    Received,
    Rejected,
    Valid,
    RevokedByPsu,
    Expired,
    TerminatedByTpp,
    TerminatedByAspsp,
    /// Some but not all required parties have authorised.
    PartiallyAuthorised,
}

impl ConsentStatus {
    /// Whether the consent can never become usable again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected
                | Self::RevokedByPsu
                | Self::Expired
                | Self::TerminatedByTpp
                | Self::TerminatedByAspsp
        )
    }
}

impl std::fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Received => "RECEIVED",
            Self::Rejected => "REJECTED",
            Self::Valid => "VALID",
            Self::RevokedByPsu => "REVOKED_BY_PSU",
            Self::Expired => "EXPIRED",
            Self::TerminatedByTpp => "TERMINATED_BY_TPP",
            Self::TerminatedByAspsp => "TERMINATED_BY_ASPSP",
            Self::PartiallyAuthorised => "PARTIALLY_AUTHORISED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(ConsentStatus::Rejected.is_terminal());
        assert!(ConsentStatus::Expired.is_terminal());
        assert!(ConsentStatus::TerminatedByTpp.is_terminal());
        assert!(!ConsentStatus::Received.is_terminal());
        assert!(!ConsentStatus::Valid.is_terminal());
        assert!(!ConsentStatus::PartiallyAuthorised.is_terminal());
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&ConsentStatus::RevokedByPsu).unwrap();
        assert_eq!(json, "\"revokedByPsu\"");
    }
}
