//! # SCA Status State Machine
//!
//! ## States
//!
//! ```text
//!              ┌──────────────────────────────────────────────────────┐
//!              │                                                      ▼
//! Received ◀─▶ Started ──▶ PsuIdentified ──▶ PsuAuthenticated ──▶ ScaMethodSelected
//!    │            │             │                  │                  │
//!    │            │             │                  │                  ├──▶ Unconfirmed ──▶ Finalised
//!    │            │             │                  │                  │          │
//!    └────────────┴─────────────┴──────────────────┴──────────────────┴──▶ Finalised / Exempted
//!                                                                     └──▶ Failed (from any
//!                                                                          non-terminal state)
//! ```
//!
//! Forward jumps are allowed because the bank's own channels (redirect
//! page, decoupled app) may report several steps at once. Backward moves
//! are limited to `Started → Received`, which some banks report when an
//! authorisation is created before the PSU is known.
//!
//! FINALISED, EXEMPTED and FAILED are terminal: their row in the table is
//! empty.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Position of an authorisation in the SCA protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaStatus {
    /// Authorisation created, nothing known yet.
    Received,
    /// Authorisation started by the engine.
    Started,
    /// The PSU identity has been supplied.
    PsuIdentified,
    /// The PSU has been authenticated with static credentials.
    PsuAuthenticated,
    /// An SCA method has been selected and a challenge issued.
    ScaMethodSelected,
    /// SCA completed on the bank side; awaiting the TPP's confirmation code.
    Unconfirmed,
    /// SCA completed successfully (terminal).
    Finalised,
    /// SCA failed (terminal).
    Failed,
    /// SCA was not required (terminal).
    Exempted,
}

impl ScaStatus {
    /// All statuses in protocol order.
    pub fn all() -> &'static [ScaStatus] {
        &[
            Self::Received,
            Self::Started,
            Self::PsuIdentified,
            Self::PsuAuthenticated,
            Self::ScaMethodSelected,
            Self::Unconfirmed,
            Self::Finalised,
            Self::Failed,
            Self::Exempted,
        ]
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalised | Self::Failed | Self::Exempted)
    }

    /// Terminal and successful.
    pub fn is_finalised(&self) -> bool {
        matches!(self, Self::Finalised | Self::Exempted)
    }

    /// The central transition table: statuses reachable in one step.
    pub fn allowed_next(&self) -> &'static [ScaStatus] {
        use ScaStatus::*;
        match self {
            Received => &[
                Started,
                PsuIdentified,
                PsuAuthenticated,
                ScaMethodSelected,
                Unconfirmed,
                Finalised,
                Failed,
                Exempted,
            ],
            Started => &[
                Received,
                PsuIdentified,
                PsuAuthenticated,
                ScaMethodSelected,
                Unconfirmed,
                Finalised,
                Failed,
                Exempted,
            ],
            PsuIdentified => &[
                PsuAuthenticated,
                ScaMethodSelected,
                Unconfirmed,
                Finalised,
                Failed,
                Exempted,
            ],
            PsuAuthenticated => &[ScaMethodSelected, Unconfirmed, Finalised, Failed, Exempted],
            ScaMethodSelected => &[Unconfirmed, Finalised, Failed, Exempted],
            Unconfirmed => &[Finalised, Failed],
            Finalised | Failed | Exempted => &[],
        }
    }

    /// Whether `to` is one step away. A status is never a transition to
    /// itself; callers treat same-status writes as no-ops.
    pub fn can_transition_to(&self, to: ScaStatus) -> bool {
        self.allowed_next().contains(&to)
    }

    /// Wire name, as used by the XS2A interface.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Started => "started",
            Self::PsuIdentified => "psuIdentified",
            Self::PsuAuthenticated => "psuAuthenticated",
            Self::ScaMethodSelected => "scaMethodSelected",
            Self::Unconfirmed => "unconfirmed",
            Self::Finalised => "finalised",
            Self::Failed => "failed",
            Self::Exempted => "exempted",
        }
    }
}

impl std::fmt::Display for ScaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Received => "RECEIVED",
            Self::Started => "STARTED",
            Self::PsuIdentified => "PSUIDENTIFIED",
            Self::PsuAuthenticated => "PSUAUTHENTICATED",
            Self::ScaMethodSelected => "SCAMETHODSELECTED",
            Self::Unconfirmed => "UNCONFIRMED",
            Self::Finalised => "FINALISED",
            Self::Failed => "FAILED",
            Self::Exempted => "EXEMPTED",
        };
        f.write_str(s)
    }
}

impl FromStr for ScaStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|status| {
                status.as_str().eq_ignore_ascii_case(wanted)
                    || status.to_string().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| format!("unknown SCA status: {s:?}"))
    }
}
