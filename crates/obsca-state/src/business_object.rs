//! # Business Object View
//!
//! The consent or payment an authorisation advances, as read from the
//! registry. The engine reads status, validity and the multilevel flag, and
//! writes back only status changes and the multilevel flag.

use serde::{Deserialize, Serialize};

use obsca_core::{BusinessObjectId, PsuIdData, ServiceType, Timestamp};

use crate::consent::ConsentStatus;
use crate::payment::TransactionStatus;

/// Status of a business object, by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "status", rename_all = "snake_case")]
pub enum ObjectStatus {
    Consent(ConsentStatus),
    Payment(TransactionStatus),
}

impl ObjectStatus {
    pub fn consent(&self) -> Option<ConsentStatus> {
        match self {
            Self::Consent(status) => Some(*status),
            Self::Payment(_) => None,
        }
    }

    pub fn payment(&self) -> Option<TransactionStatus> {
        match self {
            Self::Payment(status) => Some(*status),
            Self::Consent(_) => None,
        }
    }

    /// Whether the object has reached the end of its life.
    pub fn is_finalised(&self) -> bool {
        match self {
            Self::Consent(status) => status.is_terminal(),
            Self::Payment(status) => status.is_finalised(),
        }
    }
}

impl std::fmt::Display for ObjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consent(status) => status.fmt(f),
            Self::Payment(status) => status.fmt(f),
        }
    }
}

/// A consent or payment as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessObject {
    pub id: BusinessObjectId,
    pub service_type: ServiceType,
    pub status: ObjectStatus,
    /// Parties recorded against the object at creation, in order.
    pub psu_list: Vec<PsuIdData>,
    /// More than one party must authorise before the object takes effect.
    pub multilevel_sca_required: bool,
    /// End of validity. `None` means no deadline.
    pub valid_until: Option<Timestamp>,
    /// One-off consent that only lists available accounts.
    pub one_time_available_accounts: bool,
    pub tpp_id: Option<String>,
    pub created_at: Timestamp,
}

impl BusinessObject {
    /// A freshly received account-information consent.
    pub fn ais_consent(id: BusinessObjectId, psu: PsuIdData) -> Self {
        Self::new(id, ServiceType::Ais, ObjectStatus::Consent(ConsentStatus::Received), psu)
    }

    /// A freshly received funds-confirmation consent.
    pub fn piis_consent(id: BusinessObjectId, psu: PsuIdData) -> Self {
        Self::new(id, ServiceType::Piis, ObjectStatus::Consent(ConsentStatus::Received), psu)
    }

    /// A freshly received payment initiation.
    pub fn payment(id: BusinessObjectId, psu: PsuIdData) -> Self {
        Self::new(id, ServiceType::Pis, ObjectStatus::Payment(TransactionStatus::Rcvd), psu)
    }

    fn new(id: BusinessObjectId, service_type: ServiceType, status: ObjectStatus, psu: PsuIdData) -> Self {
        let psu_list = if psu.is_empty() { Vec::new() } else { vec![psu] };
        Self {
            id,
            service_type,
            status,
            psu_list,
            multilevel_sca_required: false,
            valid_until: None,
            one_time_available_accounts: false,
            tpp_id: None,
            created_at: Timestamp::now(),
        }
    }

    pub fn with_valid_until(mut self, valid_until: Timestamp) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    pub fn with_multilevel(mut self, parties: Vec<PsuIdData>) -> Self {
        self.multilevel_sca_required = true;
        self.psu_list = parties;
        self
    }

    /// Past its validity date, or already marked expired.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        if self.status == ObjectStatus::Consent(ConsentStatus::Expired) {
            return true;
        }
        self.valid_until.map(|until| until < now).unwrap_or(false)
    }

    /// Whether `psu` is one of the recorded parties.
    pub fn has_party(&self, psu: &PsuIdData) -> bool {
        self.psu_list.iter().any(|p| p.same_party(psu))
    }
}
