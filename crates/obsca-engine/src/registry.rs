//! # Registry Interface
//!
//! The engine's view of the external store that owns consents, payments
//! and authorisation records. The registry is the single source of truth
//! for authorisation status: the engine reads before every write and never
//! caches status across requests.
//!
//! Implementations are synchronous and blocking. They are expected to be
//! last-write-wins; status rules are enforced by the engine (and, for the
//! in-memory implementation, again by the record itself).

use thiserror::Error;

use obsca_core::{AuthorisationId, AuthorisationType, BusinessObjectId, PsuIdData, Timestamp};
use obsca_state::{Authorisation, BusinessObject, ObjectStatus, ScaMethod, ScaStatus};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{kind} {id} not found in registry")]
    NotFound { kind: &'static str, id: String },

    /// The registry refused the write.
    #[error("registry rejected write: {0}")]
    Rejected(String),

    /// Transport or storage failure.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Optional field updates for an authorisation record. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorisationUpdate {
    pub psu: Option<PsuIdData>,
    pub available_methods: Option<Vec<ScaMethod>>,
    pub chosen_method_id: Option<String>,
    pub confirmation_code_digest: Option<String>,
    pub sca_expires_at: Option<Timestamp>,
}

impl AuthorisationUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub trait AuthorisationRegistry: Send + Sync {
    fn get_authorisation_by_id(&self, id: AuthorisationId) -> Result<Option<Authorisation>, RegistryError>;

    fn create_authorisation(&self, record: Authorisation) -> Result<(), RegistryError>;

    fn update_status(&self, id: AuthorisationId, status: ScaStatus) -> Result<(), RegistryError>;

    /// Parties recorded against the object, in registration order.
    fn get_party_list(&self, object_id: &BusinessObjectId) -> Result<Vec<PsuIdData>, RegistryError>;

    fn get_business_object_by_id(&self, id: &BusinessObjectId) -> Result<Option<BusinessObject>, RegistryError>;

    /// Authorisations of one type attached to an object, oldest first.
    fn list_authorisations(
        &self,
        object_id: &BusinessObjectId,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<Authorisation>, RegistryError>;

    fn update_authorisation(&self, id: AuthorisationId, update: AuthorisationUpdate) -> Result<(), RegistryError>;

    fn update_object_status(&self, id: &BusinessObjectId, status: ObjectStatus) -> Result<(), RegistryError>;

    fn update_multilevel_sca_required(&self, id: &BusinessObjectId, required: bool) -> Result<(), RegistryError>;
}
