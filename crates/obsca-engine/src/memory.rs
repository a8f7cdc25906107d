//! # In-Memory Registry
//!
//! [`AuthorisationRegistry`] backed by process memory. Used by the tests
//! and the CLI simulator; a deployment supplies its own registry client.
//!
//! Status writes go through [`Authorisation::transition_to`], so the
//! transition table holds even for callers that bypass the engine.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use obsca_core::{AuthorisationId, AuthorisationType, BusinessObjectId, PsuIdData};
use obsca_state::{Authorisation, BusinessObject, ObjectStatus, ScaStatus};

use crate::registry::{AuthorisationRegistry, AuthorisationUpdate, RegistryError};

// ─── Generic store ───────────────────────────────────────────────────

/// Thread-safe, cloneable keyed store. `parking_lot::RwLock` does not
/// poison, so a panicking writer leaves the store usable.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash, T: Clone> Store<K, T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn insert(&self, key: K, value: T) -> Option<T> {
        self.data.write().insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<T> {
        self.data.read().get(key).cloned()
    }

    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Read-validate-update under one write lock.
    pub fn try_update<R, E>(&self, key: &K, f: impl FnOnce(&mut T) -> Result<R, E>) -> Option<Result<R, E>> {
        self.data.write().get_mut(key).map(f)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.data.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, T: Clone> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Registry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    objects: Store<BusinessObjectId, BusinessObject>,
    authorisations: Store<AuthorisationId, Authorisation>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consent or payment.
    pub fn insert_object(&self, object: BusinessObject) {
        self.objects.insert(object.id.clone(), object);
    }

    /// Overwrite an authorisation record as-is, bypassing the transition
    /// table. For seeding fixtures.
    pub fn put_authorisation(&self, record: Authorisation) {
        self.authorisations.insert(record.id(), record);
    }

    pub fn authorisation_count(&self) -> usize {
        self.authorisations.len()
    }

    fn not_found(kind: &'static str, id: impl ToString) -> RegistryError {
        RegistryError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl AuthorisationRegistry for InMemoryRegistry {
    fn get_authorisation_by_id(&self, id: AuthorisationId) -> Result<Option<Authorisation>, RegistryError> {
        Ok(self.authorisations.get(&id))
    }

    fn create_authorisation(&self, record: Authorisation) -> Result<(), RegistryError> {
        if !self.objects.contains(record.parent_id()) {
            return Err(Self::not_found("business object", record.parent_id()));
        }
        if self.authorisations.contains(&record.id()) {
            return Err(RegistryError::Rejected(format!("authorisation {} already exists", record.id())));
        }
        self.authorisations.insert(record.id(), record);
        Ok(())
    }

    fn update_status(&self, id: AuthorisationId, status: ScaStatus) -> Result<(), RegistryError> {
        self.authorisations
            .try_update(&id, |record| record.transition_to(status, "registry status update"))
            .ok_or_else(|| Self::not_found("authorisation", id))?
            .map(|_| ())
            .map_err(|e| RegistryError::Rejected(e.to_string()))
    }

    fn get_party_list(&self, object_id: &BusinessObjectId) -> Result<Vec<PsuIdData>, RegistryError> {
        self.objects
            .get(object_id)
            .map(|object| object.psu_list)
            .ok_or_else(|| Self::not_found("business object", object_id))
    }

    fn get_business_object_by_id(&self, id: &BusinessObjectId) -> Result<Option<BusinessObject>, RegistryError> {
        Ok(self.objects.get(id))
    }

    fn list_authorisations(
        &self,
        object_id: &BusinessObjectId,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<Authorisation>, RegistryError> {
        let mut found: Vec<Authorisation> = self
            .authorisations
            .list()
            .into_iter()
            .filter(|a| a.belongs_to(object_id) && a.authorisation_type() == authorisation_type)
            .collect();
        found.sort_by_key(|a| (a.created_at, a.id()));
        Ok(found)
    }

    fn update_authorisation(&self, id: AuthorisationId, update: AuthorisationUpdate) -> Result<(), RegistryError> {
        self.authorisations
            .try_update(&id, |record| {
                if let Some(psu) = update.psu {
                    record.psu = psu;
                }
                if let Some(methods) = update.available_methods {
                    record.available_methods = methods;
                }
                if let Some(method_id) = update.chosen_method_id {
                    record.chosen_method_id = Some(method_id);
                }
                if let Some(digest) = update.confirmation_code_digest {
                    record.confirmation_code_digest = Some(digest);
                }
                if let Some(deadline) = update.sca_expires_at {
                    record.sca_expires_at = Some(deadline);
                }
                Ok::<(), RegistryError>(())
            })
            .ok_or_else(|| Self::not_found("authorisation", id))?
    }

    fn update_object_status(&self, id: &BusinessObjectId, status: ObjectStatus) -> Result<(), RegistryError> {
        self.objects
            .try_update(id, |object| {
                object.status = status;
                Ok::<(), RegistryError>(())
            })
            .ok_or_else(|| Self::not_found("business object", id))?
    }

    fn update_multilevel_sca_required(&self, id: &BusinessObjectId, required: bool) -> Result<(), RegistryError> {
        self.objects
            .try_update(id, |object| {
                object.multilevel_sca_required = required;
                Ok::<(), RegistryError>(())
            })
            .ok_or_else(|| Self::not_found("business object", id))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsca_core::ScaApproach;
    use obsca_state::ConsentStatus;

    fn seeded() -> (InMemoryRegistry, BusinessObjectId) {
        let registry = InMemoryRegistry::new();
        let id = BusinessObjectId::new("consent-1").unwrap();
        registry.insert_object(BusinessObject::ais_consent(id.clone(), PsuIdData::new("alice")));
        (registry, id)
    }

    fn authorisation(object: &BusinessObjectId) -> Authorisation {
        Authorisation::new(
            object.clone(),
            AuthorisationType::Consent,
            PsuIdData::new("alice"),
            ScaApproach::Embedded,
            ScaStatus::Started,
        )
    }

    #[test]
    fn test_create_and_get() {
        let (registry, object) = seeded();
        let auth = authorisation(&object);
        registry.create_authorisation(auth.clone()).unwrap();
        let loaded = registry.get_authorisation_by_id(auth.id()).unwrap().unwrap();
        assert_eq!(loaded, auth);
    }

    #[test]
    fn test_create_requires_object() {
        let (registry, _) = seeded();
        let orphan = authorisation(&BusinessObjectId::new("missing").unwrap());
        assert!(matches!(
            registry.create_authorisation(orphan),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let (registry, object) = seeded();
        let auth = authorisation(&object);
        registry.create_authorisation(auth.clone()).unwrap();
        assert!(matches!(registry.create_authorisation(auth), Err(RegistryError::Rejected(_))));
    }

    #[test]
    fn test_update_status_enforces_table() {
        let (registry, object) = seeded();
        let auth = authorisation(&object);
        registry.create_authorisation(auth.clone()).unwrap();
        registry.update_status(auth.id(), ScaStatus::Failed).unwrap();
        let err = registry.update_status(auth.id(), ScaStatus::Finalised).unwrap_err();
        assert!(matches!(err, RegistryError::Rejected(_)));
        let loaded = registry.get_authorisation_by_id(auth.id()).unwrap().unwrap();
        assert_eq!(loaded.sca_status(), ScaStatus::Failed);
    }

    #[test]
    fn test_update_status_unknown_id() {
        let (registry, _) = seeded();
        let err = registry.update_status(AuthorisationId::new(), ScaStatus::Failed).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_list_filters_by_type_and_object() {
        let (registry, object) = seeded();
        let a = authorisation(&object);
        let b = authorisation(&object);
        registry.create_authorisation(a.clone()).unwrap();
        registry.create_authorisation(b.clone()).unwrap();
        let listed = registry.list_authorisations(&object, AuthorisationType::Consent).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(registry
            .list_authorisations(&object, AuthorisationType::PaymentCreation)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_authorisation_fields() {
        let (registry, object) = seeded();
        let auth = authorisation(&object);
        registry.create_authorisation(auth.clone()).unwrap();
        registry
            .update_authorisation(
                auth.id(),
                AuthorisationUpdate {
                    chosen_method_id: Some("sms".into()),
                    ..AuthorisationUpdate::default()
                },
            )
            .unwrap();
        let loaded = registry.get_authorisation_by_id(auth.id()).unwrap().unwrap();
        assert_eq!(loaded.chosen_method_id.as_deref(), Some("sms"));
        assert_eq!(loaded.psu, PsuIdData::new("alice"));
    }

    #[test]
    fn test_object_updates() {
        let (registry, object) = seeded();
        registry
            .update_object_status(&object, ObjectStatus::Consent(ConsentStatus::Valid))
            .unwrap();
        registry.update_multilevel_sca_required(&object, true).unwrap();
        let loaded = registry.get_business_object_by_id(&object).unwrap().unwrap();
        assert_eq!(loaded.status, ObjectStatus::Consent(ConsentStatus::Valid));
        assert!(loaded.multilevel_sca_required);
        assert_eq!(registry.get_party_list(&object).unwrap(), vec![PsuIdData::new("alice")]);
    }
}
