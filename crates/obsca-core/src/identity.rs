//! # Identity Newtypes
//!
//! Identifiers for authorisations and the business objects they advance,
//! plus [`PsuIdData`], the identity of the customer completing SCA.
//!
//! An authorisation id is generated by the engine and handed to the TPP as
//! the handle for every subsequent update. Business-object ids (consent and
//! payment ids) are minted by the registry and are opaque strings here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for one SCA authorisation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorisationId(pub Uuid);

impl AuthorisationId {
    /// Generate a new random authorisation identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an authorisation identifier from its external string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| CoreError::InvalidIdentifier(format!("authorisation id {s:?}: {e}")))
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AuthorisationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AuthorisationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a consent or payment held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusinessObjectId(String);

impl BusinessObjectId {
    /// Wrap a registry-issued identifier. Blank identifiers are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "business object id must not be blank".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Generate a fresh random identifier, as the in-memory registry does.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BusinessObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the PSU as supplied in request headers.
///
/// Every field is optional: a TPP may start an authorisation anonymously
/// and supply the identity later. A value with neither a PSU id nor a
/// corporate id is *empty*.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PsuIdData {
    /// PSU login identifier.
    pub psu_id: Option<String>,
    /// Qualifier of `psu_id`.
    pub psu_id_type: Option<String>,
    /// Corporate identifier for business customers.
    pub psu_corporate_id: Option<String>,
    /// Qualifier of `psu_corporate_id`.
    pub psu_corporate_id_type: Option<String>,
}

impl PsuIdData {
    /// Identity carrying only a PSU id.
    pub fn new(psu_id: impl Into<String>) -> Self {
        Self {
            psu_id: Some(psu_id.into()),
            ..Self::default()
        }
    }

    /// The anonymous identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach a corporate id.
    pub fn with_corporate_id(mut self, corporate_id: impl Into<String>) -> Self {
        self.psu_corporate_id = Some(corporate_id.into());
        self
    }

    /// True when neither a PSU id nor a corporate id is present.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.psu_id) && is_blank(&self.psu_corporate_id)
    }

    /// True when both identities name the same party.
    ///
    /// Only the id values are compared; the `*_type` qualifiers are
    /// informational and TPPs send them inconsistently.
    pub fn same_party(&self, other: &PsuIdData) -> bool {
        normalized(&self.psu_id) == normalized(&other.psu_id)
            && normalized(&self.psu_corporate_id) == normalized(&other.psu_corporate_id)
    }
}

impl std::fmt::Display for PsuIdData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (normalized(&self.psu_id), normalized(&self.psu_corporate_id)) {
            (Some(id), Some(corp)) => write!(f, "{id}@{corp}"),
            (Some(id), None) => f.write_str(id),
            (None, Some(corp)) => write!(f, "@{corp}"),
            (None, None) => f.write_str("<anonymous>"),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    normalized(value).is_none()
}

fn normalized(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorisation_ids_are_unique() {
        assert_ne!(AuthorisationId::new(), AuthorisationId::new());
    }

    #[test]
    fn test_authorisation_id_parse_roundtrip() {
        let id = AuthorisationId::new();
        let parsed = AuthorisationId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_authorisation_id_parse_rejects_garbage() {
        assert!(AuthorisationId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_business_object_id_rejects_blank() {
        assert!(BusinessObjectId::new("   ").is_err());
        assert_eq!(BusinessObjectId::new("consent-1").unwrap().as_str(), "consent-1");
    }

    #[test]
    fn test_psu_empty_when_ids_blank() {
        assert!(PsuIdData::empty().is_empty());
        let blank = PsuIdData {
            psu_id: Some("  ".into()),
            psu_id_type: Some("private".into()),
            ..PsuIdData::default()
        };
        assert!(blank.is_empty());
        assert!(!PsuIdData::new("alice").is_empty());
        assert!(!PsuIdData::empty().with_corporate_id("acme").is_empty());
    }

    #[test]
    fn test_same_party_ignores_type_qualifiers() {
        let a = PsuIdData {
            psu_id_type: Some("private".into()),
            ..PsuIdData::new("alice")
        };
        let b = PsuIdData::new("alice");
        assert!(a.same_party(&b));
        assert!(!a.same_party(&PsuIdData::new("bob")));
    }

    #[test]
    fn test_psu_display() {
        assert_eq!(PsuIdData::new("alice").to_string(), "alice");
        assert_eq!(PsuIdData::empty().to_string(), "<anonymous>");
        assert_eq!(
            PsuIdData::new("alice").with_corporate_id("acme").to_string(),
            "alice@acme"
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn psu_strategy() -> impl Strategy<Value = PsuIdData> {
        (
            proptest::option::of("[ a-c]{0,3}"),
            proptest::option::of("[a-z]{0,4}"),
            proptest::option::of("[ x-z]{0,3}"),
        )
            .prop_map(|(psu_id, psu_id_type, psu_corporate_id)| PsuIdData {
                psu_id,
                psu_id_type,
                psu_corporate_id,
                psu_corporate_id_type: None,
            })
    }

    proptest! {
        #[test]
        fn same_party_is_reflexive(psu in psu_strategy()) {
            prop_assert!(psu.same_party(&psu));
        }

        #[test]
        fn same_party_is_symmetric(a in psu_strategy(), b in psu_strategy()) {
            prop_assert_eq!(a.same_party(&b), b.same_party(&a));
        }

        #[test]
        fn empty_identities_are_the_same_party(a in psu_strategy(), b in psu_strategy()) {
            if a.is_empty() && b.is_empty() {
                prop_assert!(a.same_party(&b));
            }
        }
    }
}
