//! # Caller-Facing Requests
//!
//! Inputs to the orchestrators' create and update operations, as parsed by
//! the (excluded) REST layer. `Debug` output redacts every credential.

use obsca_core::{AuthorisationId, BusinessObjectId, PsuIdData};

#[derive(Clone, PartialEq, Eq)]
pub struct CreateAuthorisationRequest {
    pub business_object_id: BusinessObjectId,
    pub psu: PsuIdData,
    /// Inline password; when present the engine continues straight into
    /// the first update step.
    pub password: Option<String>,
}

impl CreateAuthorisationRequest {
    pub fn new(business_object_id: BusinessObjectId, psu: PsuIdData) -> Self {
        Self {
            business_object_id,
            psu,
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl std::fmt::Debug for CreateAuthorisationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAuthorisationRequest")
            .field("business_object_id", &self.business_object_id)
            .field("psu", &self.psu)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct UpdateAuthorisationRequest {
    pub business_object_id: BusinessObjectId,
    pub authorisation_id: AuthorisationId,
    pub psu: PsuIdData,
    pub password: Option<String>,
    pub authentication_method_id: Option<String>,
    /// TAN or other SCA proof.
    pub sca_authentication_data: Option<String>,
    /// Redirect confirmation code.
    pub confirmation_code: Option<String>,
}

impl UpdateAuthorisationRequest {
    pub fn new(business_object_id: BusinessObjectId, authorisation_id: AuthorisationId, psu: PsuIdData) -> Self {
        Self {
            business_object_id,
            authorisation_id,
            psu,
            password: None,
            authentication_method_id: None,
            sca_authentication_data: None,
            confirmation_code: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_method(mut self, method_id: impl Into<String>) -> Self {
        self.authentication_method_id = Some(method_id.into());
        self
    }

    pub fn with_sca_data(mut self, data: impl Into<String>) -> Self {
        self.sca_authentication_data = Some(data.into());
        self
    }

    pub fn with_confirmation_code(mut self, code: impl Into<String>) -> Self {
        self.confirmation_code = Some(code.into());
        self
    }

    /// Carries only the PSU identity and nothing to act on.
    pub fn is_identification_only(&self) -> bool {
        !self.psu.is_empty()
            && self.password.is_none()
            && self.authentication_method_id.is_none()
            && self.sca_authentication_data.is_none()
            && self.confirmation_code.is_none()
    }

    pub fn has_confirmation_code(&self) -> bool {
        self.confirmation_code.as_deref().map(|c| !c.is_empty()).unwrap_or(false)
    }
}

impl std::fmt::Debug for UpdateAuthorisationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateAuthorisationRequest")
            .field("business_object_id", &self.business_object_id)
            .field("authorisation_id", &self.authorisation_id)
            .field("psu", &self.psu)
            .field("password", &redacted(&self.password))
            .field("authentication_method_id", &self.authentication_method_id)
            .field("sca_authentication_data", &redacted(&self.sca_authentication_data))
            .field("confirmation_code", &redacted(&self.confirmation_code))
            .finish()
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "[REDACTED]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> UpdateAuthorisationRequest {
        UpdateAuthorisationRequest::new(
            BusinessObjectId::new("consent-1").unwrap(),
            AuthorisationId::new(),
            PsuIdData::new("alice"),
        )
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let rendered = format!("{:?}", update().with_password("hunter2").with_sca_data("987654"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("987654"));
        assert!(rendered.contains("[REDACTED]"));

        let create = CreateAuthorisationRequest::new(BusinessObjectId::generate(), PsuIdData::new("alice"))
            .with_password("hunter2");
        assert!(!format!("{create:?}").contains("hunter2"));
    }

    #[test]
    fn test_identification_only() {
        assert!(update().is_identification_only());
        assert!(!update().with_password("x").is_identification_only());
        let mut anonymous = update();
        anonymous.psu = PsuIdData::empty();
        assert!(!anonymous.is_identification_only());
    }

    #[test]
    fn test_empty_confirmation_code_is_absent() {
        assert!(!update().with_confirmation_code("").has_confirmation_code());
        assert!(update().with_confirmation_code("abc").has_confirmation_code());
    }
}
