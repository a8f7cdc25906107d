//! # Request Context
//!
//! Per-request values threaded explicitly through every engine call. The
//! engine keeps no ambient request state, so concurrent requests never see
//! each other's redirect ids or preference headers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Correlation id, echoed in logs and passed to the bank adapter.
    pub request_id: Uuid,
    /// `TPP-Redirect-Preferred` header, if sent.
    pub redirect_preferred: Option<bool>,
    /// `TPP-Decoupled-Preferred` header, if sent.
    pub decoupled_preferred: Option<bool>,
    /// Redirect id to embed in redirect links. Defaults to the
    /// authorisation id when absent.
    pub redirect_id: Option<String>,
    pub tpp_id: Option<String>,
    pub tpp_redirect_uri: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            redirect_preferred: None,
            decoupled_preferred: None,
            redirect_id: None,
            tpp_id: None,
            tpp_redirect_uri: None,
        }
    }

    pub fn with_preferences(mut self, redirect: Option<bool>, decoupled: Option<bool>) -> Self {
        self.redirect_preferred = redirect;
        self.decoupled_preferred = decoupled;
        self
    }

    pub fn with_redirect_id(mut self, redirect_id: impl Into<String>) -> Self {
        self.redirect_id = Some(redirect_id.into());
        self
    }

    pub fn with_tpp(mut self, tpp_id: impl Into<String>) -> Self {
        self.tpp_id = Some(tpp_id.into());
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
