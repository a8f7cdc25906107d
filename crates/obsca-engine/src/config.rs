//! # ASPSP Profile
//!
//! Installation-wide settings the engine reads on every request: which SCA
//! approaches are enabled and in what order, and how the redirect
//! approach finalises.
//!
//! Load from YAML ([`AspspProfile::from_path`]) or from the environment
//! ([`AspspProfile::from_env`]). Every constructor validates before
//! returning.
//!
//! ```yaml
//! sca_approaches: [REDIRECT, EMBEDDED, DECOUPLED]
//! authorisation_confirmation_request_mandated: true
//! confirmation_code_checked_locally: true
//! redirect_link_template: "https://bank.example/sca/{redirect-id}?object={object-id}"
//! redirect_url_expiration_secs: 600
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use obsca_core::ScaApproach;

/// Placeholder replaced by the redirect id in redirect links.
pub const REDIRECT_ID_PLACEHOLDER: &str = "{redirect-id}";
/// Placeholder replaced by the business object id in redirect links.
pub const OBJECT_ID_PLACEHOLDER: &str = "{object-id}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AspspProfile {
    /// Enabled approaches, in order of preference.
    pub sca_approaches: Vec<ScaApproach>,
    /// Redirect SCA ends in UNCONFIRMED and the TPP must send the
    /// confirmation code to finalise.
    pub authorisation_confirmation_request_mandated: bool,
    /// Compare confirmation codes against the stored digest instead of
    /// asking the bank adapter.
    pub confirmation_code_checked_locally: bool,
    pub redirect_link_template: String,
    /// Lifetime of a redirect link; the authorisation fails if confirmed
    /// after it.
    pub redirect_url_expiration_secs: u64,
    /// One-off "available accounts" consents still require full SCA.
    pub sca_by_one_time_available_accounts_consent_required: bool,
}

impl Default for AspspProfile {
    fn default() -> Self {
        Self {
            sca_approaches: vec![ScaApproach::Redirect, ScaApproach::Embedded, ScaApproach::Decoupled],
            authorisation_confirmation_request_mandated: false,
            confirmation_code_checked_locally: false,
            redirect_link_template: format!(
                "https://bank.example/sca/{REDIRECT_ID_PLACEHOLDER}?object={OBJECT_ID_PLACEHOLDER}"
            ),
            redirect_url_expiration_secs: 600,
            sca_by_one_time_available_accounts_consent_required: true,
        }
    }
}

impl AspspProfile {
    /// Profile enabling exactly the given approaches, other settings default.
    pub fn with_approaches(approaches: Vec<ScaApproach>) -> Result<Self, ConfigError> {
        let profile = Self {
            sca_approaches: approaches,
            ..Self::default()
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let profile: Self = serde_yaml::from_str(yaml)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Load from environment variables.
    ///
    /// Variables:
    /// - `OBSCA_PROFILE`: path of a YAML profile (default: built-in defaults)
    /// - `OBSCA_SCA_APPROACHES`: comma-separated approach list, overrides the file
    /// - `OBSCA_CONFIRMATION_MANDATED`: `true`/`false`, overrides the file
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut profile = match lookup("OBSCA_PROFILE") {
            Some(path) => Self::from_path(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(raw) = lookup("OBSCA_SCA_APPROACHES") {
            profile.sca_approaches = raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.parse().map_err(|_| ConfigError::InvalidEnv {
                        var: "OBSCA_SCA_APPROACHES".to_string(),
                        value: raw.clone(),
                    })
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(raw) = lookup("OBSCA_CONFIRMATION_MANDATED") {
            profile.authorisation_confirmation_request_mandated =
                raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "OBSCA_CONFIRMATION_MANDATED".to_string(),
                    value: raw.clone(),
                })?;
        }
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sca_approaches.is_empty() {
            return Err(ConfigError::NoApproaches);
        }
        for (i, approach) in self.sca_approaches.iter().enumerate() {
            if self.sca_approaches[..i].contains(approach) {
                return Err(ConfigError::DuplicateApproach(*approach));
            }
        }
        if self.sca_approaches.contains(&ScaApproach::Redirect)
            && !self.redirect_link_template.contains(REDIRECT_ID_PLACEHOLDER)
        {
            return Err(ConfigError::InvalidTemplate(self.redirect_link_template.clone()));
        }
        Ok(())
    }

    pub fn supports(&self, approach: ScaApproach) -> bool {
        self.sca_approaches.contains(&approach)
    }

    /// Redirect link for the PSU.
    pub fn redirect_link(&self, redirect_id: &str, object_id: &str) -> String {
        self.redirect_link_template
            .replace(REDIRECT_ID_PLACEHOLDER, redirect_id)
            .replace(OBJECT_ID_PLACEHOLDER, object_id)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profile: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("profile enables no SCA approach")]
    NoApproaches,
    #[error("SCA approach {0} listed more than once")]
    DuplicateApproach(ScaApproach),
    #[error("redirect link template {0:?} lacks the {{redirect-id}} placeholder")]
    InvalidTemplate(String),
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },
}
