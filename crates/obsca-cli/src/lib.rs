//! # obsca-cli — CLI for the SCA Authorisation Engine
//!
//! Provides the `obsca` command-line interface for operators wiring the
//! engine into an ASPSP installation.
//!
//! ## Subcommands
//!
//! - `obsca profile`: Load, validate and print an ASPSP profile.
//! - `obsca resolve`: Show which approach a TPP's preference headers select.
//! - `obsca simulate`: Run an SCA scenario end to end against the sandbox bank.
//!
//! ```bash
//! obsca profile config/profile.yaml
//! obsca resolve --approaches REDIRECT,EMBEDDED --redirect-preferred false
//! obsca simulate embedded --object payment
//! ```

pub mod profile;
pub mod resolve;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};

use obsca_engine::AspspProfile;

/// Load the profile from `path`, or from the environment when no path is
/// given (`OBSCA_PROFILE`, `OBSCA_SCA_APPROACHES`, ...).
pub fn load_profile(path: Option<&Path>) -> Result<AspspProfile> {
    match path {
        Some(path) => AspspProfile::from_path(path)
            .with_context(|| format!("invalid profile {}", path.display())),
        None => AspspProfile::from_env().context("invalid profile from environment"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use obsca_core::ScaApproach;

    #[test]
    fn test_load_profile_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sca_approaches: [EMBEDDED, DECOUPLED]").unwrap();
        let profile = load_profile(Some(file.path())).unwrap();
        assert_eq!(profile.sca_approaches, vec![ScaApproach::Embedded, ScaApproach::Decoupled]);
    }

    #[test]
    fn test_load_profile_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sca_approaches: []").unwrap();
        let err = load_profile(Some(file.path())).unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("invalid profile"));
        assert!(rendered.contains("no SCA approach"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_profile(Some(Path::new("/nonexistent/obsca/profile.yaml"))).is_err());
    }
}
