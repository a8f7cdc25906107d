//! # Resolve Subcommand
//!
//! Shows which SCA approach a new authorisation would get for a given
//! combination of `TPP-Redirect-Preferred` and `TPP-Decoupled-Preferred`
//! header values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use obsca_core::ScaApproach;
use obsca_engine::resolver;
use obsca_engine::AspspProfile;

/// Arguments for the `obsca resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Enabled approaches in order, e.g. `REDIRECT,EMBEDDED`. Overrides
    /// the profile.
    #[arg(long, value_delimiter = ',')]
    pub approaches: Vec<ScaApproach>,

    /// Profile file to take the approaches from.
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Value of the TPP-Redirect-Preferred header.
    #[arg(long, value_name = "BOOL")]
    pub redirect_preferred: Option<bool>,

    /// Value of the TPP-Decoupled-Preferred header.
    #[arg(long, value_name = "BOOL")]
    pub decoupled_preferred: Option<bool>,
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs) -> Result<u8> {
    let profile = if args.approaches.is_empty() {
        crate::load_profile(args.profile.as_deref())?
    } else {
        AspspProfile::with_approaches(args.approaches.clone()).context("invalid --approaches")?
    };
    match resolve_for(&profile, args) {
        Some(approach) => {
            println!("{approach}");
            Ok(0)
        }
        None => {
            println!("FAIL: profile enables no SCA approach");
            Ok(1)
        }
    }
}

fn resolve_for(profile: &AspspProfile, args: &ResolveArgs) -> Option<ScaApproach> {
    let approach = resolver::resolve(&profile.sca_approaches, args.redirect_preferred, args.decoupled_preferred);
    tracing::debug!(
        approaches = ?profile.sca_approaches,
        redirect_preferred = ?args.redirect_preferred,
        decoupled_preferred = ?args.decoupled_preferred,
        resolved = ?approach,
        "approach resolved"
    );
    approach
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(approaches: Vec<ScaApproach>, redirect: Option<bool>, decoupled: Option<bool>) -> ResolveArgs {
        ResolveArgs {
            approaches,
            profile: None,
            redirect_preferred: redirect,
            decoupled_preferred: decoupled,
        }
    }

    #[test]
    fn test_resolve_honours_preferences() {
        let a = args(
            vec![ScaApproach::Embedded, ScaApproach::Redirect],
            Some(true),
            None,
        );
        let profile = AspspProfile::with_approaches(a.approaches.clone()).unwrap();
        assert_eq!(resolve_for(&profile, &a), Some(ScaApproach::Redirect));
    }

    #[test]
    fn test_run_resolve_with_explicit_approaches() {
        let a = args(vec![ScaApproach::Decoupled], Some(true), Some(false));
        assert_eq!(run_resolve(&a).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_approaches_are_an_error() {
        let a = args(vec![ScaApproach::Embedded, ScaApproach::Embedded], None, None);
        assert!(run_resolve(&a).is_err());
    }
}
