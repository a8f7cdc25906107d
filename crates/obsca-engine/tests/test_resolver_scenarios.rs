//! # Approach Resolution Scenarios
//!
//! Preference-header combinations against the profile's ordered approach
//! list, exercised through the resolver and through the engine facade.

use std::sync::Arc;

use obsca_core::ScaApproach::{self, Decoupled, Embedded, Redirect};
use obsca_engine::resolver::resolve;
use obsca_engine::{AspspProfile, InMemoryRegistry, RequestContext, SandboxBank, ScaEngine};

#[test]
fn test_no_preferences_first_wins() {
    assert_eq!(resolve(&[Decoupled, Embedded], None, None), Some(Decoupled));
}

#[test]
fn test_both_preferred_skips_leading_embedded() {
    assert_eq!(resolve(&[Embedded, Redirect], Some(true), Some(true)), Some(Redirect));
}

#[test]
fn test_single_approach_ignores_preferences() {
    assert_eq!(resolve(&[Redirect], Some(false), None), Some(Redirect));
    assert_eq!(resolve(&[Embedded], Some(true), Some(true)), Some(Embedded));
}

#[test]
fn test_redirect_preference_honoured_when_configured() {
    assert_eq!(resolve(&[Embedded, Decoupled, Redirect], Some(true), None), Some(Redirect));
    assert_eq!(resolve(&[Embedded, Decoupled], Some(true), None), Some(Embedded));
}

#[test]
fn test_decoupled_preference_honoured_when_configured() {
    assert_eq!(resolve(&[Redirect, Decoupled], Some(false), Some(true)), Some(Decoupled));
}

#[test]
fn test_declined_leading_approach_falls_to_second() {
    assert_eq!(resolve(&[Decoupled, Embedded], None, Some(false)), Some(Embedded));
    assert_eq!(resolve(&[Redirect, Embedded], Some(false), None), Some(Embedded));
}

#[test]
fn test_both_declined_prefers_embedded() {
    assert_eq!(resolve(&[Embedded, Redirect], Some(false), Some(false)), Some(Embedded));
}

#[test]
fn test_empty_configuration() {
    assert_eq!(resolve(&[], Some(true), Some(true)), None);
}

#[test]
fn test_engine_uses_request_context() {
    let profile = AspspProfile::with_approaches(vec![Embedded, Redirect, Decoupled]).unwrap();
    let engine = ScaEngine::new(
        Arc::new(InMemoryRegistry::new()),
        Arc::new(SandboxBank::default()),
        profile,
    )
    .unwrap();

    let cases: [(Option<bool>, Option<bool>, ScaApproach); 3] = [
        (None, None, Embedded),
        (Some(true), None, Redirect),
        (None, Some(true), Decoupled),
    ];
    for (redirect, decoupled, expected) in cases {
        let ctx = RequestContext::new().with_preferences(redirect, decoupled);
        assert_eq!(engine.resolve_approach(&ctx), Some(expected));
    }
}
