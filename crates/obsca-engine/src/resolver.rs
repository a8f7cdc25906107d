//! # SCA Approach Resolver
//!
//! Picks the approach for a new authorisation from the profile's ordered
//! approach list and the TPP's two optional preference headers.
//!
//! ## Precedence
//!
//! 1. One configured approach: return it, preferences ignored.
//! 2. No preference sent: first configured.
//! 3. Both preferences `true`: first configured unless it is EMBEDDED, in
//!    which case the second.
//! 4. Redirect preferred and REDIRECT configured: REDIRECT.
//! 5. Decoupled preferred and DECOUPLED configured: DECOUPLED.
//! 6. First configured is DECOUPLED and decoupled was explicitly declined:
//!    second configured. Same for REDIRECT with redirect declined. Both
//!    declined and EMBEDDED configured: EMBEDDED. Otherwise first.
//!
//! Rule 6 only reacts to an explicit `false`. A header that was never sent
//! leaves the first approach in place.
//!
//! Pure function, no I/O.

use obsca_core::ScaApproach;

/// Resolve the approach. `None` only when `configured` is empty.
pub fn resolve(
    configured: &[ScaApproach],
    redirect_preferred: Option<bool>,
    decoupled_preferred: Option<bool>,
) -> Option<ScaApproach> {
    let first = *configured.first()?;
    let second = match configured.get(1) {
        Some(second) => *second,
        None => return Some(first),
    };

    match (redirect_preferred, decoupled_preferred) {
        (None, None) => return Some(first),
        (Some(true), Some(true)) => {
            return Some(if first == ScaApproach::Embedded { second } else { first });
        }
        _ => {}
    }

    if redirect_preferred == Some(true) && configured.contains(&ScaApproach::Redirect) {
        return Some(ScaApproach::Redirect);
    }
    if decoupled_preferred == Some(true) && configured.contains(&ScaApproach::Decoupled) {
        return Some(ScaApproach::Decoupled);
    }
    if first == ScaApproach::Decoupled && decoupled_preferred == Some(false) {
        return Some(second);
    }
    if first == ScaApproach::Redirect && redirect_preferred == Some(false) {
        return Some(second);
    }
    if redirect_preferred == Some(false)
        && decoupled_preferred == Some(false)
        && configured.contains(&ScaApproach::Embedded)
    {
        return Some(ScaApproach::Embedded);
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ScaApproach::{Decoupled, Embedded, Redirect};

    #[test]
    fn test_empty_list_resolves_nothing() {
        assert_eq!(resolve(&[], Some(true), None), None);
    }

    #[test]
    fn test_single_approach_overrides_preferences() {
        assert_eq!(resolve(&[Redirect], Some(false), None), Some(Redirect));
        assert_eq!(resolve(&[Embedded], Some(true), Some(true)), Some(Embedded));
        assert_eq!(resolve(&[Decoupled], None, Some(false)), Some(Decoupled));
    }

    #[test]
    fn test_no_preferences_first_wins() {
        assert_eq!(resolve(&[Decoupled, Embedded], None, None), Some(Decoupled));
        assert_eq!(resolve(&[Embedded, Redirect], None, None), Some(Embedded));
    }

    #[test]
    fn test_both_preferred_skips_leading_embedded() {
        assert_eq!(resolve(&[Embedded, Redirect], Some(true), Some(true)), Some(Redirect));
        assert_eq!(resolve(&[Decoupled, Embedded], Some(true), Some(true)), Some(Decoupled));
        assert_eq!(resolve(&[Redirect, Decoupled], Some(true), Some(true)), Some(Redirect));
    }

    #[test]
    fn test_redirect_preferred() {
        assert_eq!(resolve(&[Embedded, Redirect], Some(true), None), Some(Redirect));
        assert_eq!(resolve(&[Embedded, Redirect], Some(false), None), Some(Embedded));
    }

    #[test]
    fn test_redirect_preferred_but_not_configured() {
        assert_eq!(resolve(&[Embedded, Decoupled], Some(true), None), Some(Embedded));
        assert_eq!(resolve(&[Decoupled, Embedded], Some(true), None), Some(Decoupled));
    }

    #[test]
    fn test_decoupled_preferred() {
        assert_eq!(resolve(&[Embedded, Decoupled], None, Some(true)), Some(Decoupled));
        assert_eq!(resolve(&[Redirect, Embedded], Some(false), Some(true)), Some(Embedded));
    }

    #[test]
    fn test_leading_redirect_declined_takes_second() {
        assert_eq!(resolve(&[Redirect, Embedded, Decoupled], Some(false), None), Some(Embedded));
        assert_eq!(resolve(&[Redirect, Decoupled, Embedded], Some(false), None), Some(Decoupled));
    }

    #[test]
    fn test_leading_decoupled_declined_takes_second() {
        assert_eq!(resolve(&[Decoupled, Redirect], None, Some(false)), Some(Redirect));
        assert_eq!(resolve(&[Decoupled, Embedded, Redirect], Some(false), None), Some(Decoupled));
    }

    #[test]
    fn test_both_declined_prefers_embedded() {
        assert_eq!(resolve(&[Redirect, Embedded], Some(false), Some(false)), Some(Embedded));
        assert_eq!(resolve(&[Embedded, Decoupled], Some(false), Some(false)), Some(Embedded));
    }
}
