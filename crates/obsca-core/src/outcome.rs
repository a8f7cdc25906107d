//! # Outcome
//!
//! Success-or-failure result of a caller-facing operation. Expected
//! failures (unknown consent, wrong password, blocked endpoint) are
//! `Outcome::Failure`; only faults travel as `Result::Err`.

use serde::{Deserialize, Serialize};

use crate::message::{ErrorClass, ErrorHolder};

/// Result of a caller-facing operation: a body or an error holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "body", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The operation completed.
    Success(T),
    /// The operation failed in an expected way.
    Failure(ErrorHolder),
}

impl<T> Outcome<T> {
    /// True for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The success body, if any.
    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(body) => Some(body),
            Self::Failure(_) => None,
        }
    }

    /// The error holder, if any.
    pub fn error(&self) -> Option<&ErrorHolder> {
        match self {
            Self::Success(_) => None,
            Self::Failure(holder) => Some(holder),
        }
    }

    /// Class of the failure, if any.
    pub fn error_class(&self) -> Option<ErrorClass> {
        self.error().map(ErrorHolder::class)
    }

    /// Transform the success body, passing failures through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(body) => Outcome::Success(f(body)),
            Self::Failure(holder) => Outcome::Failure(holder),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T, ErrorHolder> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure(holder) => Err(holder),
        }
    }
}

impl<T> From<ErrorHolder> for Outcome<T> {
    fn from(holder: ErrorHolder) -> Self {
        Self::Failure(holder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceType;
    use crate::message::MessageErrorCode;

    #[test]
    fn test_map_preserves_failure() {
        let failed: Outcome<u8> =
            ErrorHolder::new(ServiceType::Ais, MessageErrorCode::ConsentUnknown403).into();
        let mapped = failed.map(|n| n + 1);
        assert_eq!(mapped.error_class(), Some(ErrorClass::NotFound));
    }

    #[test]
    fn test_success_accessors() {
        let ok = Outcome::Success(7u8);
        assert!(ok.is_success());
        assert_eq!(ok.success(), Some(&7));
        assert!(ok.error().is_none());
        assert_eq!(ok.into_result().unwrap(), 7);
    }
}
