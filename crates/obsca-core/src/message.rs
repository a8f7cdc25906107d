//! # Caller-Facing Message Taxonomy
//!
//! Machine-readable messages returned to the TPP, and the [`ErrorHolder`]
//! that short-circuits a response when an operation fails.
//!
//! ## Error Classes
//!
//! Every [`MessageErrorCode`] belongs to exactly one [`ErrorClass`]:
//!
//! | Class | Meaning | State effect |
//! |-------|---------|--------------|
//! | `NotFound` | business object or authorisation absent | none |
//! | `Validation` | malformed or disallowed request | none |
//! | `Expired` | business object past validity | none |
//! | `CredentialsInvalid` | wrong or missing PSU identity | authorisation FAILED |
//! | `Blocked` | endpoint inaccessible in current state | none |
//! | `AdapterError` | bank adapter reported failure | processor decides |
//!
//! Dispatch-table gaps are not in this table: they are faults, surfaced as
//! Rust errors by the engine rather than as messages.

use serde::{Deserialize, Serialize};

use crate::domain::ServiceType;

/// Coarse classification of a failure, used by the engine to decide side
/// effects and by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    /// The consent, payment or authorisation does not exist.
    NotFound,
    /// The request or the object's status forbids the operation.
    Validation,
    /// The object or the redirect link has expired.
    Expired,
    /// PSU identity or credentials were rejected.
    CredentialsInvalid,
    /// The endpoint is not accessible in the current state.
    Blocked,
    /// The bank-side adapter failed.
    AdapterError,
}

impl ErrorClass {
    /// Wire name of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Expired => "EXPIRED",
            Self::CredentialsInvalid => "CREDENTIALS_INVALID",
            Self::Blocked => "BLOCKED",
            Self::AdapterError => "ADAPTER_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specific error code reported to the TPP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageErrorCode {
    /// Consent unknown, reported with 403.
    ConsentUnknown403,
    /// Consent unknown, reported with 400.
    ConsentUnknown400,
    /// Resource (payment or authorisation) unknown, reported with 403.
    ResourceUnknown403,
    /// Resource unknown, reported with 404.
    ResourceUnknown404,
    /// Consent validity has elapsed.
    ConsentExpired,
    /// Authorisation or redirect link has expired.
    ResourceExpired403,
    /// Consent exists but is in a status that forbids the operation.
    ConsentInvalid,
    /// PSU id or credentials rejected by the bank.
    PsuCredentialsInvalid,
    /// No PSU identity on the request nor on the authorisation.
    FormatErrorNoPsu,
    /// Malformed request, e.g. a missing confirmation code.
    FormatError,
    /// The endpoint may not be called in the authorisation's current state.
    ServiceBlocked,
    /// The SCA approach or authentication data is not acceptable.
    ScaInvalid,
    /// The chosen SCA method is not offered for this PSU.
    ScaMethodUnknown,
    /// The requested status change is not allowed.
    StatusInvalid,
    /// The service is not offered under the current configuration.
    ServiceInvalid400,
    /// Generic bank-side failure.
    InternalServerError,
}

impl MessageErrorCode {
    /// Wire code as rendered in the TPP message.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConsentUnknown403 | Self::ConsentUnknown400 => "CONSENT_UNKNOWN",
            Self::ResourceUnknown403 | Self::ResourceUnknown404 => "RESOURCE_UNKNOWN",
            Self::ConsentExpired => "CONSENT_EXPIRED",
            Self::ResourceExpired403 => "RESOURCE_EXPIRED",
            Self::ConsentInvalid => "CONSENT_INVALID",
            Self::PsuCredentialsInvalid => "PSU_CREDENTIALS_INVALID",
            Self::FormatErrorNoPsu | Self::FormatError => "FORMAT_ERROR",
            Self::ServiceBlocked => "SERVICE_BLOCKED",
            Self::ScaInvalid => "SCA_INVALID",
            Self::ScaMethodUnknown => "SCA_METHOD_UNKNOWN",
            Self::StatusInvalid => "STATUS_INVALID",
            Self::ServiceInvalid400 => "SERVICE_INVALID",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status the REST layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ConsentUnknown400
            | Self::FormatErrorNoPsu
            | Self::FormatError
            | Self::ScaInvalid
            | Self::ScaMethodUnknown
            | Self::ServiceInvalid400 => 400,
            Self::ConsentExpired | Self::ConsentInvalid | Self::PsuCredentialsInvalid => 401,
            Self::ConsentUnknown403
            | Self::ResourceUnknown403
            | Self::ResourceExpired403
            | Self::ServiceBlocked => 403,
            Self::ResourceUnknown404 => 404,
            Self::StatusInvalid => 409,
            Self::InternalServerError => 500,
        }
    }

    /// Coarse class of the code.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ConsentUnknown403
            | Self::ConsentUnknown400
            | Self::ResourceUnknown403
            | Self::ResourceUnknown404 => ErrorClass::NotFound,
            Self::ConsentExpired | Self::ResourceExpired403 => ErrorClass::Expired,
            Self::PsuCredentialsInvalid | Self::FormatErrorNoPsu => ErrorClass::CredentialsInvalid,
            Self::ServiceBlocked => ErrorClass::Blocked,
            Self::ScaMethodUnknown | Self::InternalServerError => ErrorClass::AdapterError,
            Self::ConsentInvalid
            | Self::FormatError
            | Self::ScaInvalid
            | Self::StatusInvalid
            | Self::ServiceInvalid400 => ErrorClass::Validation,
        }
    }

    /// Whether reporting this code during an update must fail the
    /// authorisation.
    pub fn fails_authorisation(&self) -> bool {
        self.class() == ErrorClass::CredentialsInvalid
    }
}

impl std::fmt::Display for MessageErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a TPP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageCategory {
    /// The operation failed.
    Error,
    /// Informational; the operation may still have succeeded.
    Warning,
}

/// One machine-readable message for the TPP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TppMessage {
    /// Severity.
    pub category: MessageCategory,
    /// Machine-readable code.
    pub code: MessageErrorCode,
    /// Optional free text. Never contains credentials.
    pub text: Option<String>,
}

impl TppMessage {
    /// Error-category message without text.
    pub fn error(code: MessageErrorCode) -> Self {
        Self {
            category: MessageCategory::Error,
            code,
            text: None,
        }
    }

    /// Warning-category message without text.
    pub fn warning(code: MessageErrorCode) -> Self {
        Self {
            category: MessageCategory::Warning,
            code,
            text: None,
        }
    }

    /// Attach free text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl std::fmt::Display for TppMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{}: {text}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

/// A failed operation's payload: the service family and at least one
/// error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorHolder {
    /// Service family the failure is reported under.
    pub service_type: ServiceType,
    /// Messages in reporting order.
    pub messages: Vec<TppMessage>,
}

impl ErrorHolder {
    /// Holder with a single error message.
    pub fn new(service_type: ServiceType, code: MessageErrorCode) -> Self {
        Self {
            service_type,
            messages: vec![TppMessage::error(code)],
        }
    }

    /// Holder built from adapter-supplied messages. Falls back to
    /// `INTERNAL_SERVER_ERROR` when the adapter gave none.
    pub fn from_messages(service_type: ServiceType, messages: Vec<TppMessage>) -> Self {
        if messages.is_empty() {
            return Self::new(service_type, MessageErrorCode::InternalServerError);
        }
        Self {
            service_type,
            messages,
        }
    }

    /// Attach free text to the primary message.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        if let Some(first) = self.messages.first_mut() {
            first.text = Some(text.into());
        }
        self
    }

    /// Code of the first error message. Drives classification.
    pub fn primary_code(&self) -> MessageErrorCode {
        self.messages
            .iter()
            .find(|m| m.category == MessageCategory::Error)
            .or_else(|| self.messages.first())
            .map(|m| m.code)
            .unwrap_or(MessageErrorCode::InternalServerError)
    }

    /// Class of the primary code.
    pub fn class(&self) -> ErrorClass {
        self.primary_code().class()
    }

    /// HTTP status of the primary code.
    pub fn http_status(&self) -> u16 {
        self.primary_code().http_status()
    }

    /// True when any message carries `code`.
    pub fn has_code(&self, code: MessageErrorCode) -> bool {
        self.messages.iter().any(|m| m.code == code)
    }
}

impl std::fmt::Display for ErrorHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error", self.service_type)?;
        for message in &self.messages {
            write!(f, " [{message}]")?;
        }
        Ok(())
    }
}
