//! # Flow Error Types
//!
//! Typed error handling for the cardvault token lifecycle.
//! All flow operations return `Result<T, FlowError>`.

use crate::store::StorageError;
use crate::validate::FieldErrors;
use thiserror::Error;

/// Core error type for tokenization and payment operations
#[derive(Debug, Error)]
pub enum FlowError {
    /// Local input failed shape/format checks; field-keyed so callers can
    /// render per-field messages. Never triggers a collaborator call.
    #[error("invalid input: {}", format_fields(.0))]
    Validation(FieldErrors),

    /// The encryption or payment collaborator rejected the normalized
    /// request at its own validation layer.
    #[error("card data rejected: {}", .messages.join("; "))]
    CollaboratorValidation { messages: Vec<String> },

    /// The encryption call exceeded its deadline. Distinct from a generic
    /// error: this usually means a collaborator or session problem, not
    /// bad input.
    #[error("encryption did not complete within {limit_secs}s")]
    EncryptionTimeout { limit_secs: u64 },

    /// The encryption collaborator reported success but produced nothing
    #[error("encryption collaborator returned an empty token")]
    EmptyEncryptionResult,

    /// Payment was submitted with an empty token store
    #[error("no card token available; tokenize a card first")]
    NoTokenAvailable,

    /// Payment or capture collaborator returned a failure envelope
    #[error("remote failure [{status}]: {message}")]
    RemoteFailure { status: String, message: String },

    /// Token store operation failed at the persistence layer
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors (missing env vars, invalid config)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network/HTTP error communicating with a collaborator
    #[error("network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlowError {
    /// Returns true if a user-triggered re-invocation may succeed without
    /// changing the input. Nothing is retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FlowError::EncryptionTimeout { .. }
                | FlowError::EmptyEncryptionResult
                | FlowError::Network(_)
                | FlowError::RemoteFailure { .. }
                | FlowError::Storage(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FlowError::Validation(_) => 422,
            FlowError::CollaboratorValidation { .. } => 422,
            FlowError::EncryptionTimeout { .. } => 504,
            FlowError::EmptyEncryptionResult => 502,
            FlowError::NoTokenAvailable => 409,
            FlowError::RemoteFailure { .. } => 502,
            FlowError::Storage(_) => 503,
            FlowError::Configuration(_) => 500,
            FlowError::Network(_) => 503,
            FlowError::Serialization(_) => 500,
            FlowError::Internal(_) => 500,
        }
    }

    /// Convenience constructor for a single-field validation error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), message.into());
        FlowError::Validation(fields)
    }
}

fn format_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(FlowError::Network("timeout".into()).is_retryable());
        assert!(FlowError::EncryptionTimeout { limit_secs: 5 }.is_retryable());
        assert!(!FlowError::NoTokenAvailable.is_retryable());
        assert!(!FlowError::invalid_field("cvv", "cvv must be 3 or 4 digits").is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FlowError::NoTokenAvailable.status_code(), 409);
        assert_eq!(
            FlowError::EncryptionTimeout { limit_secs: 5 }.status_code(),
            504
        );
        assert_eq!(
            FlowError::RemoteFailure {
                status: "REJECTED".into(),
                message: "card declined".into()
            }
            .status_code(),
            502
        );
    }

    #[test]
    fn test_field_errors_display() {
        let err = FlowError::invalid_field("expiry", "expiry must be in MM/YY form");
        assert_eq!(
            err.to_string(),
            "invalid input: expiry: expiry must be in MM/YY form"
        );
    }
}
