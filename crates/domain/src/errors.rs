//! Error taxonomy of the data layer.

use shared::jwt::JwtError;
use shared::pagination::CursorError;
use shared::password::{PasswordError, PasswordPolicyViolation};
use thiserror::Error;

/// Errors surfaced by repositories, storage backends and services.
///
/// Every variant is a distinguishable kind for the calling web layer;
/// none are swallowed inside this crate.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A unique constraint was violated (duplicate email, duplicate share link).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced profile, group, photo or like does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input failed validation (enum value, email syntax, field length).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A foreign-key or cascade rule would be violated.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Credentials or tokens were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The blob storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Conflict(_) => "conflict",
            DomainError::NotFound(_) => "not_found",
            DomainError::Validation(_) => "validation_error",
            DomainError::Integrity(_) => "integrity_error",
            DomainError::Unauthorized(_) => "unauthorized",
            DomainError::Storage(_) => "storage_error",
            DomainError::Internal(_) => "internal_error",
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();

        DomainError::Validation(messages.join("; "))
    }
}

impl From<validator::ValidationError> for DomainError {
    fn from(error: validator::ValidationError) -> Self {
        let message = error
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| error.code.to_string());
        DomainError::Validation(message)
    }
}

impl From<PasswordPolicyViolation> for DomainError {
    fn from(violation: PasswordPolicyViolation) -> Self {
        DomainError::Validation(violation.to_string())
    }
}

impl From<PasswordError> for DomainError {
    fn from(err: PasswordError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

impl From<JwtError> for DomainError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired | JwtError::InvalidToken | JwtError::DecodingError(_) => {
                DomainError::Unauthorized(err.to_string())
            }
            JwtError::EncodingError(_) | JwtError::InvalidKey(_) => {
                DomainError::Internal(err.to_string())
            }
        }
    }
}

impl From<CursorError> for DomainError {
    fn from(err: CursorError) -> Self {
        DomainError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(email(message = "Email address is malformed"))]
        email: String,
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            DomainError::Conflict(String::new()),
            DomainError::NotFound(String::new()),
            DomainError::Validation(String::new()),
            DomainError::Integrity(String::new()),
            DomainError::Unauthorized(String::new()),
            DomainError::Storage(String::new()),
            DomainError::Internal(String::new()),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_validation_errors_conversion() {
        let sample = Sample {
            email: "nope".to_string(),
        };
        let err: DomainError = sample.validate().unwrap_err().into();
        match err {
            DomainError::Validation(message) => {
                assert_eq!(message, "email: Email address is malformed")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_jwt_error_conversion() {
        assert!(matches!(
            DomainError::from(JwtError::TokenExpired),
            DomainError::Unauthorized(_)
        ));
        assert!(matches!(
            DomainError::from(JwtError::InvalidKey("k".into())),
            DomainError::Internal(_)
        ));
    }

    #[test]
    fn test_policy_violation_conversion() {
        let err = DomainError::from(PasswordPolicyViolation::EntirelyNumeric);
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation error: Password cannot be entirely numeric"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::Conflict("email already registered".into()).to_string(),
            "Conflict: email already registered"
        );
        assert!(DomainError::Conflict(String::new()).is_conflict());
        assert!(DomainError::NotFound(String::new()).is_not_found());
    }
}
