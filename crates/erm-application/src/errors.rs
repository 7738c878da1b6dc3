//! Application layer error types
//!
//! These errors represent application-level failures that are suitable
//! for API consumption. They wrap domain errors with additional context.

use thiserror::Error;

use erm_domain::errors::DomainError;

/// Application layer result type
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Application layer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplicationError {
    // === Validation Errors ===
    /// Input validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    // === Not Found Errors ===
    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // === Access Errors ===
    /// Missing, invalid or expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    // === Conflict Errors ===
    /// Unique key already taken or state conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    // === Infrastructure Errors ===
    /// Repository operation failed
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// Password hashing or token signing failed
    #[error("Credential processing failed: {0}")]
    CredentialError(String),

    // === Domain Error Wrapper ===
    /// Domain rule rejected the operation
    #[error("Domain error: {0}")]
    DomainError(String),
}

impl ApplicationError {
    /// Shorthand for a missing entity
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError { field, reason } => {
                ApplicationError::ValidationFailed(format!("{}: {}", field, reason))
            }
            DomainError::BusinessRuleViolation { rule } => ApplicationError::DomainError(rule),
            DomainError::EntityNotFound { entity_type, id } => ApplicationError::NotFound {
                entity: entity_type,
                id,
            },
            DomainError::DuplicateEntity { entity_type, key } => {
                ApplicationError::Conflict(format!("{} already exists: {}", entity_type, key))
            }
            DomainError::ConcurrencyConflict { resource } => ApplicationError::Conflict(resource),
            DomainError::StorageFailure { reason } => ApplicationError::RepositoryError(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ApplicationError::ValidationFailed("title is required".into());
        assert_eq!(err.to_string(), "Validation failed: title is required");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = ApplicationError::not_found("Risk", 17);
        assert_eq!(err.to_string(), "Risk not found: 17");
    }

    #[test]
    fn test_domain_error_conversion() {
        let app_err: ApplicationError = DomainError::validation("title", "too long").into();
        assert_eq!(
            app_err,
            ApplicationError::ValidationFailed("title: too long".into())
        );

        let dup: ApplicationError = DomainError::DuplicateEntity {
            entity_type: "User".into(),
            key: "a@corp.example".into(),
        }
        .into();
        assert!(matches!(dup, ApplicationError::Conflict(_)));
    }
}
