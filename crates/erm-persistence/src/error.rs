//! Persistence Layer Error Types
//!
//! Error mapping to domain types

use thiserror::Error;

use erm_domain::errors::DomainError;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Unique key already taken
    #[error("Duplicate {entity_type}: {key}")]
    Duplicate {
        entity_type: &'static str,
        key: String,
    },

    /// Identifier sequence exhausted
    #[error("Identifier sequence exhausted for {0}")]
    SequenceExhausted(&'static str),
}

impl PersistenceError {
    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a duplicate key error
    pub fn duplicate(entity_type: &'static str, key: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            key: key.into(),
        }
    }
}

/// Convert persistence errors to domain errors
impl From<PersistenceError> for DomainError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { entity_type, id } => DomainError::EntityNotFound {
                entity_type: entity_type.to_string(),
                id,
            },
            PersistenceError::Duplicate { entity_type, key } => DomainError::DuplicateEntity {
                entity_type: entity_type.to_string(),
                key,
            },
            PersistenceError::SequenceExhausted(table) => DomainError::StorageFailure {
                reason: format!("identifier sequence exhausted for {}", table),
            },
        }
    }
}
