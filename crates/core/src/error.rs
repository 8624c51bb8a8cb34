// Central Error Type for the Application

use crate::domain::DomainError;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Optimistic write lost too many races in a row
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Stable failure classification handed to callers.
///
/// Transport layers map these to their own representation; the variants
/// themselves never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidTransition,
    NotAuthorized,
    QueueNotActive,
    InvalidStatus,
    Validation,
    Conflict,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(e) => match e {
                DomainError::QueueNotFound(_)
                | DomainError::TeamNotFound(_)
                | DomainError::MemberNotFound { .. } => ErrorKind::NotFound,
                DomainError::QueueNotActive { .. } => ErrorKind::QueueNotActive,
                DomainError::AlreadyInQueue(_)
                | DomainError::NoPendingRequest(_)
                | DomainError::NotInQueue(_)
                | DomainError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
                DomainError::NotAuthorized(_) => ErrorKind::NotAuthorized,
                DomainError::InvalidStatus(_) => ErrorKind::InvalidStatus,
                DomainError::Validation(_) => ErrorKind::Validation,
            },
            AppError::Validation(_) | AppError::Serialization(_) => ErrorKind::Validation,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)
