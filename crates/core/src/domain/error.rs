// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("No entry for user {user_id} in queue {queue_id}")]
    MemberNotFound { queue_id: String, user_id: String },

    #[error("Queue {queue_id} is not accepting joins (status: {status})")]
    QueueNotActive { queue_id: String, status: String },

    #[error("User {0} is already in this queue or has a pending request")]
    AlreadyInQueue(String),

    #[error("No pending request found for user {0}")]
    NoPendingRequest(String),

    #[error("User {0} is not in this queue")]
    NotInQueue(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Invalid queue status: {0}")]
    InvalidStatus(String),

    #[error("Invalid member transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
