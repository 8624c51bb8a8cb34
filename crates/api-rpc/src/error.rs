//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes. The code is derived from
//! the error kind, so every domain failure stays distinguishable on the wire.

use jsonrpsee::types::ErrorObjectOwned;
use mentorq_core::error::{AppError, ErrorKind};

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const NOT_AUTHORIZED: i32 = 4003;
    pub const INVALID_TRANSITION: i32 = 4004;
    pub const QUEUE_NOT_ACTIVE: i32 = 4005;
    pub const INVALID_STATUS: i32 = 4006;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
}

/// Stable machine-readable name carried in the error's `data` field
pub fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::InvalidTransition => "invalid_transition",
        ErrorKind::NotAuthorized => "not_authorized",
        ErrorKind::QueueNotActive => "queue_not_active",
        ErrorKind::InvalidStatus => "invalid_status",
        ErrorKind::Validation => "validation",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Internal => "internal",
    }
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let kind = err.kind();
    let code = match (&err, kind) {
        (AppError::Database(_), _) => code::DB_ERROR,
        (_, ErrorKind::NotFound) => code::NOT_FOUND,
        (_, ErrorKind::InvalidTransition) => code::INVALID_TRANSITION,
        (_, ErrorKind::NotAuthorized) => code::NOT_AUTHORIZED,
        (_, ErrorKind::QueueNotActive) => code::QUEUE_NOT_ACTIVE,
        (_, ErrorKind::InvalidStatus) => code::INVALID_STATUS,
        (_, ErrorKind::Validation) => code::VALIDATION_ERROR,
        (_, ErrorKind::Conflict) => code::CONFLICT,
        (_, ErrorKind::Internal) => code::INTERNAL_ERROR,
    };
    ErrorObjectOwned::owned(code, err.to_string(), Some(kind_name(kind)))
}
