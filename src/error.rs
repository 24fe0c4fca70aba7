//! Custom error types and handling
//!
//! This module defines the engine's error taxonomy. Permission checks are
//! fail-closed: any failure while resolving a permission is reported as a
//! denial by the resolving service, never as an implicit grant.

/// Engine-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Authorization errors
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // Validation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Duplicate insert lost a race; callers re-read the winner's row
    /// instead of surfacing this.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transient failure to acquire a resource lock; safe to retry.
    #[error("Lock acquisition timed out: {0}")]
    LockTimeout(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Get the stable error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Conflict(_) => "CONFLICT",
            Self::LockTimeout(_) => "LOCK_TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Token(_) => "TOKEN_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may retry the operation as-is
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LockTimeout(_))
    }

    /// Whether the error is terminal for the request (no retry)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::PermissionDenied(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    AppError::Conflict("Resource already exists".to_string())
                } else {
                    AppError::Database(db_err.to_string())
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Token(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AppError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::PermissionDenied("x".into()).error_code(),
            "PERMISSION_DENIED"
        );
        assert_eq!(AppError::Conflict("x".into()).error_code(), "CONFLICT");
    }

    #[test]
    fn test_transient_and_terminal_classification() {
        assert!(AppError::LockTimeout("busy".into()).is_transient());
        assert!(!AppError::LockTimeout("busy".into()).is_terminal());
        assert!(AppError::NotFound("gone".into()).is_terminal());
        assert!(AppError::PermissionDenied("no".into()).is_terminal());
        assert!(!AppError::Conflict("dup".into()).is_terminal());
    }
}
