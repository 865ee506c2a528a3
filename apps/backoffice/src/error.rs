//! # API Error Type
//!
//! Unified error type for back-office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Teis POS                               │
//! │                                                                         │
//! │  Launcher                    Commands                                   │
//! │  ────────                    ────────                                   │
//! │                                                                         │
//! │  teis customer add ...                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation Error? ── ValidationError::InvalidFormat ──┐         │  │
//! │  │         │                                              │         │  │
//! │  │         ▼                                              ▼         │  │
//! │  │  Database Error? ──── DbError::UniqueViolation ───► ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Report Error? ────── ReportError::Io ─────────────────┘         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: [VALIDATION_ERROR] dni_nie has invalid format: check letter   │
//! │  exit code 1                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` the error is printed as
//! `{"code": "NOT_FOUND", "message": "Customer not found: 12345678Z"}`.

use serde::Serialize;
use teis_core::{CoreError, ValidationError};
use teis_db::DbError;
use teis_reports::ReportError;
use thiserror::Error;

/// Error returned from back-office commands.
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{}] {message}", code.as_str())]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Stable codes a front end can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    /// DNI/NIE or product name already registered
    Duplicate,
    DatabaseError,
    /// Saving an empty invoice, editing a line that is not there
    BusinessLogic,
    ReportError,
    BackupError,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Duplicate => "DUPLICATE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::BusinessLogic => "BUSINESS_LOGIC",
            ErrorCode::ReportError => "REPORT_ERROR",
            ErrorCode::BackupError => "BACKUP_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// `"<resource> not found: <id>"`
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{field} '{value}' already exists"),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Rejected dangling reference");
                ApiError::validation("referenced customer or invoice does not exist")
            }
            DbError::BackupFailed(e) => ApiError::new(ErrorCode::BackupError, e),
            other => {
                tracing::error!(error = %other, "Database error");
                ApiError::new(ErrorCode::DatabaseError, other.to_string())
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CustomerNotFound(dni) => ApiError::not_found("Customer", &dni),
            CoreError::ProductNotFound(name) => ApiError::not_found("Product", &name),
            CoreError::InvoiceNotFound(id) => ApiError::not_found("Invoice", &id.to_string()),
            CoreError::EmptyInvoice(_) | CoreError::LineOutOfRange { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        tracing::error!(error = %err, "Report failed");
        ApiError::new(ErrorCode::ReportError, err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal(err.to_string())
    }
}

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: ApiError = DbError::not_found("Customer", "12345678Z").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Customer not found: 12345678Z");
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate() {
        let err: ApiError = DbError::duplicate("dni_nie", "12345678Z").into();
        assert_eq!(err.code, ErrorCode::Duplicate);
    }

    #[test]
    fn test_validation_maps_through_core_error() {
        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "surname".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "surname is required");
    }

    #[test]
    fn test_pool_closed_maps_to_database_error() {
        let err: ApiError = DbError::ConnectionFailed("pool is closed".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("pool is closed"));
    }

    #[test]
    fn test_display_and_json() {
        let err = ApiError::not_found("Invoice", "7");
        assert_eq!(err.to_string(), "[NOT_FOUND] Invoice not found: 7");

        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"NOT_FOUND","message":"Invoice not found: 7"}"#);

        // Display and serde agree on the code spelling
        let code = serde_json::to_value(ErrorCode::BusinessLogic).unwrap();
        assert_eq!(code, ErrorCode::BusinessLogic.as_str());
    }
}
